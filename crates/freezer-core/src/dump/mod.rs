//! Portable server dumps
//!
//! A dump captures everything needed to recreate a server: its
//! configuration, the floating IPs pointing at it, the project's SSH keys and
//! the snapshot image of its disk. Dumps live under
//! `{root}/{project}/{server}/{dump_id}/` as four independent JSON files.

mod store;

pub use store::{DumpStore, select_latest};

use chrono::Utc;
use freezer_cloud::{FloatingIp, Image, Server, SshKey};
use serde::{Deserialize, Serialize};

/// Default dump root, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Snapshot of one server's configuration at freeze time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDump {
    pub server: Server,
    pub floating_ips: Vec<FloatingIp>,
    pub ssh_keys: Vec<SshKey>,
    pub snapshot: Image,
}

/// One of the files a dump is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpPart {
    Server,
    FloatingIps,
    SshKeys,
    Snapshot,
}

impl DumpPart {
    pub const ALL: [DumpPart; 4] = [
        DumpPart::Server,
        DumpPart::FloatingIps,
        DumpPart::SshKeys,
        DumpPart::Snapshot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DumpPart::Server => "server",
            DumpPart::FloatingIps => "floatingIPs",
            DumpPart::SshKeys => "sshKeys",
            DumpPart::Snapshot => "snapshot",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

impl std::fmt::Display for DumpPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Generate a new dump id from the current time in nanoseconds
pub fn new_dump_id() -> String {
    let now = Utc::now();
    match now.timestamp_nanos_opt() {
        Some(nanos) => nanos.to_string(),
        None => now.timestamp_micros().to_string(),
    }
}
