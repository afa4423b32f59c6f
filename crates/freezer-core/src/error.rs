//! Orchestration error types

use freezer_cloud::{ActionStatus, CloudError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreezerError {
    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error("action {action_id} status {status}: message: {message}")]
    ActionFailed {
        action_id: i64,
        status: ActionStatus,
        message: String,
    },

    #[error("wait for action {action_id} deadline reached, action status {status} ({progress}/100)")]
    DeadlineExceeded {
        action_id: i64,
        status: ActionStatus,
        progress: u8,
    },

    #[error("wait for action {action_id} was cancelled, action status {status} ({progress}/100)")]
    Cancelled {
        action_id: i64,
        status: ActionStatus,
        progress: u8,
    },

    #[error("server with name {0} not found")]
    ServerNotFound(String),

    #[error(
        "no dumps found in {}. please create a dump first running 'freeze' command",
        .0.display()
    )]
    NoDumps(PathBuf),

    #[error("server dump directory {} does not exist", .0.display())]
    DumpNotFound(PathBuf),

    #[error("invalid server dump: {0}")]
    InvalidDump(String),

    #[error("failed to read '{part}': {source}")]
    DumpRead {
        part: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{part}': {source}")]
    DumpParse {
        part: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write '{part}': {source}")]
    DumpWrite {
        part: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FreezerError>;
