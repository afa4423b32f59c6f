//! Freezer core
//!
//! Freezes a cloud server into a dump on local disk (snapshot, release its
//! addresses, delete it) and unfreezes it later from that dump (recreate
//! from the snapshot, reattach floating IPs and private networks).
//!
//! ```no_run
//! use freezer_cloud::ControlPlane;
//! use freezer_core::{DumpStore, Freezer};
//! use std::sync::Arc;
//!
//! # async fn run(cloud: Arc<dyn ControlPlane>) -> freezer_core::Result<()> {
//! let freezer = Freezer::new(cloud, DumpStore::new("output", "acme"));
//! let dump_id = freezer.freeze("web").await?;
//! freezer.unfreeze("web", Some(&dump_id)).await?;
//! # Ok(())
//! # }
//! ```

mod capture;
pub mod cloud_init;
pub mod dump;
pub mod error;
mod freeze;
pub mod freezer;
mod unfreeze;
pub mod waiter;

#[cfg(test)]
mod testing;

pub use cloud_init::floating_ip_user_data;
pub use dump::{DEFAULT_OUTPUT_DIR, DumpPart, DumpStore, ServerDump, new_dump_id, select_latest};
pub use error::{FreezerError, Result};
pub use freezer::Freezer;
pub use unfreeze::create_server_opts;
pub use waiter::{ActionWaiter, PollConfig, TRANSIENT_ERROR_MARKER};
