//! Hetzner Cloud control plane for freezer
//!
//! [`HetznerCloud`] implements [`freezer_cloud::ControlPlane`] over the
//! Hetzner Cloud REST API.
//!
//! # Example
//!
//! ```no_run
//! use freezer_cloud::ControlPlane;
//! use freezer_hcloud::HetznerCloud;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let cloud = HetznerCloud::new(std::env::var("HCLOUD_TOKEN")?)?;
//! if let Some(server) = cloud.get_server_by_name("web").await? {
//!     println!("{} is {}", server.name, server.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
mod schema;

pub use client::{HETZNER_API_BASE, HetznerCloud, PER_PAGE};
pub use error::{HcloudError, Result};
