//! Freezer control plane abstraction
//!
//! This crate defines the remote capability surface the freeze/unfreeze
//! engine drives, together with the resource model shared by API clients
//! and server dumps.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  freezer CLI                     │
//! │         (freeze / unfreeze / dump / list)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                freezer-core                      │
//! │  waiter · capture · freeze · unfreeze · dumps    │
//! └─────────────────┬───────────────────────────────┘
//!                   │  trait ControlPlane { ... }
//! ┌─────────────────▼───────────────────────────────┐
//! │                freezer-cloud                     │
//! └───────┬─────────────────────────┬───────────────┘
//!         │                         │
//! ┌───────▼───────┐         ┌───────▼───────┐
//! │ freezer-hcloud│         │  FakeControl  │
//! │  (HTTP API)   │         │  Plane (test) │
//! └───────────────┘         └───────────────┘
//! ```

pub mod action;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod fake;
pub mod model;
pub mod provider;

// Re-exports
pub use action::{Action, ActionError, ActionStatus};
pub use error::{CloudError, Result, ensure_success};
pub use model::{
    FirewallRef, FloatingIp, Image, PrimaryIpAssignment, PrivateNet, PublicNet, ResourceRef,
    Server, SshKey,
};
pub use provider::{
    AttachToNetworkOpts, ControlPlane, CreateImageOpts, CreateImageResult, CreatePublicNet,
    CreateServerOpts, CreateServerResult,
};
