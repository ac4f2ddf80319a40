//! SCIM 2.0 client for directory sync
//!
//! [`client::ScimClient`] speaks RFC 7644 to the provisioning target and
//! implements [`dirsync_core::ProvisioningClient`] on top of it.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod provisioning;
pub mod retry;

pub use auth::ScimAuth;
pub use client::ScimClient;
pub use error::{ScimClientError, ScimClientResult};
pub use retry::RetryPolicy;
