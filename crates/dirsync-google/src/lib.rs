//! Google Workspace directory reader
//!
//! Reads users, groups and group members from the Admin SDK Directory API
//! and exposes them through [`dirsync_core::DirectoryReader`].

pub mod client;
pub mod error;
pub mod models;
pub mod reader;

pub use client::{DirectoryClient, DEFAULT_BASE_URL, MY_CUSTOMER};
pub use error::{DirectoryError, DirectoryResult};
