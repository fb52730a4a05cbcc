//! Core types and errors for NGINX configuration snapshots.
//!
//! This crate provides the plain data model shared by the snapshot engine and
//! its consumers:
//!
//! - **Types**: [`ConfigSnapshot`] and everything it aggregates
//! - **Errors**: [`SnapshotError`] with fatal/non-fatal classification
//!
//! Nothing here touches the filesystem; building a snapshot is the job of the
//! `nginx-snapshot` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use nginx_snapshot_core::{ConfigSnapshot, Result};
//!
//! fn report(snapshot: &ConfigSnapshot) -> Result<()> {
//!     for dir in &snapshot.directory_map.directories {
//!         println!("{} ({} files)", dir.name, dir.files.len());
//!     }
//!     Ok(())
//! }
//! ```

mod error;
pub mod types;

pub use error::{Result, SnapshotError};
pub use types::*;
