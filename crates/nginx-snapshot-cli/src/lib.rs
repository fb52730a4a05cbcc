//! # nginx-snapshot-cli
//!
//! Command-line front end for the `nginx-snapshot` engine.
//!
//! ## Commands
//!
//! - **snapshot**: build a checksummed snapshot of a configuration tree
//! - **unpack**: list or extract the files held by a saved snapshot
//! - **probe**: find a reachable `api` or `stub_status` endpoint
//! - **logs**: show the access and error logs a configuration declares
//! - **waf**: show App Protect policy and log profile files

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
