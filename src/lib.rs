//! mcmerge library crate: the addon merge engine and its collaborators.
//!
//! The primary interface is the `mcmerge` binary. This lib.rs exposes the
//! engine, loader, session and exporter so that integration tests and other
//! front ends can drive a merge without going through the CLI.

pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod merge;
pub mod model;
pub mod session;
pub mod telemetry;

pub use error::MergerError;
