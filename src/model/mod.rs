//! Data model: addons, manifests and conflicts.

pub mod addon;
pub mod conflict;
pub mod manifest;
