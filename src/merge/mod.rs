//! Deterministic N-way addon merge engine.
//!
//! Pure, synchronous, single-threaded: every input is already in memory and
//! every output is returned by value. Nothing here fails; each degradation
//! is recorded in [`MergeResult::logs`] and as a `tracing` warning.
//!
//! # Pipeline
//!
//! - **detect**: Find paths present in two or more addons ([`detect_conflicts`]).
//! - **strategy**: Pick a content merge per path from an ordered dispatch
//!   table ([`MergeStrategy`]), backed by the **json** and **text** primitives.
//! - **reconcile**: Combine every addon's manifest into one ([`reconcile_manifest`]).
//! - **orchestrate**: Run the phases in a fixed order ([`merge_addons`]).
//!
//! # Determinism guarantee
//!
//! For a fixed ordered addon list, fixed resolutions and a fixed base
//! manifest, two runs produce identical files, manifest and log:
//!
//! - Addons are walked in load order, files in archive order.
//! - Conflicts are reported in first-seen path order.
//! - JSON object key order is preserved from the inputs.
//! - No hashing order, clock or randomness reaches the output.

pub mod detect;
pub mod json;
pub mod orchestrate;
pub mod reconcile;
pub mod strategy;
pub mod text;
pub mod types;

pub use detect::detect_conflicts;
pub use orchestrate::merge_addons;
pub use reconcile::reconcile_manifest;
pub use strategy::{MergeOutcome, MergeStrategy};
pub use types::{MANIFEST_PATH, MergeResult};
