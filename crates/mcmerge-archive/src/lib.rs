//! Archive codec layer for mcmerge.
//!
//! This crate defines the [`ArchiveCodec`] trait, the single interface
//! through which the merge engine reads uploaded addon archives and writes
//! merged ones. No other mcmerge crate should import `zip` directly; they
//! depend on `mcmerge-archive` and program against the trait.
//!
//! # Crate layout
//!
//! - [`codec`]: the [`ArchiveCodec`] trait and the [`ArchiveEntry`] value type.
//! - [`zip_codec`]: [`ZipCodec`], the `zip`-backed implementation.
//! - [`path`]: entry path normalization shared by readers and callers.
//! - [`error`]: the [`ArchiveError`] enum returned by all codec methods.

pub mod codec;
pub mod error;
pub mod path;
pub mod zip_codec;

pub use codec::{ArchiveCodec, ArchiveEntry};
pub use error::ArchiveError;
pub use path::{normalize_separators, strip_common_root};
pub use zip_codec::ZipCodec;
