//! Scratch Guide Archive Access
//!
//! Read-only access to packaged Scratch 3 projects (`.sb3`) and delivery of
//! their content-addressed assets.
//!
//! # Core Concepts
//!
//! - [`Archive`]: Immutable view over the zip container bytes
//! - [`ArchiveDigest`]: 32-byte Blake3 fingerprint of the raw archive
//! - [`DeliverableAsset`]: Anything that can be resolved by `md5ext`
//! - [`extract_one`] / [`extract_all`]: Strict single and best-effort bulk delivery
//!
//! # Example
//!
//! ```rust,ignore
//! use guide_archive::Archive;
//!
//! let archive = Archive::open(std::fs::read("game.sb3")?)?;
//! let manifest = archive.manifest()?;
//! println!("{} entries, digest {}", archive.len(), archive.digest().short());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod archive;
mod delivery;
mod digest;
mod error;

pub use archive::{Archive, DEFAULT_MAX_ARCHIVE_BYTES, MANIFEST_ENTRY};
pub use delivery::{
    extract_all, extract_one, package_filename, sanitize_filename, AssetPackage, DeliverableAsset,
};
pub use digest::{ArchiveDigest, DigestError};
pub use error::{ArchiveError, ArchiveResult};

/// Common imports
pub mod prelude {
    pub use crate::{Archive, ArchiveDigest, ArchiveError, ArchiveResult, DeliverableAsset};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
