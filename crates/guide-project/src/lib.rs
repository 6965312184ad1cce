//! Scratch Guide Project Model
//!
//! Reconstructs the structure of a Scratch 3 project from its manifest.
//!
//! # Core Concepts
//!
//! - [`ProjectBuilder`]: Manifest to [`ProjectModel`] in one parse pass
//! - [`Target`]: Stage or sprite with costumes, sounds, and rendered scripts
//! - [`ScriptRenderer`]: Block graph to scratchblocks-style text
//! - [`AssetCatalog`]: Costumes and sounds deduplicated by `md5ext`
//!
//! # Example
//!
//! ```rust,ignore
//! use guide_project::{AssetCatalog, ProjectBuilder};
//!
//! let project = ProjectBuilder::new().from_archive(&archive)?;
//! let catalog = AssetCatalog::from_project(&project);
//! for script in &project.sprites[0].scripts {
//!     println!("{script}");
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod blocks;
pub mod hats;

mod builder;
mod catalog;
mod error;
mod model;
mod render;

pub use builder::{ProjectBuilder, DEFAULT_OPCODE_SAMPLE};
pub use catalog::{AssetCatalog, AssetType, CatalogEntry};
pub use error::{ProjectError, ProjectResult};
pub use model::{AssetRef, Costume, ProjectMeta, ProjectModel, Sound, Target, STAGE_NAME};
pub use render::{RenderOptions, ScriptRenderer, DEFAULT_MAX_DEPTH};

/// Common imports
pub mod prelude {
    pub use crate::{
        AssetCatalog, CatalogEntry, ProjectBuilder, ProjectModel, RenderOptions, Target,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
