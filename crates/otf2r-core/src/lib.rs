//! otf2r-core — typed references and the definition registry.
//!
//! This crate defines the **stable boundary** used across otf2r crates:
//! - strongly typed reference handles, one newtype per namespace,
//! - per-namespace reference generators (running max + 1),
//! - immutable definition values (`Def<K>`) that hold resolved
//!   cross-references instead of raw integers,
//! - insertion-ordered containers, per-kind holders, and the aggregate
//!   [`Registry`].
//!
//! ```rust
//! use otf2r_core::prelude::*;
//!
//! let mut registry = Registry::new();
//! let name = registry.create(StringDef::new("main"))?;
//! let region = registry.create(Region::new(name, RegionRole::Function, Paradigm::User))?;
//! assert_eq!(registry.get::<Region>(region.reference()), region);
//! # Ok::<(), otf2r_core::RegistryError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Insertion-ordered definition and property containers.
pub mod container;
/// `Def<K>`: the immutable, shareable definition value.
pub mod definition;
/// Definition kinds (strings, regions, locations, metrics, I/O, ...).
pub mod defs;
/// Format enums, flag sets and typed attribute values.
pub mod enums;
/// Error taxonomy of the registry subsystem.
pub mod error;
/// Per-namespace reference generators.
pub mod generator;
/// Per-kind holder: container plus creation against a generator.
pub mod holder;
/// Typed reference newtypes and the sentinel contract.
pub mod reference;
/// Aggregate registry over every definition kind.
pub mod registry;

// ---- Re-exports for workspace compatibility ----
pub use container::*;
pub use definition::*;
pub use defs::*;
pub use enums::*;
pub use error::*;
pub use generator::*;
pub use holder::*;
pub use reference::*;
pub use registry::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use otf2r_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        defs::*, definition::Def, enums::*, error::RegistryError, reference::*,
        registry::{Registry, RegistryOptions},
    };
}
