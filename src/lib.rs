// src/lib.rs

//! Lala Recipe
//!
//! Build-from-source recipe for the `lala` text editor: where its source
//! comes from, how to build it with cargo, and how to smoke-test the
//! installed binary.
//!
//! # Architecture
//!
//! - Recipe: an immutable TOML manifest parsed once
//! - Sources: a versioned archive verified by checksum, or a development head
//! - Kitchen: executes install and test against an installer-supplied prefix
//! - Toolchain: declared dependencies resolved on the host search path

mod error;
pub mod hash;
pub mod recipe;

pub use error::{CheckKind, Error, Phase, Result};
pub use hash::{Hash, HashAlgorithm, Hasher};
pub use recipe::{
    builtin_recipe, InstallResult, Kitchen, KitchenConfig, Recipe, SourceRef, SourceSelector,
    TasteReport,
};
