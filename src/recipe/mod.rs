// src/recipe/mod.rs

//! Recipe system for building a tool from source
//!
//! A recipe defines:
//! - Where the source comes from (a versioned archive and its checksum, or a
//!   development head)
//! - The build backend and the toolchain it depends on
//! - The smoke test run against the installed binary
//!
//! # Culinary Terminology
//!
//! - **Recipe**: The build specification
//! - **Kitchen**: The executor that cooks recipes into an install prefix
//! - **Prep**: Fetch and verify sources
//! - **Simmer**: Run the build backend
//! - **Plate**: Check the installed binary
//! - **Taste**: The post-install smoke test
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "lala"
//! version = "0.1.0"
//! description = "Modern text editor with multi-format preview support"
//!
//! [source]
//! archive = "https://github.com/yourusername/lala/archive/v%(version)s.tar.gz"
//! checksum = "sha256:abc123..."
//!
//! [source.head]
//! repository = "https://github.com/yourusername/lala.git"
//! branch = "main"
//!
//! [[build.dependencies]]
//! name = "rust"
//! commands = ["cargo"]
//! ```

mod format;
pub mod kitchen;
pub mod parser;
mod source;

pub use format::{
    BuildBackend, BuildSection, Dependency, DependencyPhase, HeadSection, PackageSection,
    Recipe, RenderCheck, SourceSection, TestSection,
};
pub use kitchen::{
    CheckOutcome, InstallResult, Kitchen, KitchenConfig, PathResolver, TasteReport,
    ToolchainResolver,
};
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};
pub use source::{SourceRef, SourceSelector};

use crate::error::Result;

/// The lala recipe shipped with this crate
pub const LALA_RECIPE: &str = include_str!("../../recipes/lala.toml");

/// Parse the built-in lala recipe
pub fn builtin_recipe() -> Result<Recipe> {
    parse_recipe(LALA_RECIPE)
}
