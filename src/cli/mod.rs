// src/cli/mod.rs
//! CLI definitions for lala-recipe
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! Recipe inspection:
//! - `info` - Show recipe metadata
//! - `validate` - Validate the recipe
//! - `resolve` - Show the source a selector resolves to
//!
//! Cooking:
//! - `fetch` - Fetch and verify the source only
//! - `install` - Build and install, then run the smoke test
//! - `test` - Smoke-test an installed binary
//!
//! Utilities:
//! - `checksum` - Compute the checksum of a local archive
//! - `completions` - Generate shell completions

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lala-recipe")]
#[command(author = "Lala Contributors")]
#[command(version)]
#[command(about = "Build, install and smoke-test lala from source", long_about = None)]
pub struct Cli {
    /// Recipe file to use instead of the built-in lala recipe
    #[arg(long, global = true, value_name = "PATH")]
    pub recipe: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // =========================================================================
    // Recipe Inspection
    // =========================================================================
    /// Show recipe metadata
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the recipe and print warnings
    Validate,

    /// Show the source the recipe resolves to
    Resolve {
        /// Resolve the development head instead of the stable archive
        #[arg(long)]
        head: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    // =========================================================================
    // Cooking
    // =========================================================================
    /// Fetch and verify the source without building
    Fetch {
        /// Fetch the development head instead of the stable archive
        #[arg(long)]
        head: bool,

        /// Directory for cached source archives
        #[arg(long, value_name = "DIR")]
        source_cache: Option<PathBuf>,

        /// Only use sources already in the cache
        #[arg(long)]
        offline: bool,
    },

    /// Build and install the binary, then run the smoke test
    Install {
        /// Build the development head instead of the stable archive
        #[arg(long)]
        head: bool,

        /// Installation prefix (default: ~/.local)
        #[arg(long, value_name = "DIR")]
        prefix: Option<PathBuf>,

        /// Directory for cached source archives
        #[arg(long, value_name = "DIR")]
        source_cache: Option<PathBuf>,

        /// Number of parallel build jobs
        #[arg(short, long)]
        jobs: Option<u32>,

        /// Keep the build directory after completion (for debugging)
        #[arg(long)]
        keep_builddir: bool,

        /// Only use sources already in the cache
        #[arg(long)]
        offline: bool,

        /// Skip the post-install smoke test
        #[arg(long)]
        skip_test: bool,

        /// Keep the smoke-test scratch directory
        #[arg(long)]
        keep_scratch: bool,
    },

    /// Smoke-test an installed binary
    Test {
        /// Installation prefix (default: ~/.local)
        #[arg(long, value_name = "DIR")]
        prefix: Option<PathBuf>,

        /// Keep the scratch directory and print its path
        #[arg(long)]
        keep_scratch: bool,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    // =========================================================================
    // Utilities
    // =========================================================================
    /// Compute the checksum of a local archive
    Checksum {
        /// Archive file to hash
        file: PathBuf,

        /// Hash algorithm (sha256 or sha512)
        #[arg(long, default_value = "sha256")]
        algorithm: String,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
