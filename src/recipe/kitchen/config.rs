// src/recipe/kitchen/config.rs

//! Configuration and result types for the Kitchen

use crate::error::CheckKind;
use crate::recipe::source::SourceRef;
use serde::Serialize;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Default timeout for HTTP requests
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for the Kitchen
///
/// Everything here is supplied by the installer; nothing comes from the
/// recipe.
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Installation prefix; the binary lands in `<prefix>/bin`
    pub prefix: PathBuf,
    /// Directory for downloaded, verified source archives
    pub source_cache: PathBuf,
    /// Parent directory for scratch build directories (system temp if unset)
    pub build_root: Option<PathBuf>,
    /// Keep the build directory after completion (for debugging)
    pub keep_builddir: bool,
    /// Keep the smoke-test scratch directory instead of removing it
    pub keep_scratch: bool,
    /// Parallel jobs passed to the build backend (overrides the recipe)
    pub jobs: Option<u32>,
    /// Timeout for archive downloads
    pub http_timeout: Duration,
    /// Only use sources already in the cache
    pub offline: bool,
    /// Show a download progress bar
    pub show_progress: bool,
    /// Search path for toolchain lookup (`PATH` if unset)
    pub search_path: Option<OsString>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let prefix = dirs::home_dir()
            .map(|home| home.join(".local"))
            .unwrap_or_else(|| PathBuf::from("/usr/local"));

        let source_cache = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("lala-recipe")
            .join("sources");

        Self {
            prefix,
            source_cache,
            build_root: None,
            keep_builddir: false,
            keep_scratch: false,
            jobs: None,
            http_timeout: HTTP_TIMEOUT,
            offline: false,
            show_progress: false,
            search_path: None,
        }
    }
}

impl KitchenConfig {
    /// Configuration rooted at an explicit prefix and cache
    pub fn with_dirs(prefix: impl Into<PathBuf>, source_cache: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            source_cache: source_cache.into(),
            ..Self::default()
        }
    }

    /// Directory the build backend installs executables into
    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    /// Path the named binary is expected at after install
    pub fn binary_path(&self, binary: &str) -> PathBuf {
        self.bin_dir().join(binary)
    }
}

/// Result of installing a recipe
#[derive(Debug, Serialize)]
pub struct InstallResult {
    /// The single executable placed by the build
    pub binary_path: PathBuf,
    /// Source that was built
    pub source: SourceRef,
    /// Whether the archive came from the source cache
    pub from_cache: bool,
    /// Kept build directory, when `keep_builddir` is set
    pub build_dir: Option<PathBuf>,
    /// Build log
    pub log: String,
    /// Warnings generated during the build
    pub warnings: Vec<String>,
}

/// Outcome of one smoke check
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub check: CheckKind,
    /// Command line that was run, for display
    pub command: String,
    /// Combined stdout and stderr
    pub output: String,
    pub duration_ms: u128,
}

/// Result of tasting an installed binary
#[derive(Debug, Serialize)]
pub struct TasteReport {
    pub binary_path: PathBuf,
    pub checks: Vec<CheckOutcome>,
    /// Scratch directory, when `keep_scratch` is set
    pub scratch_dir: Option<PathBuf>,
}
