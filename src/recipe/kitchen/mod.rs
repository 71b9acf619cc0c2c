// src/recipe/kitchen/mod.rs

//! Kitchen: the executor that cooks a recipe into an install prefix
//!
//! The Kitchen turns a parsed recipe into an installed, smoke-tested binary.
//! It handles:
//! - Checking the declared toolchain before anything is fetched
//! - Fetching, verifying and caching source archives
//! - Cloning development heads
//! - Running the build backend with the installer's arguments
//! - Tasting the installed binary

mod archive;
mod config;
mod cook;
mod taste;
pub mod toolchain;
mod vcs;

pub use config::{CheckOutcome, InstallResult, KitchenConfig, TasteReport};
pub use toolchain::{PathResolver, ToolchainResolver};

use crate::error::{CheckKind, Error, Phase, Result};
use crate::hash::Hash;
use crate::recipe::format::{DependencyPhase, Recipe};
use crate::recipe::parser::check_layout;
use crate::recipe::source::{SourceRef, SourceSelector};
use archive::{download_file, verify_file_checksum};
use cook::{executables_in, is_executable, Cook};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toolchain::Toolchain;
use tracing::{debug, info, warn};

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    resolver: Arc<dyn ToolchainResolver>,
}

impl Kitchen {
    /// Create a new Kitchen resolving tools on the configured search path
    pub fn new(config: KitchenConfig) -> Self {
        let resolver = match &config.search_path {
            Some(path) => PathResolver::with_search_path(path.clone()),
            None => PathResolver::new(),
        };
        Self {
            config,
            resolver: Arc::new(resolver),
        }
    }

    /// Create a new Kitchen with a custom toolchain resolver
    pub fn with_resolver(config: KitchenConfig, resolver: Arc<dyn ToolchainResolver>) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    pub(crate) fn resolver(&self) -> &dyn ToolchainResolver {
        self.resolver.as_ref()
    }

    /// Resolve the dependencies a recipe declares for one phase
    pub fn resolve_toolchain(&self, recipe: &Recipe, phase: DependencyPhase) -> Result<Toolchain> {
        let deps = recipe.dependencies_for(phase);
        if deps.is_empty() {
            debug!("No {} dependencies declared", phase);
            return Ok(Toolchain::default());
        }

        info!(
            "Checking {} dependencies: {}",
            phase,
            deps.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(", ")
        );

        let missing = self.resolver().check_missing(&deps);
        if !missing.is_empty() {
            warn!(
                "Missing {} dependencies: {}",
                phase,
                missing.join(", ")
            );
        }
        Toolchain::resolve(self.resolver(), &deps)
    }

    /// Install a recipe into the configured prefix
    ///
    /// This is the main entry point for building from source.
    ///
    /// ## Cooking Process
    /// 1. **Toolchain**: every build dependency must resolve, or nothing is
    ///    fetched and nothing is written under the prefix
    /// 2. **Resolve**: pick the archive or head for the selector; offline
    ///    kitchens refuse heads here
    /// 3. **Prep**: fetch the source; archives are verified before use
    /// 4. **Unpack**: extract the archive and find the source root
    /// 5. **Simmer**: run the build backend against the prefix
    /// 6. **Plate**: confirm the expected executable is in place
    pub fn install(&self, recipe: &Recipe, selector: SourceSelector) -> Result<InstallResult> {
        info!(
            "Cooking {} version {}",
            recipe.package.name, recipe.package.version
        );

        check_layout(recipe)?;
        let toolchain = self.resolve_toolchain(recipe, DependencyPhase::Build)?;
        let source = recipe.resolve(selector)?;
        info!("Resolved source: {}", source);

        if source.is_head() && self.config.offline {
            return Err(Error::DownloadError(
                "Offline mode: head sources cannot be fetched".to_string(),
            ));
        }

        let mut cook = Cook::new(self, recipe, toolchain).map_err(|e| e.during(Phase::Build))?;
        let before = executables_in(&self.config.bin_dir()).map_err(|e| e.during(Phase::Build))?;

        info!("Prep: fetching ingredients...");
        cook.prep(&source).map_err(|e| e.during(Phase::Fetch))?;

        info!("Unpacking sources...");
        cook.unpack(&source).map_err(|e| e.during(Phase::Build))?;

        info!("Simmering: running build...");
        cook.simmer().map_err(|e| e.during(Phase::Build))?;

        info!("Plating: checking installed binary...");
        let binary_path = cook.plate(&before).map_err(|e| e.during(Phase::Build))?;

        let (build_dir, log, warnings, from_cache) = cook.finish();
        Ok(InstallResult {
            binary_path,
            source,
            from_cache,
            build_dir,
            log,
            warnings,
        })
    }

    /// Run the smoke test against the installed binary
    pub fn test(&self, recipe: &Recipe) -> Result<TasteReport> {
        check_layout(recipe)?;
        self.resolve_toolchain(recipe, DependencyPhase::Test)?;

        let binary_path = self.config.binary_path(recipe.binary_name());
        if !is_executable(&binary_path) {
            return Err(Error::SubprocessFailure {
                check: CheckKind::Version,
                reason: format!("{} is not an installed executable", binary_path.display()),
            });
        }

        taste::taste(recipe, &binary_path, self.config.keep_scratch)
            .map_err(|e| e.during(Phase::Test))
    }

    /// Fetch a recipe's source without building
    ///
    /// Archives are verified and left in the source cache; heads are cloned
    /// into `<source_cache>/heads/<name>-<branch>`. Returns the local path.
    pub fn fetch(&self, recipe: &Recipe, selector: SourceSelector) -> Result<PathBuf> {
        info!(
            "Fetching sources for {} version {}",
            recipe.package.name, recipe.package.version
        );

        match recipe.resolve(selector)? {
            SourceRef::Archive { url, checksum, .. } => {
                let (path, _) = self
                    .fetch_archive(&url, &checksum)
                    .map_err(|e| e.during(Phase::Fetch))?;
                Ok(path)
            }
            SourceRef::Head { repository, branch } => {
                if self.config.offline {
                    return Err(Error::DownloadError(
                        "Offline mode: head sources cannot be fetched".to_string(),
                    ));
                }
                let git = Toolchain::default().require(self.resolver(), "git")?;
                warn!(
                    "Fetching {} branch {}: head sources are not integrity-checked",
                    repository, branch
                );

                let dest = self
                    .config
                    .source_cache
                    .join("heads")
                    .join(format!("{}-{}", recipe.package.name, branch.replace('/', "-")));
                self.clone_head(&git, &repository, &branch, &dest)
                    .map_err(|e| e.during(Phase::Fetch))?;
                Ok(dest)
            }
        }
    }

    fn clone_head(&self, git: &Path, repository: &str, branch: &str, dest: &Path) -> Result<()> {
        if dest.exists() {
            fs::remove_dir_all(dest)?;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        vcs::clone_branch(git, repository, branch, dest)
    }

    /// Check if the stable archive for a recipe is already cached
    pub fn sources_cached(&self, recipe: &Recipe) -> bool {
        match recipe.resolve(SourceSelector::Stable) {
            Ok(SourceRef::Archive { checksum, .. }) => {
                self.config.source_cache.join(checksum.cache_key()).exists()
            }
            _ => false,
        }
    }

    /// Fetch a source archive (with caching)
    ///
    /// Returns the cached path and whether it was already in the cache. A
    /// download that fails verification is removed before the error is
    /// returned.
    pub(crate) fn fetch_archive(&self, url: &str, checksum: &Hash) -> Result<(PathBuf, bool)> {
        fs::create_dir_all(&self.config.source_cache)?;

        let cache_key = checksum.cache_key();
        let cached_path = self.config.source_cache.join(&cache_key);

        if cached_path.exists() {
            debug!("Using cached source: {}", cached_path.display());
            match verify_file_checksum(&cached_path, checksum) {
                Ok(()) => return Ok((cached_path, true)),
                Err(e @ Error::ChecksumMismatch { .. }) => {
                    warn!("Cached file failed verification, re-downloading: {}", e);
                    fs::remove_file(&cached_path)?;
                }
                Err(e) => return Err(e),
            }
        }

        if self.config.offline {
            return Err(Error::DownloadError(format!(
                "Offline mode: {} is not in the source cache",
                url
            )));
        }

        info!("Downloading: {}", url);
        let temp_path = self.config.source_cache.join(format!("{}.tmp", cache_key));

        if let Err(e) = download_file(
            url,
            &temp_path,
            self.config.http_timeout,
            self.config.show_progress,
        ) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        if let Err(e) = verify_file_checksum(&temp_path, checksum) {
            fs::remove_file(&temp_path)?;
            return Err(e);
        }

        fs::rename(&temp_path, &cached_path)?;
        Ok((cached_path, false))
    }
}
