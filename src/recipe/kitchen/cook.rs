// src/recipe/kitchen/cook.rs

//! Cook: the build execution for a single recipe

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::recipe::source::SourceRef;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::archive::{extract_archive, source_root};
use super::toolchain::Toolchain;
use super::{vcs, Kitchen};

/// Lines of build stderr kept in a failure message
const STDERR_TAIL_LINES: usize = 20;

/// A single cook operation
pub struct Cook<'a> {
    pub(super) kitchen: &'a Kitchen,
    pub(super) recipe: &'a Recipe,
    pub(super) toolchain: Toolchain,
    /// Temporary build directory
    pub(super) build_dir: TempDir,
    /// Source directory within build_dir
    pub(super) source_dir: PathBuf,
    /// Build log accumulator
    pub(super) log: String,
    pub(super) warnings: Vec<String>,
    /// Whether the archive was served from the source cache
    pub(super) from_cache: bool,
}

impl<'a> Cook<'a> {
    pub(super) fn new(kitchen: &'a Kitchen, recipe: &'a Recipe, toolchain: Toolchain) -> Result<Self> {
        let prefix = format!("{}-build-", recipe.package.name);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let build_dir = match &kitchen.config.build_root {
            Some(root) => {
                fs::create_dir_all(root)?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| Error::IoError(format!("Failed to create build directory: {}", e)))?;

        let source_dir = build_dir.path().join("source");
        fs::create_dir_all(&source_dir)?;

        Ok(Self {
            kitchen,
            recipe,
            toolchain,
            build_dir,
            source_dir,
            log: String::new(),
            warnings: Vec::new(),
            from_cache: false,
        })
    }

    /// Phase 1: Prep - fetch and verify the source
    ///
    /// Archives are verified by the Kitchen before they reach the build
    /// directory; heads are cloned straight into it.
    pub(super) fn prep(&mut self, source: &SourceRef) -> Result<()> {
        match source {
            SourceRef::Archive { url, checksum, .. } => {
                let (cached, from_cache) = self.kitchen.fetch_archive(url, checksum)?;
                let local = self.build_dir.path().join(self.recipe.archive_filename());
                fs::copy(&cached, &local)?;
                self.from_cache = from_cache;
                self.log_line(&format!("Fetched source: {} ({})", url, checksum));
            }
            SourceRef::Head { repository, branch } => {
                let git = self.toolchain.require(self.kitchen.resolver(), "git")?;
                warn!(
                    "Building {} from {} branch {}: head sources are not integrity-checked",
                    self.recipe.package.name, repository, branch
                );
                let checkout = self.source_dir.join(&self.recipe.package.name);
                vcs::clone_branch(&git, repository, branch, &checkout)?;
                self.warnings
                    .push("Head build: source was not checksum-verified".to_string());
                self.log_line(&format!("Cloned {} (branch {})", repository, branch));
            }
        }
        Ok(())
    }

    /// Phase 2: Unpack the archive and locate the source root
    pub(super) fn unpack(&mut self, source: &SourceRef) -> Result<()> {
        if let SourceRef::Archive { .. } = source {
            let filename = self.recipe.archive_filename();
            let archive_path = self.build_dir.path().join(&filename);
            extract_archive(&archive_path, &filename, &self.source_dir)?;
            self.log_line(&format!("Extracted source to {}", self.source_dir.display()));
        }

        self.source_dir = source_root(&self.source_dir)?;
        debug!("Source directory: {}", self.source_dir.display());

        if !self.source_dir.join("Cargo.toml").exists() {
            return Err(Error::BuildFailure(format!(
                "No Cargo.toml found in {}",
                self.source_dir.display()
            )));
        }

        Ok(())
    }

    /// Phase 3: Simmer - invoke the build backend with the installer's arguments
    pub(super) fn simmer(&mut self) -> Result<()> {
        let kitchen = self.kitchen;
        let recipe = self.recipe;
        let config = &kitchen.config;
        let backend = recipe.build.backend;
        let program = self.toolchain.require(kitchen.resolver(), backend.program())?;

        fs::create_dir_all(&config.prefix).map_err(|e| {
            Error::BuildFailure(format!(
                "Failed to create prefix {}: {}",
                config.prefix.display(),
                e
            ))
        })?;

        let args = backend.std_args(
            &config.prefix,
            &self.source_dir,
            recipe.binary_name(),
            config.jobs.or(recipe.build.jobs),
        );

        info!("Running {} install for {}", backend, recipe.package.name);
        debug!("Command: {} {:?}", program.display(), args);

        let output = Command::new(&program)
            .args(&args)
            .current_dir(&self.source_dir)
            .env("CARGO_TARGET_DIR", self.build_dir.path().join("target"))
            .envs(&recipe.build.environment)
            .output()
            .map_err(|e| {
                Error::BuildFailure(format!("Failed to run {}: {}", program.display(), e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        self.log_build_output(backend.program(), &stdout, &stderr);

        if !output.status.success() {
            return Err(Error::BuildFailure(format!(
                "{} exited with code {:?}\n{}",
                backend,
                output.status.code(),
                tail(&stderr, STDERR_TAIL_LINES)
            )));
        }

        Ok(())
    }

    /// Phase 4: Plate - confirm the build placed exactly the expected executable
    pub(super) fn plate(&mut self, before: &BTreeSet<String>) -> Result<PathBuf> {
        let kitchen = self.kitchen;
        let recipe = self.recipe;
        let config = &kitchen.config;
        let binary = recipe.binary_name();
        let binary_path = config.binary_path(binary);

        if !is_executable(&binary_path) {
            return Err(Error::BuildFailure(format!(
                "Build succeeded but no executable was installed at {}",
                binary_path.display()
            )));
        }

        let extra: Vec<String> = executables_in(&config.bin_dir())?
            .into_iter()
            .filter(|name| name != binary && !before.contains(name))
            .collect();
        if !extra.is_empty() {
            let msg = format!("Build also installed: {}", extra.join(", "));
            warn!("{}", msg);
            self.warnings.push(msg);
        }

        self.log_line(&format!("Installed {}", binary_path.display()));
        info!("Plated: {}", binary_path.display());
        Ok(binary_path)
    }

    /// Release the build directory, keeping it on disk when configured
    pub(super) fn finish(self) -> (Option<PathBuf>, String, Vec<String>, bool) {
        let kept = if self.kitchen.config.keep_builddir {
            let path = self.build_dir.keep();
            info!("Keeping build directory: {}", path.display());
            Some(path)
        } else {
            None
        };
        (kept, self.log, self.warnings, self.from_cache)
    }

    fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }

    /// Log build step output (stdout/stderr) with a phase header
    fn log_build_output(&mut self, phase: &str, stdout: &str, stderr: &str) {
        self.log_line(&format!("=== {} ===", phase));
        if !stdout.is_empty() {
            self.log.push_str(stdout);
            self.log.push('\n');
        }
        if !stderr.is_empty() {
            self.log.push_str(stderr);
            self.log.push('\n');
        }
    }
}

/// Names of executable files directly inside `dir`
pub(super) fn executables_in(dir: &Path) -> Result<BTreeSet<String>> {
    if !dir.exists() {
        return Ok(BTreeSet::new());
    }

    Ok(fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| is_executable(&e.path()))
        .filter_map(|e| e.file_name().into_string().ok())
        .collect())
}

#[cfg(unix)]
pub(crate) fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub(crate) fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
