// src/recipe/kitchen/toolchain.rs

//! Toolchain lookup for declared dependencies

use crate::error::{Error, Result};
use crate::recipe::format::Dependency;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;

/// Locates the executables that satisfy declared dependencies
///
/// This keeps the Kitchen decoupled from how the host provides tools, so
/// tests can point it at a directory of stand-ins.
pub trait ToolchainResolver: Send + Sync {
    /// Find an executable by command name
    fn locate(&self, command: &str) -> Option<PathBuf>;

    /// Names of dependencies with no command available on the host
    fn check_missing(&self, deps: &[&Dependency]) -> Vec<String> {
        deps.iter()
            .filter(|d| d.commands().iter().all(|c| self.locate(c).is_none()))
            .map(|d| d.name.clone())
            .collect()
    }
}

/// Resolver backed by a `PATH`-style search path
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    search_path: Option<OsString>,
}

impl PathResolver {
    /// Resolve against the process `PATH`
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve against an explicit search path
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }
}

impl ToolchainResolver for PathResolver {
    fn locate(&self, command: &str) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().ok()?;
                which::which_in(command, Some(paths), cwd)
            }
            None => which::which(command),
        };
        found.ok()
    }
}

/// Executables resolved for one phase, keyed by command name
#[derive(Debug, Default, Clone)]
pub struct Toolchain {
    tools: BTreeMap<String, PathBuf>,
}

impl Toolchain {
    /// Resolve every dependency, failing on the first one with no command
    pub fn resolve(resolver: &dyn ToolchainResolver, deps: &[&Dependency]) -> Result<Self> {
        let mut tools = BTreeMap::new();

        for dep in deps {
            let mut satisfied = false;
            for command in dep.commands() {
                if let Some(path) = resolver.locate(command) {
                    debug!("{} ({}) -> {}", dep.name, command, path.display());
                    tools.insert(command.to_string(), path);
                    satisfied = true;
                }
            }

            if !satisfied {
                return Err(Error::MissingDependency {
                    name: dep.name.clone(),
                    commands: dep.commands().join(", "),
                });
            }
        }

        Ok(Self { tools })
    }

    /// Path of a command, falling back to a direct lookup
    ///
    /// Used for tools the recipe does not declare, such as `git` for head
    /// builds.
    pub fn require(&self, resolver: &dyn ToolchainResolver, command: &str) -> Result<PathBuf> {
        if let Some(path) = self.tools.get(command) {
            return Ok(path.clone());
        }
        resolver
            .locate(command)
            .ok_or_else(|| Error::MissingDependency {
                name: command.to_string(),
                commands: command.to_string(),
            })
    }
}
