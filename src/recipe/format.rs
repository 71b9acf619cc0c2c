// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files that describe how to fetch, build and smoke-test a
//! single command-line tool.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use url::Url;

/// A complete recipe for building a package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata
    pub package: PackageSection,

    /// Versioned archive and development head
    pub source: SourceSection,

    /// Build backend and dependencies
    #[serde(default)]
    pub build: BuildSection,

    /// Post-install smoke test
    #[serde(default)]
    pub test: TestSection,
}

impl Recipe {
    /// Substitute variables in a string
    ///
    /// Replaces `%(version)s` and `%(name)s` with the package values.
    pub fn substitute(&self, template: &str) -> String {
        template
            .replace("%(version)s", &self.package.version)
            .replace("%(name)s", &self.package.name)
    }

    /// Get the archive URL with variables substituted
    pub fn archive_url(&self) -> Option<String> {
        self.source.archive.as_deref().map(|a| self.substitute(a))
    }

    /// Get the archive filename from the last path segment of the URL
    ///
    /// Query strings and fragments are not part of the name.
    pub fn archive_filename(&self) -> String {
        self.archive_url()
            .and_then(|raw| Url::parse(&raw).ok())
            .and_then(|url| {
                url.path_segments()
                    .and_then(|mut segments| segments.next_back())
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "source.tar.gz".to_string())
    }

    /// Name of the executable the build must produce
    pub fn binary_name(&self) -> &str {
        self.package.binary.as_deref().unwrap_or(&self.package.name)
    }

    /// Dependencies required in the given lifecycle phase
    pub fn dependencies_for(&self, phase: DependencyPhase) -> Vec<&Dependency> {
        self.build
            .dependencies
            .iter()
            .filter(|d| d.phase == phase)
            .collect()
    }

    /// Version fragment the `--version` output must contain
    pub fn expected_version(&self) -> &str {
        self.test
            .expect_version
            .as_deref()
            .unwrap_or(&self.package.version)
    }

    /// Description fragment the `--help` output must contain
    pub fn expected_help(&self) -> &str {
        self.test
            .expect_help
            .as_deref()
            .unwrap_or(&self.package.description)
    }
}

/// Package metadata section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Homepage URL
    #[serde(default)]
    pub homepage: Option<String>,

    /// License expression (SPDX)
    #[serde(default)]
    pub license: Option<String>,

    /// Executable name, when it differs from the package name
    #[serde(default)]
    pub binary: Option<String>,
}

/// Source section: the stable archive and the optional development head
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSection {
    /// Versioned archive URL
    ///
    /// Supports `%(version)s` substitution.
    /// Example: `https://github.com/example/lala/archive/v%(version)s.tar.gz`
    #[serde(default)]
    pub archive: Option<String>,

    /// Checksum for the archive (sha256:...)
    #[serde(default)]
    pub checksum: Option<String>,

    /// Development head
    #[serde(default)]
    pub head: Option<HeadSection>,
}

/// Version-control head reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadSection {
    /// Repository URL (anything `git clone` accepts)
    pub repository: String,

    /// Branch to check out
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

/// Build instructions section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSection {
    #[serde(default)]
    pub backend: BuildBackend,

    /// Declared dependencies
    ///
    /// Format: `[{ name = "rust", phase = "build", commands = ["cargo"] }]`
    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    /// Environment variables to set during build
    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// Number of parallel jobs (default: let the backend decide)
    #[serde(default)]
    pub jobs: Option<u32>,
}

/// The external toolchain that compiles and installs the package
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildBackend {
    #[default]
    Cargo,
}

impl BuildBackend {
    /// Command the backend is invoked through
    pub fn program(&self) -> &'static str {
        match self {
            BuildBackend::Cargo => "cargo",
        }
    }

    /// Standard installer arguments for this backend
    ///
    /// The prefix and source directory come from the installer, never from
    /// the recipe.
    pub fn std_args(
        &self,
        prefix: &Path,
        source_dir: &Path,
        binary: &str,
        jobs: Option<u32>,
    ) -> Vec<OsString> {
        match self {
            BuildBackend::Cargo => {
                let mut args: Vec<OsString> = vec![
                    "install".into(),
                    "--locked".into(),
                    "--root".into(),
                    prefix.as_os_str().to_owned(),
                    "--path".into(),
                    source_dir.as_os_str().to_owned(),
                    "--bin".into(),
                    binary.into(),
                ];
                if let Some(jobs) = jobs {
                    args.push("--jobs".into());
                    args.push(jobs.to_string().into());
                }
                args
            }
        }
    }
}

impl fmt::Display for BuildBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// A declared dependency and the lifecycle phase that needs it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,

    #[serde(default)]
    pub phase: DependencyPhase,

    /// Executables that satisfy this dependency; defaults to `[name]`
    #[serde(default)]
    pub commands: Vec<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, phase: DependencyPhase) -> Self {
        Self {
            name: name.into(),
            phase,
            commands: Vec::new(),
        }
    }

    pub fn with_commands(mut self, commands: &[&str]) -> Self {
        self.commands = commands.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Executables to look for on the host
    pub fn commands(&self) -> Vec<&str> {
        if self.commands.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.commands.iter().map(|c| c.as_str()).collect()
        }
    }

    pub fn provides(&self, command: &str) -> bool {
        self.commands().contains(&command)
    }
}

/// When a dependency is needed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyPhase {
    /// Needed to build and install, not to run
    #[default]
    Build,
    /// Needed only by the smoke test
    Test,
    /// Needed by the installed program at run time
    Runtime,
}

impl DependencyPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyPhase::Build => "build",
            DependencyPhase::Test => "test",
            DependencyPhase::Runtime => "runtime",
        }
    }
}

impl fmt::Display for DependencyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Smoke test configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSection {
    #[serde(default = "default_version_flag")]
    pub version_flag: String,

    /// Expected fragment of the version output (default: package version)
    #[serde(default)]
    pub expect_version: Option<String>,

    #[serde(default = "default_help_flag")]
    pub help_flag: String,

    /// Expected fragment of the help output (default: package description)
    #[serde(default)]
    pub expect_help: Option<String>,

    #[serde(default)]
    pub render: RenderCheck,
}

impl Default for TestSection {
    fn default() -> Self {
        Self {
            version_flag: default_version_flag(),
            expect_version: None,
            help_flag: default_help_flag(),
            expect_help: None,
            render: RenderCheck::default(),
        }
    }
}

fn default_version_flag() -> String {
    "--version".to_string()
}

fn default_help_flag() -> String {
    "--help".to_string()
}

/// Render a fixture file through one of the binary's view modes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderCheck {
    /// Subcommand naming the render mode
    #[serde(default = "default_render_mode")]
    pub mode: String,

    /// Fixture file name, relative to the scratch directory
    #[serde(default = "default_fixture")]
    pub fixture: String,

    #[serde(default = "default_fixture_content")]
    pub content: String,

    /// Arguments after the fixture path
    #[serde(default = "default_render_args")]
    pub args: Vec<String>,
}

impl Default for RenderCheck {
    fn default() -> Self {
        Self {
            mode: default_render_mode(),
            fixture: default_fixture(),
            content: default_fixture_content(),
            args: default_render_args(),
        }
    }
}

fn default_render_mode() -> String {
    "markdown".to_string()
}

fn default_fixture() -> String {
    "test.md".to_string()
}

fn default_fixture_content() -> String {
    "# Test\nHello World".to_string()
}

fn default_render_args() -> Vec<String> {
    vec!["--no-color".to_string()]
}
