// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.
//!
//! A `Fixture` lays out an upstream directory served over `file://`, a
//! toolchain directory holding a stand-in `cargo`, and the prefix and source
//! cache the Kitchen writes to.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use lala_recipe::hash::hash_file;
use lala_recipe::recipe::parse_recipe;
use lala_recipe::{Hash, HashAlgorithm, Kitchen, KitchenConfig, Recipe};
use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use url::Url;

/// Stand-in for `cargo install`: copies `lala.sh` from the source tree to
/// `<root>/bin/<bin>` and touches `$LALA_BUILD_MARKER` when it runs.
const FAKE_CARGO: &str = r#"#!/bin/sh
root=""
src=""
bin=""
while [ $# -gt 0 ]; do
  case "$1" in
    --root) root="$2"; shift 2 ;;
    --path) src="$2"; shift 2 ;;
    --bin) bin="$2"; shift 2 ;;
    *) shift ;;
  esac
done
if [ -n "$LALA_BUILD_MARKER" ]; then
  touch "$LALA_BUILD_MARKER"
fi
test -f "$src/Cargo.toml" || { echo "no manifest in $src" >&2; exit 101; }
mkdir -p "$root/bin"
cp "$src/lala.sh" "$root/bin/$bin"
chmod 755 "$root/bin/$bin"
"#;

/// A lala stand-in that passes every smoke check
pub const GOOD_LALA: &str = r#"#!/bin/sh
case "$1" in
  --version) echo "lala 0.1.0" ;;
  --help) echo "Modern text editor with multi-format preview support" ;;
  markdown) test -f "$2" && cat "$2" ;;
  *) echo "unknown command: $1" >&2; exit 2 ;;
esac
"#;

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("upstream")).unwrap();
        fs::create_dir_all(dir.path().join("toolbin")).unwrap();
        Self { dir }
    }

    pub fn prefix(&self) -> PathBuf {
        self.dir.path().join("prefix")
    }

    pub fn source_cache(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    pub fn toolbin(&self) -> PathBuf {
        self.dir.path().join("toolbin")
    }

    /// File the stand-in cargo touches when the build step runs
    pub fn build_marker(&self) -> PathBuf {
        self.dir.path().join("build-ran")
    }

    pub fn binary_path(&self) -> PathBuf {
        self.prefix().join("bin").join("lala")
    }

    /// Put a stand-in `cargo` on the toolchain search path
    pub fn install_fake_cargo(&self) {
        write_executable(&self.toolbin().join("cargo"), FAKE_CARGO);
    }

    /// Publish a release archive whose "build" installs `lala_script`
    pub fn publish_release(&self, lala_script: &str) -> (String, Hash) {
        let archive = self.dir.path().join("upstream").join("v0.1.0.tar.gz");
        write_source_archive(&archive, "lala-0.1.0", lala_script);

        let url = Url::from_file_path(&archive).unwrap().to_string();
        let checksum = hash_file(HashAlgorithm::Sha256, &archive).unwrap();
        (url, checksum)
    }

    /// A recipe for the release at `url`, declaring `checksum`
    pub fn recipe(&self, url: &str, checksum: &str) -> Recipe {
        let archive = url.replace("v0.1.0", "v%(version)s");
        parse_recipe(&format!(
            r#"
[package]
name = "lala"
version = "0.1.0"
description = "Modern text editor with multi-format preview support"

[source]
archive = "{archive}"
checksum = "{checksum}"

[[build.dependencies]]
name = "rust"
commands = ["cargo"]

[build.environment]
LALA_BUILD_MARKER = "{marker}"

[test]
expect_help = "Modern text editor"
"#,
            marker = self.build_marker().display(),
        ))
        .unwrap()
    }

    /// Commit a source tree to a local git repository on branch `main`
    ///
    /// Returns the `file://` URL of the repository.
    pub fn publish_head(&self, git: &Path, lala_script: &str) -> String {
        let repo = self.dir.path().join("upstream").join("lala.git");
        write_source_tree(&repo, lala_script);

        let run = |args: &[&str]| {
            let status = Command::new(git)
                .args(args)
                .current_dir(&repo)
                .env("GIT_CONFIG_NOSYSTEM", "1")
                .env("HOME", self.dir.path())
                .status()
                .unwrap();
            assert!(status.success(), "git {:?} failed", args);
        };
        run(&["init", "-q"]);
        run(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        run(&["add", "."]);
        run(&[
            "-c",
            "user.name=Lala Tests",
            "-c",
            "user.email=tests@example.com",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "-q",
            "-m",
            "Initial import",
        ]);

        Url::from_file_path(&repo).unwrap().to_string()
    }

    /// A recipe that only declares a development head at `repository`
    pub fn head_recipe(&self, repository: &str) -> Recipe {
        parse_recipe(&format!(
            r#"
[package]
name = "lala"
version = "0.1.0"

[source.head]
repository = "{repository}"
branch = "main"

[[build.dependencies]]
name = "rust"
commands = ["cargo"]

[build.environment]
LALA_BUILD_MARKER = "{marker}"
"#,
            marker = self.build_marker().display(),
        ))
        .unwrap()
    }

    pub fn config(&self) -> KitchenConfig {
        let mut config = KitchenConfig::with_dirs(self.prefix(), self.source_cache());
        config.search_path = Some(self.toolbin().into_os_string());
        config
    }

    pub fn kitchen(&self) -> Kitchen {
        Kitchen::new(self.config())
    }

    /// Replace the installed binary with `script`
    pub fn install_binary(&self, script: &str) {
        fs::create_dir_all(self.prefix().join("bin")).unwrap();
        write_executable(&self.binary_path(), script);
    }
}

pub fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Lay out the files of a lala source tree under `root`
pub fn write_source_tree(root: &Path, lala_script: &str) {
    for (name, content) in source_files(lala_script) {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

fn source_files(lala_script: &str) -> [(&'static str, &str); 3] {
    [
        ("Cargo.toml", "[package]\nname = \"lala\"\nversion = \"0.1.0\"\n"),
        ("src/main.rs", "fn main() {}\n"),
        ("lala.sh", lala_script),
    ]
}

/// Write a `.tar.gz` shaped like a GitHub release archive
pub fn write_source_archive(path: &Path, top: &str, lala_script: &str) {
    let file = File::create(path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, content) in source_files(lala_script) {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{}/{}", top, name), content.as_bytes())
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap();
}
