// src/recipe/kitchen/taste.rs

//! Taste: the post-install smoke test
//!
//! Three checks run against the installed binary in a fixed order and the
//! first failure stops the run. Every check runs with a scratch directory as
//! both working directory and `HOME`, so the binary cannot touch the user's
//! configuration.

use crate::error::{CheckKind, Error, Result};
use crate::recipe::format::Recipe;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Instant;
use tracing::{debug, info};

use super::config::{CheckOutcome, TasteReport};

/// Run the version, help and render checks against `binary`
pub(super) fn taste(recipe: &Recipe, binary: &Path, keep_scratch: bool) -> Result<TasteReport> {
    let scratch = tempfile::Builder::new()
        .prefix(&format!("{}-taste-", recipe.package.name))
        .tempdir()
        .map_err(|e| Error::IoError(format!("Failed to create scratch directory: {}", e)))?;

    info!("Tasting {}", binary.display());
    let checks = run_checks(recipe, binary, scratch.path());

    let scratch_dir = if keep_scratch {
        let path = scratch.keep();
        info!("Keeping scratch directory: {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(TasteReport {
        binary_path: binary.to_path_buf(),
        checks: checks?,
        scratch_dir,
    })
}

fn run_checks(recipe: &Recipe, binary: &Path, scratch: &Path) -> Result<Vec<CheckOutcome>> {
    let test = &recipe.test;
    let mut outcomes = Vec::with_capacity(3);

    let version = run(CheckKind::Version, binary, scratch, [&test.version_flag])?;
    expect_contains(&version, recipe.expected_version())?;
    outcomes.push(version);

    let help = run(CheckKind::Help, binary, scratch, [&test.help_flag])?;
    expect_contains(&help, recipe.expected_help())?;
    outcomes.push(help);

    let render = &test.render;
    fs::write(scratch.join(&render.fixture), &render.content).map_err(|e| {
        Error::SubprocessFailure {
            check: CheckKind::Render,
            reason: format!("Failed to write fixture {}: {}", render.fixture, e),
        }
    })?;
    debug!("Wrote fixture {}", render.fixture);

    let args = std::iter::once(&render.mode)
        .chain(std::iter::once(&render.fixture))
        .chain(render.args.iter());
    outcomes.push(run(CheckKind::Render, binary, scratch, args)?);

    Ok(outcomes)
}

/// Run one check; a spawn failure or non-zero exit is a subprocess failure
fn run<I, S>(check: CheckKind, binary: &Path, scratch: &Path, args: I) -> Result<CheckOutcome>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let command = std::iter::once(binary.display().to_string())
        .chain(args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ");
    debug!("{} check: {}", check, command);

    let start = Instant::now();
    let output = Command::new(binary)
        .args(&args)
        .current_dir(scratch)
        .env("HOME", scratch)
        .output()
        .map_err(|e| Error::SubprocessFailure {
            check,
            reason: format!("failed to run {}: {}", command, e),
        })?;
    let duration_ms = start.elapsed().as_millis();

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(Error::SubprocessFailure {
            check,
            reason: format!(
                "{} exited with code {:?}: {}",
                command,
                output.status.code(),
                combined.trim()
            ),
        });
    }

    info!("{} check passed ({} ms)", check, duration_ms);
    Ok(CheckOutcome {
        check,
        command,
        output: combined,
        duration_ms,
    })
}

fn expect_contains(outcome: &CheckOutcome, expected: &str) -> Result<()> {
    if outcome.output.contains(expected) {
        return Ok(());
    }
    Err(Error::AssertionFailure {
        check: outcome.check,
        expected: expected.to_string(),
        actual: outcome.output.trim().to_string(),
    })
}
