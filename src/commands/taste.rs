// src/commands/taste.rs

//! Smoke test command

use anyhow::{Context, Result};
use lala_recipe::{Kitchen, KitchenConfig, Recipe, TasteReport};
use std::path::PathBuf;

/// Smoke-test an installed binary
pub fn cmd_test(
    recipe: &Recipe,
    prefix: Option<PathBuf>,
    keep_scratch: bool,
    json: bool,
) -> Result<()> {
    let mut config = KitchenConfig {
        keep_scratch,
        ..Default::default()
    };
    if let Some(dir) = prefix {
        config.prefix = dir;
    }

    let kitchen = Kitchen::new(config);
    let report = kitchen
        .test(recipe)
        .with_context(|| format!("Smoke test failed for {}", recipe.package.name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

pub(super) fn print_report(report: &TasteReport) {
    for outcome in &report.checks {
        println!(
            "[OK] {} check: {} ({} ms)",
            outcome.check, outcome.command, outcome.duration_ms
        );
    }
    println!("\n[COMPLETE] {} passed all checks", report.binary_path.display());
    if let Some(dir) = &report.scratch_dir {
        println!("Scratch directory kept at {}", dir.display());
    }
}
