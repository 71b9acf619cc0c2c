// src/commands/cook.rs

//! Fetch and install commands

use anyhow::{Context, Result};
use lala_recipe::{Kitchen, KitchenConfig, Recipe, SourceSelector};
use std::path::PathBuf;
use tracing::info;

use super::taste::print_report;

fn selector(head: bool) -> SourceSelector {
    if head {
        SourceSelector::Head
    } else {
        SourceSelector::Stable
    }
}

/// Fetch and verify the source without building
pub fn cmd_fetch(
    recipe: &Recipe,
    head: bool,
    source_cache: Option<PathBuf>,
    offline: bool,
) -> Result<()> {
    let mut config = KitchenConfig {
        offline,
        show_progress: true,
        ..Default::default()
    };
    if let Some(dir) = source_cache {
        config.source_cache = dir;
    }

    let kitchen = Kitchen::new(config);

    println!("Fetching sources for {} version {}...", recipe.package.name, recipe.package.version);
    let path = kitchen
        .fetch(recipe, selector(head))
        .with_context(|| format!("Failed to fetch sources for {}", recipe.package.name))?;

    println!("\n[COMPLETE] Fetched: {}", path.display());

    if !head && kitchen.sources_cached(recipe) {
        println!("[OK] Source is cached. Ready for offline build.");
    }

    Ok(())
}

/// Build and install a recipe, then smoke-test the result
#[allow(clippy::too_many_arguments)]
pub fn cmd_install(
    recipe: &Recipe,
    head: bool,
    prefix: Option<PathBuf>,
    source_cache: Option<PathBuf>,
    jobs: Option<u32>,
    keep_builddir: bool,
    offline: bool,
    skip_test: bool,
    keep_scratch: bool,
) -> Result<()> {
    let mut config = KitchenConfig {
        jobs,
        keep_builddir,
        keep_scratch,
        offline,
        show_progress: true,
        ..Default::default()
    };
    if let Some(dir) = prefix {
        config.prefix = dir;
    }
    if let Some(dir) = source_cache {
        config.source_cache = dir;
    }

    println!("Installing {} into {}", recipe.package.name, config.prefix.display());
    if head {
        println!("[WARNING] Building the development head: the source will not be checksum-verified");
    }

    let kitchen = Kitchen::new(config);

    if !head && kitchen.sources_cached(recipe) {
        println!("  - Source already cached (offline build possible)");
    }

    let result = kitchen
        .install(recipe, selector(head))
        .with_context(|| format!("Failed to install {}", recipe.package.name))?;

    println!("\n[COMPLETE] Installed: {}", result.binary_path.display());
    println!("  Source: {}", result.source);
    if result.from_cache {
        println!("  (source served from cache)");
    }
    if let Some(dir) = &result.build_dir {
        println!("  Build directory kept at {}", dir.display());
    }

    if !result.warnings.is_empty() {
        println!("\nBuild warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    info!(
        "Successfully installed {} to {}",
        recipe.package.name,
        result.binary_path.display()
    );

    if skip_test {
        println!("\nSkipping smoke test");
        return Ok(());
    }

    println!("\nTasting {}...", result.binary_path.display());
    let report = kitchen
        .test(recipe)
        .with_context(|| format!("Smoke test failed for {}", recipe.package.name))?;
    print_report(&report);

    Ok(())
}
