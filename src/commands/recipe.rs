// src/commands/recipe.rs

//! Recipe inspection commands

use anyhow::{Context, Result};
use lala_recipe::recipe::validate_recipe;
use lala_recipe::{Recipe, SourceRef, SourceSelector};

/// Show recipe metadata
pub fn cmd_info(recipe: &Recipe, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(recipe)?);
        return Ok(());
    }

    let package = &recipe.package;
    println!("Name: {}", package.name);
    println!("Version: {}", package.version);
    if !package.description.is_empty() {
        println!("Description: {}", package.description);
    }
    if let Some(homepage) = &package.homepage {
        println!("Homepage: {}", homepage);
    }
    if let Some(license) = &package.license {
        println!("License: {}", license);
    }
    println!("Binary: {}", recipe.binary_name());

    println!("\nSources:");
    match recipe.archive_url() {
        Some(url) => {
            println!("  Archive: {}", url);
            println!(
                "  Checksum: {}",
                recipe.source.checksum.as_deref().unwrap_or("(none)")
            );
        }
        None => println!("  Archive: (none)"),
    }
    match &recipe.source.head {
        Some(head) => println!("  Head: {} (branch {})", head.repository, head.branch),
        None => println!("  Head: (none)"),
    }

    println!("\nBuild:");
    println!("  Backend: {}", recipe.build.backend);
    for dep in &recipe.build.dependencies {
        println!(
            "  Depends: {} [{}] ({})",
            dep.name,
            dep.phase,
            dep.commands().join(", ")
        );
    }

    println!("\nSmoke test:");
    println!("  {} -> {:?}", recipe.test.version_flag, recipe.expected_version());
    println!("  {} -> {:?}", recipe.test.help_flag, recipe.expected_help());
    let render = &recipe.test.render;
    println!(
        "  {} {} {}",
        render.mode,
        render.fixture,
        render.args.join(" ")
    );

    Ok(())
}

/// Validate the recipe and print warnings
pub fn cmd_validate(recipe: &Recipe) -> Result<()> {
    println!("Recipe: {} version {}", recipe.package.name, recipe.package.version);

    let warnings = validate_recipe(recipe).with_context(|| "Recipe validation failed")?;

    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    println!("Recipe validation passed");
    if warnings.is_empty() {
        println!("[OK] No issues found");
    } else {
        println!("[OK] {} warning(s)", warnings.len());
    }
    Ok(())
}

/// Show the source the recipe resolves to
pub fn cmd_resolve(recipe: &Recipe, head: bool, json: bool) -> Result<()> {
    let selector = if head {
        SourceSelector::Head
    } else {
        SourceSelector::Stable
    };

    let source = recipe
        .resolve(selector)
        .with_context(|| format!("Failed to resolve source for {}", recipe.package.name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&source)?);
        return Ok(());
    }

    match &source {
        SourceRef::Archive {
            url,
            version,
            checksum,
        } => {
            println!("Archive: {}", url);
            println!("Version: {}", version);
            println!("Checksum: {}", checksum);
        }
        SourceRef::Head { repository, branch } => {
            println!("Head: {}", repository);
            println!("Branch: {}", branch);
            println!("[WARNING] Head sources are not integrity-checked");
        }
    }
    Ok(())
}
