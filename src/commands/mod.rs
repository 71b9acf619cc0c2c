// src/commands/mod.rs
//! Command handlers for the lala-recipe CLI

mod cook;
mod recipe;
mod taste;
mod tools;

pub use cook::{cmd_fetch, cmd_install};
pub use recipe::{cmd_info, cmd_resolve, cmd_validate};
pub use taste::cmd_test;
pub use tools::{cmd_checksum, cmd_completions};

use anyhow::{Context, Result};
use lala_recipe::recipe::{builtin_recipe, parse_recipe_file};
use lala_recipe::Recipe;
use std::path::Path;

/// Load the recipe named on the command line, or the built-in one
pub fn load_recipe(path: Option<&Path>) -> Result<Recipe> {
    match path {
        Some(path) => parse_recipe_file(path)
            .with_context(|| format!("Failed to parse recipe: {}", path.display())),
        None => builtin_recipe().context("Failed to parse built-in recipe"),
    }
}
