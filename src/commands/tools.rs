// src/commands/tools.rs

//! Utility commands

use crate::cli::Cli;
use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::Shell;
use lala_recipe::hash::hash_file;
use lala_recipe::HashAlgorithm;
use std::path::Path;

/// Print the prefixed checksum of a local file
///
/// The output is ready to paste into a recipe's `checksum` field.
pub fn cmd_checksum(file: &Path, algorithm: &str) -> Result<()> {
    let algorithm: HashAlgorithm = algorithm
        .parse()
        .with_context(|| format!("Unsupported hash algorithm: {}", algorithm))?;

    let hash = hash_file(algorithm, file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    println!("{}", hash.to_prefixed_string());
    Ok(())
}

/// Write a shell completion script to stdout
pub fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "lala-recipe", &mut std::io::stdout());
    Ok(())
}
