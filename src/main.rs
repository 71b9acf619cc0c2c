// src/main.rs

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let phase = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<lala_recipe::Error>())
                .and_then(|e| e.phase());
            match phase {
                Some(phase) => eprintln!("Error ({} phase): {:#}", phase, err),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that never read a recipe
    match &cli.command {
        Commands::Checksum { file, algorithm } => return commands::cmd_checksum(file, algorithm),
        Commands::Completions { shell } => return commands::cmd_completions(*shell),
        _ => {}
    }

    let recipe = commands::load_recipe(cli.recipe.as_deref())?;

    match cli.command {
        Commands::Info { json } => commands::cmd_info(&recipe, json),
        Commands::Validate => commands::cmd_validate(&recipe),
        Commands::Resolve { head, json } => commands::cmd_resolve(&recipe, head, json),
        Commands::Fetch {
            head,
            source_cache,
            offline,
        } => commands::cmd_fetch(&recipe, head, source_cache, offline),
        Commands::Install {
            head,
            prefix,
            source_cache,
            jobs,
            keep_builddir,
            offline,
            skip_test,
            keep_scratch,
        } => commands::cmd_install(
            &recipe,
            head,
            prefix,
            source_cache,
            jobs,
            keep_builddir,
            offline,
            skip_test,
            keep_scratch,
        ),
        Commands::Test {
            prefix,
            keep_scratch,
            json,
        } => commands::cmd_test(&recipe, prefix, keep_scratch, json),
        Commands::Checksum { .. } | Commands::Completions { .. } => Ok(()),
    }
}
