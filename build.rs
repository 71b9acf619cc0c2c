// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: development head selector
fn head_arg() -> Arg {
    Arg::new("head")
        .long("head")
        .action(ArgAction::SetTrue)
        .help("Use the development head instead of the stable archive")
}

/// Common argument: installation prefix
fn prefix_arg() -> Arg {
    Arg::new("prefix")
        .long("prefix")
        .value_name("DIR")
        .help("Installation prefix (default: ~/.local)")
}

/// Common argument: source cache directory
fn source_cache_arg() -> Arg {
    Arg::new("source_cache")
        .long("source-cache")
        .value_name("DIR")
        .help("Directory for cached source archives")
}

fn flag(name: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(long).action(ArgAction::SetTrue).help(help)
}

fn build_cli() -> Command {
    Command::new("lala-recipe")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Lala Contributors")
        .about("Build, install and smoke-test lala from source")
        .subcommand_required(true)
        .arg(
            Arg::new("recipe")
                .long("recipe")
                .value_name("PATH")
                .global(true)
                .help("Recipe file to use instead of the built-in lala recipe"),
        )
        .subcommand(
            Command::new("info")
                .about("Show recipe metadata")
                .arg(flag("json", "json", "Output as JSON")),
        )
        .subcommand(Command::new("validate").about("Validate the recipe and print warnings"))
        .subcommand(
            Command::new("resolve")
                .about("Show the source the recipe resolves to")
                .arg(head_arg())
                .arg(flag("json", "json", "Output as JSON")),
        )
        .subcommand(
            Command::new("fetch")
                .about("Fetch and verify the source without building")
                .arg(head_arg())
                .arg(source_cache_arg())
                .arg(flag("offline", "offline", "Only use sources already in the cache")),
        )
        .subcommand(
            Command::new("install")
                .about("Build and install the binary, then run the smoke test")
                .arg(head_arg())
                .arg(prefix_arg())
                .arg(source_cache_arg())
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .value_name("N")
                        .help("Number of parallel build jobs"),
                )
                .arg(flag(
                    "keep_builddir",
                    "keep-builddir",
                    "Keep the build directory after completion",
                ))
                .arg(flag("offline", "offline", "Only use sources already in the cache"))
                .arg(flag("skip_test", "skip-test", "Skip the post-install smoke test"))
                .arg(flag(
                    "keep_scratch",
                    "keep-scratch",
                    "Keep the smoke-test scratch directory",
                )),
        )
        .subcommand(
            Command::new("test")
                .about("Smoke-test an installed binary")
                .arg(prefix_arg())
                .arg(flag(
                    "keep_scratch",
                    "keep-scratch",
                    "Keep the scratch directory and print its path",
                ))
                .arg(flag("json", "json", "Output the report as JSON")),
        )
        .subcommand(
            Command::new("checksum")
                .about("Compute the checksum of a local archive")
                .arg(Arg::new("file").required(true).help("Archive file to hash"))
                .arg(
                    Arg::new("algorithm")
                        .long("algorithm")
                        .default_value("sha256")
                        .help("Hash algorithm (sha256 or sha512)"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(Arg::new("shell").required(true).help("Shell to generate completions for")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("lala-recipe.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
