// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! solid-register CLI - require files through compile-on-require hooks

mod setup;

use clap::Parser;
use owo_colors::OwoColorize;
use solid_register_core::{Runtime, VERSION};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "solid-register",
    about = "Require component and test files without a build step",
    version = VERSION,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Files to require, after the configured setup files
    files: Vec<PathBuf>,

    /// Directory to discover the project configuration from
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Print the merged configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("solid_register=debug,solid_register_core=debug,solid_register_config=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("warn")
            .init();
    }

    let cwd = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let loaded = solid_register_config::discover(&cwd)?;
    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&loaded.config)?);
        return Ok(());
    }

    let runtime = Runtime::with_default_evaluator();
    let register = setup::build_register(&loaded.config)?;
    register.init(&runtime)?;

    for file in &loaded.config.setup_files {
        if let Err(e) = runtime.require_from_dir(file, &loaded.project_root) {
            eprintln!("{}: setup file {}: {}", "Error".red().bold(), file.cyan(), e);
            std::process::exit(1);
        }
    }

    for file in &cli.files {
        let specifier = setup::specifier(file);
        match runtime.require_from_dir(&specifier, &cwd) {
            Ok(exports) => {
                println!("{}", file.display().to_string().cyan().bold());
                println!("{}", serde_json::to_string_pretty(&exports)?);
            }
            Err(e) => {
                eprintln!("{}: {}", "Error".red().bold(), e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
