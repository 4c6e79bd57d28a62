// src/cli.rs

//! CLI definitions for the sous recipe processor
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sous")]
#[command(author = "Sous Project")]
#[command(version)]
#[command(
    about = "Recipe processor: parse, validate, render, and cook package-build recipes",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and validate a recipe
    Lint {
        /// Path to the recipe file
        recipe: String,
    },

    /// Expand templates and print the rendered recipe
    Render {
        /// Path to the recipe file
        recipe: String,

        /// Build-environment binding (repeatable)
        #[arg(short, long, value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Print only the artifact identity string
        #[arg(long)]
        ident: bool,

        /// Emit JSON instead of the recipe document format
        #[arg(long)]
        json: bool,
    },

    /// List host and run requirements in declaration order
    Deps {
        /// Path to the recipe file
        recipe: String,

        /// Build-environment binding (repeatable)
        #[arg(short, long, value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Download the source archive
    Fetch {
        /// Path to the recipe file
        recipe: String,

        /// Build-environment binding (repeatable)
        #[arg(short, long, value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Directory for the downloaded archive
        #[arg(short, long, default_value = ".")]
        output_dir: String,
    },

    /// Cook a recipe: fetch, build, and smoke-test
    Cook {
        /// Path to the recipe file
        recipe: String,

        /// Build-environment binding (repeatable)
        #[arg(short, long, value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Directory for the fetched archive
        #[arg(short, long, default_value = ".")]
        output_dir: String,

        /// Interpreter used for import smoke tests
        #[arg(long, default_value = "python")]
        python: String,

        /// Build script timeout in seconds
        #[arg(long, default_value_t = 3600)]
        timeout: u64,

        /// Keep the work directory after completion
        #[arg(long)]
        keep_workdir: bool,
    },
}
