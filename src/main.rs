// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lint { recipe } => commands::cmd_lint(&recipe),
        Commands::Render {
            recipe,
            env,
            ident,
            json,
        } => commands::cmd_render(&recipe, &env, ident, json),
        Commands::Deps { recipe, env, json } => commands::cmd_deps(&recipe, &env, json),
        Commands::Fetch {
            recipe,
            env,
            output_dir,
        } => commands::cmd_fetch(&recipe, &env, &output_dir),
        Commands::Cook {
            recipe,
            env,
            output_dir,
            python,
            timeout,
            keep_workdir,
        } => commands::cmd_cook(&recipe, &env, &output_dir, &python, timeout, keep_workdir),
    }
}
