// src/commands.rs

//! Command implementations for the sous CLI

use anyhow::{Context, Result};
use serde_json::json;
use sous::recipe::{Kitchen, KitchenConfig, Recipe, parse_recipe_file, validate_recipe};
use sous::template::TemplateVars;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Build the template environment: process env overlaid with --env pairs
fn build_env(pairs: &[String]) -> Result<TemplateVars> {
    let explicit = TemplateVars::from_pairs(pairs).context("Invalid --env binding")?;
    Ok(TemplateVars::from_process_env().merged(&explicit))
}

/// Parse and validate a recipe, reporting warnings
fn load_recipe(recipe_path: &str) -> Result<Recipe> {
    let path = Path::new(recipe_path);
    let recipe = parse_recipe_file(path)
        .with_context(|| format!("Failed to parse recipe: {}", path.display()))?;

    let warnings = validate_recipe(&recipe).context("Recipe validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    Ok(recipe)
}

/// Parse and validate a recipe
pub fn cmd_lint(recipe_path: &str) -> Result<()> {
    let path = Path::new(recipe_path);
    println!("Reading recipe: {}", path.display());

    let recipe = parse_recipe_file(path)
        .with_context(|| format!("Failed to parse recipe: {}", path.display()))?;

    println!(
        "Recipe: {} version {}",
        recipe.package.name, recipe.package.version
    );

    let warnings = validate_recipe(&recipe).context("Recipe validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    if warnings.is_empty() {
        println!("[OK] No issues found");
    } else {
        println!("[OK] {} warning(s)", warnings.len());
    }
    Ok(())
}

/// Expand templates and print the rendered recipe
pub fn cmd_render(recipe_path: &str, env_pairs: &[String], ident: bool, json: bool) -> Result<()> {
    let recipe = load_recipe(recipe_path)?;
    let env = build_env(env_pairs)?;

    if ident {
        let ident = recipe
            .artifact_ident(&env)
            .context("Failed to resolve artifact identity")?;
        println!("{}", ident);
        return Ok(());
    }

    let rendered = recipe.render(&env).context("Failed to render recipe")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        print!("{}", rendered.to_document()?);
    }
    Ok(())
}

/// List host and run requirements in declaration order
pub fn cmd_deps(recipe_path: &str, env_pairs: &[String], json: bool) -> Result<()> {
    let recipe = load_recipe(recipe_path)?;
    let env = build_env(env_pairs)?;

    let host = recipe
        .host_specifiers(&env)
        .context("Failed to resolve host requirements")?;
    let run = recipe
        .run_specifiers(&env)
        .context("Failed to resolve run requirements")?;

    if json {
        let doc = json!({
            "host": host.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            "run": run.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("host:");
        for spec in &host {
            println!("  {}", spec);
        }
        println!("run:");
        for spec in &run {
            println!("  {}", spec);
        }
    }
    Ok(())
}

/// Download the source archive
pub fn cmd_fetch(recipe_path: &str, env_pairs: &[String], output_dir: &str) -> Result<()> {
    let recipe = load_recipe(recipe_path)?;
    let env = build_env(env_pairs)?;

    let url = recipe
        .source_url(&env)
        .context("Failed to resolve source URL")?;
    let filename = recipe.source_filename(&env)?;

    let output_dir = Path::new(output_dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let dest = output_dir.join(&filename);

    info!("Fetching {}", url);
    let client = sous::SourceClient::new()?;
    let pb = sous::download::fetch_progress_bar();
    let bytes = client.download_file_with_progress(&url, &dest, Some(&pb))?;
    pb.finish_and_clear();

    println!("Fetched {} ({} bytes)", dest.display(), bytes);
    Ok(())
}

/// Cook a recipe: fetch, build, and smoke-test
pub fn cmd_cook(
    recipe_path: &str,
    env_pairs: &[String],
    output_dir: &str,
    python: &str,
    timeout_secs: u64,
    keep_workdir: bool,
) -> Result<()> {
    let recipe = load_recipe(recipe_path)?;
    let env = build_env(env_pairs)?;

    let kitchen = Kitchen::new(KitchenConfig {
        timeout: Duration::from_secs(timeout_secs),
        python: python.to_string(),
        keep_workdir,
        show_progress: true,
    });

    let result = kitchen
        .cook(&recipe, &env, Path::new(output_dir))
        .with_context(|| format!("Failed to cook {}", recipe.package.name))?;

    for warning in &result.warnings {
        println!("Warning: {}", warning);
    }
    println!("Cooked: {}", result.ident);
    println!("  Archive: {}", result.archive_path.display());
    Ok(())
}
