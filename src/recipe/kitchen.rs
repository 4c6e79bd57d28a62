// src/recipe/kitchen.rs

//! Kitchen: the environment where recipes are cooked
//!
//! Cooking a recipe runs three phases:
//! - **Prep**: expand and fetch the source archive
//! - **Simmer**: run the build script under `sh -c` with a timeout; the
//!   fetched archive's path is exported to the script as `SRC_ARCHIVE`
//! - **Taste**: attempt every declared import through the interpreter
//!
//! The artifact identity string is resolved before anything is invoked,
//! so an incomplete build environment fails fast with the name of the
//! missing variable.

use crate::download::{SourceClient, fetch_progress_bar};
use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::template::TemplateVars;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Timeout for the build script
    pub timeout: Duration,
    /// Interpreter used for import smoke tests
    pub python: String,
    /// Keep the work directory after completion (for debugging)
    pub keep_workdir: bool,
    /// Show a progress bar while fetching the source archive
    pub show_progress: bool,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3600), // 1 hour
            python: "python".to_string(),
            keep_workdir: false,
            show_progress: true,
        }
    }
}

/// Result of cooking a recipe
#[derive(Debug)]
pub struct CookResult {
    /// The artifact's identifying string
    pub ident: String,
    /// Path to the fetched source archive
    pub archive_path: PathBuf,
    /// Build log
    pub log: String,
    /// Warnings generated during the cook
    pub warnings: Vec<String>,
}

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    config: KitchenConfig,
}

impl Kitchen {
    /// Create a new Kitchen with the given configuration
    pub fn new(config: KitchenConfig) -> Self {
        Self { config }
    }

    /// Create a Kitchen with default configuration
    pub fn with_defaults() -> Self {
        Self::new(KitchenConfig::default())
    }

    /// Cook a recipe: fetch, build, and smoke-test
    ///
    /// `env` supplies the build-environment variable bindings; the fetched
    /// archive is placed in `output_dir`.
    pub fn cook(
        &self,
        recipe: &Recipe,
        env: &TemplateVars,
        output_dir: &Path,
    ) -> Result<CookResult> {
        // Resolve the identity up front so unresolved variables fail
        // before any work happens
        let ident = recipe.artifact_ident(env)?;
        info!("Cooking {}", ident);

        let mut cook = Cook::new(self, recipe, env)?;

        info!("Prep: fetching source archive...");
        let archive_path = cook.prep(output_dir)?;

        info!("Simmer: running build script...");
        cook.simmer(&archive_path)?;

        info!("Taste: running import checks...");
        cook.taste()?;

        let Cook {
            workdir,
            mut log,
            warnings,
            ..
        } = cook;

        if self.config.keep_workdir {
            let kept = workdir.keep();
            log.push_str(&format!("Work directory kept at {}\n", kept.display()));
        }

        Ok(CookResult {
            ident,
            archive_path,
            log,
            warnings,
        })
    }
}

/// A single cook operation
struct Cook<'a> {
    kitchen: &'a Kitchen,
    recipe: &'a Recipe,
    /// Fully merged variable bindings (recipe built-ins + environment)
    vars: TemplateVars,
    /// Scratch directory for the build
    workdir: TempDir,
    /// Build log accumulator
    log: String,
    /// Warnings
    warnings: Vec<String>,
}

impl<'a> Cook<'a> {
    fn new(kitchen: &'a Kitchen, recipe: &'a Recipe, env: &TemplateVars) -> Result<Self> {
        let workdir = TempDir::new()
            .map_err(|e| Error::IoError(format!("Failed to create work directory: {}", e)))?;

        Ok(Self {
            kitchen,
            recipe,
            vars: recipe.vars(env),
            workdir,
            log: String::new(),
            warnings: Vec::new(),
        })
    }

    /// Phase 1: Prep - fetch the source archive into `output_dir`
    fn prep(&mut self, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;

        let url = self.recipe.source_url(&self.vars)?;
        let filename = self.recipe.source_filename(&self.vars)?;
        let dest = output_dir.join(&filename);

        let client = SourceClient::new()?;
        let bytes = if self.kitchen.config.show_progress {
            let pb = fetch_progress_bar();
            let result = client.download_file_with_progress(&url, &dest, Some(&pb));
            pb.finish_and_clear();
            result?
        } else {
            client.download_file(&url, &dest)?
        };

        self.log_line(&format!("Fetched {} ({} bytes)", url, bytes));
        Ok(dest)
    }

    /// Phase 2: Simmer - run the build script with a timeout
    ///
    /// The fetched archive's path is exported as `SRC_ARCHIVE` so the
    /// script can unpack and build from it.
    fn simmer(&mut self, archive: &Path) -> Result<()> {
        let script = crate::template::expand(&self.recipe.build.script, &self.vars)?;
        debug!("Build script: {}", script);

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&script)
            .current_dir(self.workdir.path())
            .env("PKG_NAME", &self.recipe.package.name)
            .env("PKG_VERSION", &self.recipe.package.version)
            .env("SRC_ARCHIVE", archive)
            .envs(self.vars.iter())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::BuildFailed(format!("Failed to run build script: {}", e)))?;

        // Drain the pipes on background threads; a script that writes more
        // than the OS pipe buffer would otherwise stall while we block in
        // wait_timeout and be misreported as a timeout
        let stdout_reader = child.stdout.take().map(drain_pipe);
        let stderr_reader = child.stderr.take().map(drain_pipe);

        let status = match child
            .wait_timeout(self.kitchen.config.timeout)
            .map_err(|e| Error::BuildFailed(format!("Failed to wait for build script: {}", e)))?
        {
            Some(status) => status,
            None => {
                child.kill().ok();
                child.wait().ok();
                return Err(Error::BuildFailed(format!(
                    "Build script timed out after {} seconds",
                    self.kitchen.config.timeout.as_secs()
                )));
            }
        };

        let stdout = stdout_reader.map(join_reader).unwrap_or_default();
        let stderr = stderr_reader.map(join_reader).unwrap_or_default();

        self.log_line("=== build ===");
        if !stdout.is_empty() {
            self.log.push_str(&stdout);
            self.log.push('\n');
        }
        if !stderr.is_empty() {
            self.log.push_str(&stderr);
            self.log.push('\n');
        }

        if !status.success() {
            return Err(Error::BuildFailed(format!(
                "Build script exited with code {:?}\nstderr: {}",
                status.code(),
                stderr
            )));
        }

        Ok(())
    }

    /// Phase 3: Taste - attempt every declared import
    ///
    /// Every listed module is attempted even after a failure, so the
    /// report names all broken imports at once. Any failure fails the cook.
    fn taste(&mut self) -> Result<()> {
        if self.recipe.test.imports.is_empty() {
            self.warnings
                .push("No import smoke tests declared".to_string());
            return Ok(());
        }

        let mut failed: Vec<String> = Vec::new();

        for module in &self.recipe.test.imports {
            debug!("Checking import: {}", module);
            let output = Command::new(&self.kitchen.config.python)
                .arg("-c")
                .arg(format!("import {}", module))
                .output()
                .map_err(|e| {
                    Error::ImportCheckFailed(format!(
                        "Failed to run interpreter '{}': {}",
                        self.kitchen.config.python, e
                    ))
                })?;

            if output.status.success() {
                self.log_line(&format!("import {} ... ok", module));
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!("Import failed: {} ({})", module, stderr.trim());
                self.log_line(&format!("import {} ... FAILED", module));
                failed.push(module.clone());
            }
        }

        if !failed.is_empty() {
            return Err(Error::ImportCheckFailed(format!(
                "{} of {} imports failed: {}",
                failed.len(),
                self.recipe.test.imports.len(),
                failed.join(", ")
            )));
        }

        Ok(())
    }

    fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }
}

/// Read a child pipe to completion on a background thread
fn drain_pipe<R: Read + Send + 'static>(mut pipe: R) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        pipe.read_to_string(&mut buf).ok();
        buf
    })
}

fn join_reader(handle: std::thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::parser::parse_recipe;

    fn test_recipe(script: &str, imports: &[&str]) -> Recipe {
        let imports_toml = imports
            .iter()
            .map(|m| format!("\"{}\"", m))
            .collect::<Vec<_>>()
            .join(", ");
        parse_recipe(&format!(
            r#"
[package]
name = "smoke"
version = "0.1"

[source]
url = "https://example.com/smoke-0.1.tar.gz"

[build]
string = "0"
script = '{}'

[test]
imports = [{}]
"#,
            script, imports_toml
        ))
        .unwrap()
    }

    #[test]
    fn test_kitchen_config_default() {
        let config = KitchenConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(3600));
        assert_eq!(config.python, "python");
        assert!(!config.keep_workdir);
    }

    #[test]
    fn test_simmer_runs_script() {
        let recipe = test_recipe("echo hello from the kitchen", &[]);
        let kitchen = Kitchen::with_defaults();
        let archive = tempfile::NamedTempFile::new().unwrap();
        let mut cook = Cook::new(&kitchen, &recipe, &TemplateVars::new()).unwrap();
        cook.simmer(archive.path()).unwrap();
        assert!(cook.log.contains("hello from the kitchen"));
    }

    #[test]
    fn test_simmer_exports_package_identity() {
        let recipe = test_recipe("test \"$PKG_NAME\" = smoke -a \"$PKG_VERSION\" = 0.1", &[]);
        let kitchen = Kitchen::with_defaults();
        let archive = tempfile::NamedTempFile::new().unwrap();
        let mut cook = Cook::new(&kitchen, &recipe, &TemplateVars::new()).unwrap();
        cook.simmer(archive.path()).unwrap();
    }

    #[test]
    fn test_simmer_sees_the_fetched_archive() {
        let recipe = test_recipe("test -f \"$SRC_ARCHIVE\"", &[]);
        let kitchen = Kitchen::with_defaults();
        let archive = tempfile::NamedTempFile::new().unwrap();
        let mut cook = Cook::new(&kitchen, &recipe, &TemplateVars::new()).unwrap();
        cook.simmer(archive.path()).unwrap();
    }

    #[test]
    fn test_simmer_fails_on_nonzero_exit() {
        let recipe = test_recipe("exit 3", &[]);
        let kitchen = Kitchen::with_defaults();
        let archive = tempfile::NamedTempFile::new().unwrap();
        let mut cook = Cook::new(&kitchen, &recipe, &TemplateVars::new()).unwrap();
        let err = cook.simmer(archive.path()).unwrap_err();
        assert!(matches!(err, Error::BuildFailed(_)));
    }

    #[test]
    fn test_simmer_drains_large_output() {
        // 256 KiB of stdout, several pipe buffers worth; a quick script
        // this chatty must finish well inside the timeout
        let recipe = test_recipe("yes | head -c 262144", &[]);
        let kitchen = Kitchen::new(KitchenConfig {
            timeout: Duration::from_secs(5),
            ..KitchenConfig::default()
        });
        let archive = tempfile::NamedTempFile::new().unwrap();
        let mut cook = Cook::new(&kitchen, &recipe, &TemplateVars::new()).unwrap();
        cook.simmer(archive.path()).unwrap();
        assert!(cook.log.len() >= 262144);
    }

    #[test]
    fn test_simmer_times_out() {
        let recipe = test_recipe("sleep 30", &[]);
        let kitchen = Kitchen::new(KitchenConfig {
            timeout: Duration::from_millis(200),
            ..KitchenConfig::default()
        });
        let archive = tempfile::NamedTempFile::new().unwrap();
        let mut cook = Cook::new(&kitchen, &recipe, &TemplateVars::new()).unwrap();
        let err = cook.simmer(archive.path()).unwrap_err();
        match err {
            Error::BuildFailed(msg) => assert!(msg.contains("timed out")),
            other => panic!("expected BuildFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_taste_reports_every_failed_import() {
        // `sh` as the interpreter: `sh -c "import <m>"` fails because no
        // such command exists, which exercises the all-imports reporting
        let recipe = test_recipe("true", &["first_missing", "second_missing"]);
        let kitchen = Kitchen::new(KitchenConfig {
            python: "sh".to_string(),
            ..KitchenConfig::default()
        });
        let mut cook = Cook::new(&kitchen, &recipe, &TemplateVars::new()).unwrap();
        let err = cook.taste().unwrap_err();
        match err {
            Error::ImportCheckFailed(msg) => {
                assert!(msg.contains("first_missing"));
                assert!(msg.contains("second_missing"));
                assert!(msg.contains("2 of 2"));
            }
            other => panic!("expected ImportCheckFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_taste_passes_with_no_imports() {
        let recipe = test_recipe("true", &[]);
        let kitchen = Kitchen::with_defaults();
        let mut cook = Cook::new(&kitchen, &recipe, &TemplateVars::new()).unwrap();
        cook.taste().unwrap();
        assert!(cook.warnings.iter().any(|w| w.contains("smoke tests")));
    }

    #[test]
    fn test_taste_succeeds_with_passing_imports() {
        // `true` ignores its arguments and exits 0, standing in for an
        // interpreter whose imports all succeed
        let recipe = test_recipe("true", &["anything"]);
        let kitchen = Kitchen::new(KitchenConfig {
            python: "true".to_string(),
            ..KitchenConfig::default()
        });
        let mut cook = Cook::new(&kitchen, &recipe, &TemplateVars::new()).unwrap();
        cook.taste().unwrap();
        assert!(cook.log.contains("import anything ... ok"));
    }
}
