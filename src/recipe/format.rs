// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML documents describing how to produce a distributable
//! package: identity, source location, host/run requirements, build
//! instructions, post-build import checks, and descriptive metadata.
//! A recipe is authored once and read at build time; it is immutable
//! configuration, never a live object.

use crate::error::Result;
use crate::specifier::Specifier;
use crate::template::{self, TemplateVars};
use serde::{Deserialize, Serialize};

/// A complete package-build recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Package identity
    pub package: PackageSection,

    /// Source archive location
    pub source: SourceSection,

    /// Host-time and run-time requirements
    #[serde(default)]
    pub requirements: RequirementsSection,

    /// Build string template and build script
    pub build: BuildSection,

    /// Post-build import smoke tests
    #[serde(default)]
    pub test: TestSection,

    /// Descriptive metadata
    #[serde(default)]
    pub about: AboutSection,
}

impl Recipe {
    /// Variable bindings derived from the recipe itself
    pub fn builtin_vars(&self) -> TemplateVars {
        TemplateVars::new()
            .with("name", self.package.name.clone())
            .with("version", self.package.version.clone())
    }

    /// Bindings for expansion: built-ins overlaid with the caller's environment
    ///
    /// The environment wins on conflict, so an invoker can pin `version`
    /// for a rebuild without editing the recipe.
    pub fn vars(&self, env: &TemplateVars) -> TemplateVars {
        self.builtin_vars().merged(env)
    }

    /// Source URL with placeholders expanded
    pub fn source_url(&self, env: &TemplateVars) -> Result<String> {
        template::expand(&self.source.url, &self.vars(env))
    }

    /// Filename component of the expanded source URL
    pub fn source_filename(&self, env: &TemplateVars) -> Result<String> {
        let url = self.source_url(env)?;
        Ok(url
            .split('/')
            .next_back()
            .filter(|s| !s.is_empty())
            .unwrap_or("source.tar.gz")
            .to_string())
    }

    /// The resolved build string
    pub fn build_string(&self, env: &TemplateVars) -> Result<String> {
        template::expand(&self.build.string, &self.vars(env))
    }

    /// The artifact's identifying string: `name-version-buildstring`
    pub fn artifact_ident(&self, env: &TemplateVars) -> Result<String> {
        Ok(format!(
            "{}-{}-{}",
            self.package.name,
            self.package.version,
            self.build_string(env)?
        ))
    }

    /// The resolved build script
    pub fn build_script(&self, env: &TemplateVars) -> Result<String> {
        template::expand(&self.build.script, &self.vars(env))
    }

    /// Host requirements as parsed specifiers, declaration order preserved
    pub fn host_specifiers(&self, env: &TemplateVars) -> Result<Vec<Specifier>> {
        self.specifiers(&self.requirements.host, env)
    }

    /// Run requirements as parsed specifiers, declaration order preserved
    pub fn run_specifiers(&self, env: &TemplateVars) -> Result<Vec<Specifier>> {
        self.specifiers(&self.requirements.run, env)
    }

    fn specifiers(&self, raw: &[String], env: &TemplateVars) -> Result<Vec<Specifier>> {
        let vars = self.vars(env);
        raw.iter()
            .map(|entry| {
                let expanded = template::expand(entry, &vars)?;
                Specifier::parse(&expanded)
            })
            .collect()
    }

    /// A fully expanded copy of the recipe
    ///
    /// Every templated field is resolved against the recipe built-ins and
    /// the supplied environment. Fails on the first unresolved placeholder.
    pub fn render(&self, env: &TemplateVars) -> Result<Recipe> {
        let vars = self.vars(env);
        let expand_all = |entries: &[String]| -> Result<Vec<String>> {
            entries.iter().map(|e| template::expand(e, &vars)).collect()
        };

        Ok(Recipe {
            package: self.package.clone(),
            source: SourceSection {
                url: template::expand(&self.source.url, &vars)?,
            },
            requirements: RequirementsSection {
                host: expand_all(&self.requirements.host)?,
                run: expand_all(&self.requirements.run)?,
            },
            build: BuildSection {
                string: template::expand(&self.build.string, &vars)?,
                script: template::expand(&self.build.script, &vars)?,
            },
            test: self.test.clone(),
            about: self.about.clone(),
        })
    }

    /// Serialize back to the recipe document format
    pub fn to_document(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::error::Error::ParseError(format!("Serialization failed: {}", e)))
    }
}

/// Package identity section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,
}

/// Source archive section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSection {
    /// Source archive URL
    ///
    /// Supports `%(name)s` / `%(version)s` substitution.
    /// Example: `https://pypi.io/packages/source/t/%(name)s/%(name)s-%(version)s.tar.gz`
    pub url: String,
}

/// Host-time and run-time requirement lists
///
/// Both lists hold raw specifier strings in declaration order; entries may
/// carry template placeholders resolved from the build environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RequirementsSection {
    /// Requirements needed on the build host
    #[serde(default)]
    pub host: Vec<String>,

    /// Requirements needed at run time
    #[serde(default)]
    pub run: Vec<String>,
}

/// Build instructions section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSection {
    /// Template for the artifact's identifying string
    ///
    /// Example: `py%(py)s_torch%(torch_version)s_cu%(cuda_version)s`
    pub string: String,

    /// Shell command that performs the build
    pub script: String,
}

/// Post-build smoke test section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TestSection {
    /// Module names expected to be importable after the build
    ///
    /// Every listed import is attempted; any failure fails the build.
    #[serde(default)]
    pub imports: Vec<String>,
}

/// Descriptive metadata section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AboutSection {
    /// Homepage URL
    #[serde(default)]
    pub home: Option<String>,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,

    /// One-line summary
    #[serde(default)]
    pub summary: Option<String>,
}
