// src/lib.rs

//! Sous recipe processor
//!
//! Sous parses, validates, renders, and cooks declarative package-build
//! recipes. A recipe names a package, points at its source archive,
//! declares host-time and run-time requirements, and carries the build
//! string template, build script, and post-build import checks.
//!
//! # Architecture
//!
//! - Recipes are immutable configuration: authored once, read at build time
//! - Template placeholders (`%(var)s`) resolve from recipe built-ins and
//!   the invoking build environment; resolution is strict
//! - Requirement specifiers keep declaration order and parse into
//!   name + version-constraint pairs
//! - The Kitchen runs the build pipeline: prep (fetch), simmer (build),
//!   taste (import smoke tests)

pub mod download;
mod error;
pub mod recipe;
pub mod specifier;
pub mod template;
pub mod version;

pub use download::SourceClient;
pub use error::{Error, Result};
pub use recipe::{
    CookResult, Kitchen, KitchenConfig, Recipe, parse_recipe, parse_recipe_file, validate_recipe,
};
pub use specifier::Specifier;
pub use template::TemplateVars;
pub use version::{Constraint, PkgVersion};
