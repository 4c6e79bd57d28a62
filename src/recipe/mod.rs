// src/recipe/mod.rs

//! Recipe system for describing and producing package builds
//!
//! A recipe is a declarative document with four logical concerns:
//! - Package identity (name and version)
//! - Source location (a fetchable archive URL)
//! - Requirement sets (host-time vs run-time specifiers)
//! - Build and test instructions (build string, build script, import checks)
//!
//! # Culinary Terminology
//!
//! Recipes keep the traditional cooking metaphors:
//! - **Recipe**: the build description (like a recipe card)
//! - **Cook**: process a recipe end to end
//! - **Kitchen**: the environment the cook runs in
//! - **Prep**: fetch the source archive
//! - **Simmer**: run the build script
//! - **Taste**: the post-build import smoke tests
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "pytorch-geometric"
//! version = "2.1.0"
//!
//! [source]
//! url = "https://pypi.io/packages/source/t/torch-geometric/torch_geometric-%(version)s.tar.gz"
//!
//! [requirements]
//! host = ["python >=3.7", "pip"]
//! run = ["python >=3.7", "tqdm", "scipy", "pytorch %(torch_version)s"]
//!
//! [build]
//! string = "py%(py)s_torch%(torch_version)s_cu%(cuda_version)s"
//! script = "python -m pip install . --no-deps -vv"
//!
//! [test]
//! imports = ["torch_geometric", "torch_geometric.nn"]
//!
//! [about]
//! home = "https://github.com/pyg-team/pytorch_geometric"
//! license = "MIT"
//! summary = "Graph Neural Network Library for PyTorch"
//! ```
//!
//! Placeholders like `%(py)s` are resolved from the build environment;
//! the recipe never defines their values.

mod format;
mod kitchen;
pub mod parser;

pub use format::{
    AboutSection, BuildSection, PackageSection, Recipe, RequirementsSection, SourceSection,
    TestSection,
};
pub use kitchen::{CookResult, Kitchen, KitchenConfig};
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};
