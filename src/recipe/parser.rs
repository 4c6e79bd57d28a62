// src/recipe/parser.rs

//! Recipe document parsing and validation

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::specifier::Specifier;
use crate::template;
use std::path::Path;

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    parse_recipe(&content)
}

/// Validate a recipe for completeness and correctness
///
/// Invariant violations are errors; missing optional metadata produces
/// warnings for the caller to report.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if recipe.package.name.is_empty() {
        return Err(Error::ParseError(
            "Recipe package name cannot be empty".to_string(),
        ));
    }
    if recipe.package.version.is_empty() {
        return Err(Error::ParseError(
            "Recipe package version cannot be empty".to_string(),
        ));
    }

    if recipe.source.url.trim().is_empty() {
        return Err(Error::ParseError(
            "Recipe source URL cannot be empty".to_string(),
        ));
    }
    template::check_syntax(&recipe.source.url)?;

    // Templates must be well-formed so they resolve deterministically
    template::check_syntax(&recipe.build.string)?;
    template::check_syntax(&recipe.build.script)?;

    if recipe.build.script.trim().is_empty() {
        return Err(Error::ParseError(
            "Recipe build script cannot be empty".to_string(),
        ));
    }

    // Every requirement entry must at least be syntactically a specifier
    for entry in recipe
        .requirements
        .host
        .iter()
        .chain(recipe.requirements.run.iter())
    {
        Specifier::check_raw(entry)?;
    }

    for import in &recipe.test.imports {
        if import.trim().is_empty() {
            return Err(Error::ParseError(
                "Test import names cannot be empty".to_string(),
            ));
        }
    }

    if recipe.about.summary.is_none() {
        warnings.push("Missing package summary".to_string());
    }
    if recipe.about.license.is_none() {
        warnings.push("Missing package license".to_string());
    }
    if recipe.about.home.is_none() {
        warnings.push("Missing package homepage".to_string());
    }
    if recipe.test.imports.is_empty() {
        warnings.push("No import smoke tests declared".to_string());
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_recipe() {
        let content = r#"
[package]
name = "pytorch-geometric"
version = "2.1.0"

[source]
url = "https://example.com/%(name)s-%(version)s.tar.gz"

[build]
string = "py%(py)s_0"
script = "python -m pip install . --no-deps -vv"

[test]
imports = ["torch_geometric"]
"#;

        let recipe = parse_recipe(content).unwrap();
        assert_eq!(recipe.package.name, "pytorch-geometric");
    }

    #[test]
    fn test_parse_invalid_recipe() {
        let content = "this is not valid toml at all {}";
        assert!(parse_recipe(content).is_err());
    }

    #[test]
    fn test_validate_empty_name() {
        let content = r#"
[package]
name = ""
version = "1.0"

[source]
url = "https://example.com/test.tar.gz"

[build]
string = "0"
script = "make"
"#;

        let recipe = parse_recipe(content).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_empty_version() {
        let content = r#"
[package]
name = "test"
version = ""

[source]
url = "https://example.com/test.tar.gz"

[build]
string = "0"
script = "make"
"#;

        let recipe = parse_recipe(content).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_bad_specifier() {
        let content = r#"
[package]
name = "test"
version = "1.0"

[source]
url = "https://example.com/test.tar.gz"

[requirements]
run = ["not a/valid specifier"]

[build]
string = "0"
script = "make"
"#;

        let recipe = parse_recipe(content).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_empty_import_name() {
        let content = r#"
[package]
name = "test"
version = "1.0"

[source]
url = "https://example.com/test.tar.gz"

[build]
string = "0"
script = "make"

[test]
imports = ["good", ""]
"#;

        let recipe = parse_recipe(content).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_unterminated_placeholder() {
        let content = r#"
[package]
name = "test"
version = "1.0"

[source]
url = "https://example.com/test.tar.gz"

[build]
string = "py%(py"
script = "make"
"#;

        let recipe = parse_recipe(content).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_warnings() {
        let content = r#"
[package]
name = "test"
version = "1.0"

[source]
url = "https://example.com/test.tar.gz"

[build]
string = "0"
script = "make"
"#;

        let recipe = parse_recipe(content).unwrap();
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.iter().any(|w| w.contains("summary")));
        assert!(warnings.iter().any(|w| w.contains("license")));
        assert!(warnings.iter().any(|w| w.contains("homepage")));
        assert!(warnings.iter().any(|w| w.contains("smoke tests")));
    }

    #[test]
    fn test_validate_templated_specifier_accepted() {
        let content = r#"
[package]
name = "test"
version = "1.0"

[source]
url = "https://example.com/test.tar.gz"

[requirements]
host = ["pytorch %(torch_version)s"]

[build]
string = "0"
script = "make"
"#;

        let recipe = parse_recipe(content).unwrap();
        assert!(validate_recipe(&recipe).is_ok());
    }
}
