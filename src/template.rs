// src/template.rs

//! Template placeholder expansion
//!
//! Recipes reference build-environment values through `%(name)s`
//! placeholders, the same form used in source URLs, build strings, and
//! requirement specifiers:
//!
//! ```text
//! url = "https://pypi.io/packages/source/t/%(name)s/%(name)s-%(version)s.tar.gz"
//! string = "py%(py)s_torch%(torch_version)s_cu%(cuda_version)s"
//! ```
//!
//! Expansion is strict: a placeholder with no binding fails with an error
//! naming the variable, so a recipe either resolves deterministically or
//! is rejected before anything is fetched or invoked.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Variable bindings for template expansion
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    vars: HashMap<String, String>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings taken from the process environment
    pub fn from_process_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Parse `KEY=VALUE` pairs (e.g. from `--env` flags)
    pub fn from_pairs(pairs: &[String]) -> Result<Self> {
        let mut vars = HashMap::new();
        for pair in pairs {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                Error::ParseError(format!(
                    "Invalid environment binding '{}': expected KEY=VALUE",
                    pair
                ))
            })?;
            if key.is_empty() {
                return Err(Error::ParseError(format!(
                    "Invalid environment binding '{}': empty key",
                    pair
                )));
            }
            vars.insert(key.to_string(), value.to_string());
        }
        Ok(Self { vars })
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    /// Overlay `other` on top of these bindings; `other` wins on conflict
    pub fn merged(&self, other: &TemplateVars) -> TemplateVars {
        let mut vars = self.vars.clone();
        for (k, v) in &other.vars {
            vars.insert(k.clone(), v.clone());
        }
        TemplateVars { vars }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Expand every `%(var)s` placeholder in `template`
///
/// Fails with [`Error::UnresolvedVariable`] on the first placeholder with
/// no binding, and with a parse error on a `%(` that never closes.
pub fn expand(template: &str, vars: &TemplateVars) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("%(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find(")s").ok_or_else(|| {
            Error::ParseError(format!("Unterminated placeholder in '{}'", template))
        })?;
        let name = &after[..end];
        match vars.get(name) {
            Some(value) => out.push_str(value),
            None => return Err(Error::UnresolvedVariable(name.to_string())),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

/// List the placeholder names in `template`, in order of first reference
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("%(") {
        let after = &rest[start + 2..];
        match after.find(")s") {
            Some(end) => {
                let name = &after[..end];
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
                rest = &after[end + 2..];
            }
            None => break,
        }
    }

    names
}

pub fn has_placeholders(template: &str) -> bool {
    !placeholders(template).is_empty()
}

/// Check that every `%(` in `template` closes with `)s`
pub fn check_syntax(template: &str) -> Result<()> {
    let mut rest = template;
    while let Some(start) = rest.find("%(") {
        let after = &rest[start + 2..];
        let end = after.find(")s").ok_or_else(|| {
            Error::ParseError(format!("Unterminated placeholder in '{}'", template))
        })?;
        rest = &after[end + 2..];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> TemplateVars {
        TemplateVars::new()
            .with("name", "pytorch-geometric")
            .with("version", "2.1.0")
            .with("py", "38")
    }

    #[test]
    fn test_expand_builtin() {
        let out = expand("%(name)s-%(version)s.tar.gz", &vars()).unwrap();
        assert_eq!(out, "pytorch-geometric-2.1.0.tar.gz");
    }

    #[test]
    fn test_expand_no_placeholders() {
        let out = expand("plain string", &vars()).unwrap();
        assert_eq!(out, "plain string");
    }

    #[test]
    fn test_expand_unresolved_names_variable() {
        let err = expand("py%(py)s_cu%(cuda_version)s", &vars()).unwrap_err();
        match err {
            Error::UnresolvedVariable(name) => assert_eq!(name, "cuda_version"),
            other => panic!("expected UnresolvedVariable, got {:?}", other),
        }
    }

    #[test]
    fn test_expand_unterminated() {
        assert!(expand("prefix %(oops", &vars()).is_err());
    }

    #[test]
    fn test_placeholders_order_and_dedup() {
        let names = placeholders("%(b)s %(a)s %(b)s");
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_check_syntax() {
        assert!(check_syntax("%(ok)s and %(also)s").is_ok());
        assert!(check_syntax("%(broken").is_err());
    }

    #[test]
    fn test_from_pairs() {
        let vars =
            TemplateVars::from_pairs(&["py=38".to_string(), "cuda_version=11.3".to_string()])
                .unwrap();
        assert_eq!(vars.get("py"), Some("38"));
        assert_eq!(vars.get("cuda_version"), Some("11.3"));

        assert!(TemplateVars::from_pairs(&["nodelimiter".to_string()]).is_err());
        assert!(TemplateVars::from_pairs(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_merged_overlay_wins() {
        let base = TemplateVars::new().with("py", "37").with("keep", "yes");
        let overlay = TemplateVars::new().with("py", "38");
        let merged = base.merged(&overlay);
        assert_eq!(merged.get("py"), Some("38"));
        assert_eq!(merged.get("keep"), Some("yes"));
    }
}
