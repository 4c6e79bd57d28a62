// src/specifier.rs

//! Dependency specifiers: a package name optionally qualified with a
//! version constraint
//!
//! Requirement entries in a recipe are specifier strings:
//!
//! ```text
//! "pip"
//! "python >=3.7"
//! "pytorch ==1.12.*"
//! "numpy >=1.21,<2.0"
//! ```
//!
//! A specifier may also carry template placeholders (for example
//! `"cudatoolkit %(cuda_version)s"`); those must be expanded before the
//! specifier can be fully parsed.

use crate::error::{Error, Result};
use crate::template;
use crate::version::Constraint;
use std::fmt;

/// A parsed dependency specifier
#[derive(Debug, Clone, PartialEq)]
pub struct Specifier {
    pub name: String,
    pub constraint: Constraint,
}

impl Specifier {
    /// Parse a specifier string
    ///
    /// Template placeholders must already be expanded; use
    /// [`Specifier::check_raw`] for unexpanded recipe entries.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidSpecifier(
                s.to_string(),
                "empty specifier".to_string(),
            ));
        }

        let split = s.find(|c: char| c.is_whitespace() || matches!(c, '>' | '<' | '=' | '!'));
        let (name, rest) = match split {
            Some(pos) => (&s[..pos], s[pos..].trim()),
            None => (s, ""),
        };

        if name.is_empty() {
            return Err(Error::InvalidSpecifier(
                s.to_string(),
                "missing package name".to_string(),
            ));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(Error::InvalidSpecifier(
                s.to_string(),
                format!("invalid character '{}' in package name", bad),
            ));
        }

        let constraint = if rest.is_empty() {
            Constraint::Any
        } else {
            Constraint::parse(rest)
                .map_err(|e| Error::InvalidSpecifier(s.to_string(), e.to_string()))?
        };

        Ok(Self {
            name: name.to_string(),
            constraint,
        })
    }

    /// Syntactic check for a raw recipe entry
    ///
    /// Entries carrying template placeholders cannot be fully parsed until
    /// the build environment is known, so only well-formedness of the
    /// placeholders and non-emptiness are checked in that case.
    pub fn check_raw(s: &str) -> Result<()> {
        if s.trim().is_empty() {
            return Err(Error::InvalidSpecifier(
                s.to_string(),
                "empty specifier".to_string(),
            ));
        }
        template::check_syntax(s)?;
        if template::has_placeholders(s) {
            return Ok(());
        }
        Self::parse(s).map(|_| ())
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Constraint::Any => write!(f, "{}", self.name),
            constraint => write!(f, "{} {}", self.name, constraint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::PkgVersion;

    #[test]
    fn test_parse_bare_name() {
        let spec = Specifier::parse("pip").unwrap();
        assert_eq!(spec.name, "pip");
        assert_eq!(spec.constraint, Constraint::Any);
    }

    #[test]
    fn test_parse_with_constraint() {
        let spec = Specifier::parse("python >=3.7").unwrap();
        assert_eq!(spec.name, "python");
        assert!(spec.constraint.satisfies(&PkgVersion::parse("3.8").unwrap()));
        assert!(!spec.constraint.satisfies(&PkgVersion::parse("3.6").unwrap()));
    }

    #[test]
    fn test_parse_no_space_before_operator() {
        let spec = Specifier::parse("numpy>=1.21").unwrap();
        assert_eq!(spec.name, "numpy");
        assert!(
            spec.constraint
                .satisfies(&PkgVersion::parse("1.21").unwrap())
        );
    }

    #[test]
    fn test_parse_prefix_constraint() {
        let spec = Specifier::parse("pytorch ==1.12.*").unwrap();
        assert_eq!(spec.name, "pytorch");
        assert!(
            spec.constraint
                .satisfies(&PkgVersion::parse("1.12.1").unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(Specifier::parse("").is_err());
        assert!(Specifier::parse("   ").is_err());
        assert!(Specifier::parse(">=1.0").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_name() {
        assert!(Specifier::parse("bad name/here 1.0").is_err());
    }

    #[test]
    fn test_check_raw_with_placeholder() {
        assert!(Specifier::check_raw("cudatoolkit %(cuda_version)s").is_ok());
        assert!(Specifier::check_raw("cudatoolkit %(cuda_version").is_err());
        assert!(Specifier::check_raw("").is_err());
    }

    #[test]
    fn test_check_raw_without_placeholder_parses() {
        assert!(Specifier::check_raw("scipy >=1.5").is_ok());
        assert!(Specifier::check_raw("sci py >=1.5").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Specifier::parse("pip").unwrap().to_string(), "pip");
        assert_eq!(
            Specifier::parse("python >=3.7").unwrap().to_string(),
            "python >=3.7"
        );
    }
}
