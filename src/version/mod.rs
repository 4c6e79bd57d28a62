// src/version/mod.rs

//! Version handling and constraint satisfaction for requirement specifiers
//!
//! This module parses Python-ecosystem version strings, including the
//! optional epoch (`1!2.0`) and local label (`1.12.0+cu113`) components,
//! and evaluates the constraint expressions used in recipe requirements.

use crate::error::{Error, Result};
use semver::Version;
use std::cmp::Ordering;
use std::fmt;

/// A parsed package version with epoch, release, and local components
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PkgVersion {
    pub epoch: u64,
    pub release: String,
    pub local: Option<String>,
}

impl PkgVersion {
    /// Parse a version string
    ///
    /// Format: [epoch!]release[+local]
    /// Examples:
    /// - "2.1.0" → epoch=0, release="2.1.0", local=None
    /// - "1!2.1.0" → epoch=1, release="2.1.0", local=None
    /// - "1.12.0+cu113" → epoch=0, release="1.12.0", local=Some("cu113")
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        let (epoch_str, rest) = match s.find('!') {
            Some(pos) => (&s[..pos], &s[pos + 1..]),
            None => ("0", s),
        };

        let epoch = if epoch_str.is_empty() {
            0
        } else {
            epoch_str.parse::<u64>().map_err(|e| {
                Error::ParseError(format!("Invalid epoch in version '{}': {}", s, e))
            })?
        };

        let (release, local) = match rest.find('+') {
            Some(pos) => (rest[..pos].to_string(), Some(rest[pos + 1..].to_string())),
            None => (rest.to_string(), None),
        };

        if release.is_empty() {
            return Err(Error::ParseError(format!(
                "Empty release component in version '{}'",
                s
            )));
        }
        if let Some(bad) = release
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(Error::ParseError(format!(
                "Invalid character '{}' in version '{}'",
                bad, s
            )));
        }

        Ok(Self {
            epoch,
            release,
            local,
        })
    }

    /// Convert to a semver::Version for comparison
    ///
    /// Release strings are not always semver-compliant (e.g. "1.12" or
    /// "2.1.0.post1"), so we normalize: parse directly when possible,
    /// otherwise take the leading numeric segments as major.minor.patch.
    fn to_semver(&self) -> Option<Version> {
        if let Ok(v) = Version::parse(&self.release) {
            return Some(v);
        }

        let parts: Vec<&str> = self.release.split('.').collect();
        let major = parts.first().and_then(|s| s.parse::<u64>().ok())?;
        let minor = parts.get(1).and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);
        let patch = parts.get(2).and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);

        Some(Version::new(major, minor, patch))
    }

    /// Compare two versions: epoch first, then release, then local label
    pub fn compare(&self, other: &PkgVersion) -> Ordering {
        match self.epoch.cmp(&other.epoch) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match (self.to_semver(), other.to_semver()) {
            (Some(v1), Some(v2)) => match v1.cmp(&v2) {
                Ordering::Equal => {}
                ord => return ord,
            },
            _ => match self.release.cmp(&other.release) {
                Ordering::Equal => {}
                ord => return ord,
            },
        }

        self.local.cmp(&other.local)
    }

    /// Check whether the release matches a `==X.Y.*` style prefix
    ///
    /// The match is segment-aligned: "1.12" matches "1.12" and "1.12.0"
    /// but not "1.120".
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.release == prefix
            || self
                .release
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl fmt::Display for PkgVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}!", self.epoch)?;
        }
        write!(f, "{}", self.release)?;
        if let Some(ref local) = self.local {
            write!(f, "+{}", local)?;
        }
        Ok(())
    }
}

impl Ord for PkgVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for PkgVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Version constraint operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Any version is acceptable
    Any,
    /// Exact version match
    Exact(PkgVersion),
    /// Not equal
    NotEqual(PkgVersion),
    /// Greater than
    GreaterThan(PkgVersion),
    /// Greater than or equal
    GreaterOrEqual(PkgVersion),
    /// Less than
    LessThan(PkgVersion),
    /// Less than or equal
    LessOrEqual(PkgVersion),
    /// Release prefix match, from `==X.Y.*`
    Prefix(String),
    /// Both constraints must be satisfied (for ranges like ">=1.0,<2.0")
    And(Box<Constraint>, Box<Constraint>),
}

impl Constraint {
    /// Parse a constraint expression
    ///
    /// Examples:
    /// - ">=3.7" → GreaterOrEqual(3.7)
    /// - "==2.1.0" → Exact(2.1.0)
    /// - "==1.12.*" → Prefix("1.12")
    /// - ">=1.0,<2.0" → And(GreaterOrEqual(1.0), LessThan(2.0))
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "*" {
            return Ok(Constraint::Any);
        }

        if s.contains(',') {
            // Comma-joined clauses fold into a left-nested conjunction
            let mut clauses = s.split(',').map(|p| p.trim());
            let first = Self::parse(clauses.next().unwrap_or_default())?;
            return clauses.try_fold(first, |acc, clause| {
                Ok(Constraint::And(
                    Box::new(acc),
                    Box::new(Self::parse(clause)?),
                ))
            });
        }

        if let Some(rest) = s.strip_prefix("==").or_else(|| s.strip_prefix('=')) {
            let rest = rest.trim();
            if let Some(prefix) = rest.strip_suffix(".*") {
                if prefix.is_empty() {
                    return Err(Error::ParseError(format!(
                        "Invalid prefix constraint '{}'",
                        s
                    )));
                }
                return Ok(Constraint::Prefix(prefix.to_string()));
            }
            return Ok(Constraint::Exact(PkgVersion::parse(rest)?));
        }

        if let Some(rest) = s.strip_prefix("!=") {
            Ok(Constraint::NotEqual(PkgVersion::parse(rest)?))
        } else if let Some(rest) = s.strip_prefix(">=") {
            Ok(Constraint::GreaterOrEqual(PkgVersion::parse(rest)?))
        } else if let Some(rest) = s.strip_prefix("<=") {
            Ok(Constraint::LessOrEqual(PkgVersion::parse(rest)?))
        } else if let Some(rest) = s.strip_prefix('>') {
            Ok(Constraint::GreaterThan(PkgVersion::parse(rest)?))
        } else if let Some(rest) = s.strip_prefix('<') {
            Ok(Constraint::LessThan(PkgVersion::parse(rest)?))
        } else {
            // No operator means exact match
            Ok(Constraint::Exact(PkgVersion::parse(s)?))
        }
    }

    /// Check if a version satisfies this constraint
    pub fn satisfies(&self, version: &PkgVersion) -> bool {
        match self {
            Constraint::Any => true,
            Constraint::Exact(v) => version == v,
            Constraint::NotEqual(v) => version != v,
            Constraint::GreaterThan(v) => version > v,
            Constraint::GreaterOrEqual(v) => version >= v,
            Constraint::LessThan(v) => version < v,
            Constraint::LessOrEqual(v) => version <= v,
            Constraint::Prefix(p) => version.matches_prefix(p),
            Constraint::And(left, right) => left.satisfies(version) && right.satisfies(version),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Any => write!(f, "*"),
            Constraint::Exact(v) => write!(f, "=={}", v),
            Constraint::NotEqual(v) => write!(f, "!={}", v),
            Constraint::GreaterThan(v) => write!(f, ">{}", v),
            Constraint::GreaterOrEqual(v) => write!(f, ">={}", v),
            Constraint::LessThan(v) => write!(f, "<{}", v),
            Constraint::LessOrEqual(v) => write!(f, "<={}", v),
            Constraint::Prefix(p) => write!(f, "=={}.*", p),
            Constraint::And(left, right) => write!(f, "{},{}", left, right),
        }
    }
}
