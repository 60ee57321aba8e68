//! # Project Names
//!
//! `ProjectName`, a validated newtype for the name of a project in a
//! package index.
//!
//! ## Naming Rule
//!
//! A raw name consists of ASCII letters, digits, `.`, `-`, and `_`, and
//! must begin and end with a letter or digit. Display casing is preserved;
//! comparison across documents is defined over the *normalized* form:
//! lowercase, with every run of `.`, `-`, `_` collapsed to a single `-`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PidxError;

/// A validated project name.
///
/// Stores the name exactly as supplied. Two differently-spelled names can
/// denote the same project; use [`ProjectName::normalized()`] or
/// [`ProjectName::matches()`] when comparing across documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectName(String);

impl ProjectName {
    /// Parse and validate a project name.
    ///
    /// # Errors
    ///
    /// Returns [`PidxError::InvalidName`] if the name is empty, contains a
    /// character outside `[A-Za-z0-9._-]`, or starts/ends with a separator.
    pub fn parse(raw: &str) -> Result<Self, PidxError> {
        let bytes = raw.as_bytes();
        if bytes.is_empty() {
            return Err(PidxError::InvalidName("name is empty".to_string()));
        }
        if !bytes[0].is_ascii_alphanumeric() || !bytes[bytes.len() - 1].is_ascii_alphanumeric() {
            return Err(PidxError::InvalidName(format!(
                "{raw:?} must start and end with a letter or digit"
            )));
        }
        for &b in bytes {
            if !b.is_ascii_alphanumeric() && !matches!(b, b'.' | b'-' | b'_') {
                return Err(PidxError::InvalidName(format!(
                    "{raw:?} contains {:?}; only letters, digits, '.', '-', '_' are allowed",
                    char::from(b)
                )));
            }
        }
        Ok(Self(raw.to_string()))
    }

    /// The name exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The normalized form: lowercase, runs of `.`, `-`, `_` collapsed to `-`.
    pub fn normalized(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut in_separator = false;
        for c in self.0.chars() {
            if matches!(c, '.' | '-' | '_') {
                in_separator = true;
            } else {
                if in_separator {
                    out.push('-');
                    in_separator = false;
                }
                out.push(c.to_ascii_lowercase());
            }
        }
        out
    }

    /// Whether two names denote the same project (normalized comparison).
    pub fn matches(&self, other: &ProjectName) -> bool {
        self.normalized() == other.normalized()
    }
}

impl FromStr for ProjectName {
    type Err = PidxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProjectName {
    type Error = PidxError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ProjectName> for String {
    fn from(name: ProjectName) -> Self {
        name.0
    }
}

impl std::fmt::Display for ProjectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_name() {
        let name = ProjectName::parse("requests").unwrap();
        assert_eq!(name.as_str(), "requests");
    }

    #[test]
    fn parse_preserves_casing() {
        let name = ProjectName::parse("Django").unwrap();
        assert_eq!(name.as_str(), "Django");
        assert_eq!(name.normalized(), "django");
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(ProjectName::parse("").is_err());
    }

    #[test]
    fn parse_rejects_leading_separator() {
        assert!(ProjectName::parse("-pkg").is_err());
        assert!(ProjectName::parse(".pkg").is_err());
        assert!(ProjectName::parse("_pkg").is_err());
    }

    #[test]
    fn parse_rejects_trailing_separator() {
        assert!(ProjectName::parse("pkg-").is_err());
        assert!(ProjectName::parse("pkg.").is_err());
    }

    #[test]
    fn parse_rejects_invalid_characters() {
        assert!(ProjectName::parse("my pkg").is_err());
        assert!(ProjectName::parse("pkg/mod").is_err());
        assert!(ProjectName::parse("päckage").is_err());
    }

    #[test]
    fn normalized_collapses_separator_runs() {
        let name = ProjectName::parse("My.._-Pkg").unwrap();
        assert_eq!(name.normalized(), "my-pkg");
    }

    #[test]
    fn matches_across_spellings() {
        let a = ProjectName::parse("friendly-bard").unwrap();
        let b = ProjectName::parse("Friendly._.Bard").unwrap();
        assert!(a.matches(&b));
        // Raw equality is spelling-sensitive.
        assert_ne!(a, b);
    }

    #[test]
    fn single_character_name() {
        let name = ProjectName::parse("a").unwrap();
        assert_eq!(name.normalized(), "a");
    }

    #[test]
    fn serde_roundtrip() {
        let name = ProjectName::parse("my-pkg").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"my-pkg\"");
        let parsed: ProjectName = serde_json::from_str(&json).unwrap();
        assert_eq!(name, parsed);
    }

    #[test]
    fn serde_rejects_invalid() {
        let result: Result<ProjectName, _> = serde_json::from_str("\"-bad-\"");
        assert!(result.is_err());
    }

    #[test]
    fn display_matches_as_str() {
        let name = ProjectName::parse("Pkg_One").unwrap();
        assert_eq!(name.to_string(), name.as_str());
    }
}
