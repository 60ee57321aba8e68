//! # Version Identifiers
//!
//! Parsing, normalization, and ordering for version identifiers under the
//! index's versioning scheme:
//!
//! ```text
//! [N!]N(.N)*[{a|b|rc}N][.postN][.devN][+local]
//! ```
//!
//! ## Accepted Spellings
//!
//! Input is lenient and normalized on parse: an optional `v` prefix,
//! surrounding whitespace, arbitrary casing, `alpha`/`beta`/`c`/`pre`/
//! `preview` pre-release tags, `r`/`rev` post-release tags, the bare
//! `-N` post-release form, `-`/`_`/`.` separator variants, and implicit
//! zero numbers (`1.0a` means `1.0a0`). [`VersionId::canonical()`] renders
//! the one normalized form.
//!
//! ## Equality Invariant
//!
//! Equality and ordering are defined over parsed content, not spelling:
//! `1.0.0` equals `1.0` (trailing zero segments are insignificant) and
//! `1.0-ALPHA.1` equals `1.0a1`. `Hash` agrees with `Eq`, so version sets
//! deduplicate equivalent spellings.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PidxError;

/// Pre-release phase tag, ordered `a < b < rc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreTag {
    /// Alpha pre-release (`a`, also spelled `alpha`).
    Alpha,
    /// Beta pre-release (`b`, also spelled `beta`).
    Beta,
    /// Release candidate (`rc`, also spelled `c`, `pre`, `preview`).
    Rc,
}

impl PreTag {
    /// The canonical tag spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpha => "a",
            Self::Beta => "b",
            Self::Rc => "rc",
        }
    }

    fn from_spelling(s: &str) -> Option<Self> {
        match s {
            "a" | "alpha" => Some(Self::Alpha),
            "b" | "beta" => Some(Self::Beta),
            "rc" | "c" | "pre" | "preview" => Some(Self::Rc),
            _ => None,
        }
    }
}

/// One segment of a local version label.
///
/// Numeric segments compare numerically and order after textual segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocalSegment {
    /// A purely numeric segment.
    Number(u64),
    /// A textual (alphanumeric) segment, lowercased.
    Text(String),
}

impl Ord for LocalSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Greater,
            (Self::Text(_), Self::Number(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for LocalSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A parsed version identifier.
///
/// Construct with [`VersionId::parse()`] or `FromStr`. `Display` renders
/// the canonical form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreTag, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Vec<LocalSegment>,
}

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?xi)
            ^ \s* v?
            (?: (?P<epoch> \d+ ) ! )?
            (?P<release> \d+ (?: \. \d+ )* )
            (?: [-_.]? (?P<pre_tag> alpha | a | beta | b | preview | pre | c | rc )
                [-_.]? (?P<pre_n> \d+ )? )?
            (?:
                - (?P<post_n1> \d+ )
              | [-_.]? (?P<post_tag> post | rev | r ) [-_.]? (?P<post_n2> \d+ )?
            )?
            (?: [-_.]? (?P<dev_tag> dev ) [-_.]? (?P<dev_n> \d+ )? )?
            (?: \+ (?P<local> [a-z0-9]+ (?: [-_.] [a-z0-9]+ )* ) )?
            \s* $
            ",
        )
        .expect("static regex")
    })
}

impl VersionId {
    /// Parse a version string, accepting any of the lenient spellings.
    ///
    /// # Errors
    ///
    /// Returns [`PidxError::InvalidVersion`] carrying the offending input
    /// when the string does not match the scheme or a numeric component
    /// overflows 64 bits.
    pub fn parse(input: &str) -> Result<Self, PidxError> {
        let invalid = || PidxError::InvalidVersion(input.to_string());
        let caps = version_re().captures(input).ok_or_else(invalid)?;

        let epoch = match caps.name("epoch") {
            Some(m) => m.as_str().parse::<u64>().map_err(|_| invalid())?,
            None => 0,
        };

        let release = caps
            .name("release")
            .ok_or_else(invalid)?
            .as_str()
            .split('.')
            .map(|part| part.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<u64>, PidxError>>()?;

        let pre = match caps.name("pre_tag") {
            Some(tag) => {
                let tag = PreTag::from_spelling(&tag.as_str().to_ascii_lowercase())
                    .ok_or_else(invalid)?;
                Some((tag, group_number(&caps, "pre_n", invalid)?))
            }
            None => None,
        };

        let post = if let Some(m) = caps.name("post_n1") {
            Some(m.as_str().parse::<u64>().map_err(|_| invalid())?)
        } else if caps.name("post_tag").is_some() {
            Some(group_number(&caps, "post_n2", invalid)?)
        } else {
            None
        };

        let dev = if caps.name("dev_tag").is_some() {
            Some(group_number(&caps, "dev_n", invalid)?)
        } else {
            None
        };

        let local = match caps.name("local") {
            Some(m) => m
                .as_str()
                .to_ascii_lowercase()
                .split(['-', '_', '.'])
                .map(|seg| match seg.parse::<u64>() {
                    Ok(n) => LocalSegment::Number(n),
                    Err(_) => LocalSegment::Text(seg.to_string()),
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    /// The version epoch (0 unless explicitly given as `N!`).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The release segments as parsed (trailing zeros preserved for display).
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Whether this is a pre-release or developmental release.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Whether this is a post-release.
    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    /// Render the canonical normalized form.
    pub fn canonical(&self) -> String {
        use std::fmt::Write;

        let mut s = String::new();
        if self.epoch != 0 {
            let _ = write!(s, "{}!", self.epoch);
        }
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        s.push_str(&release.join("."));
        if let Some((tag, n)) = &self.pre {
            let _ = write!(s, "{}{}", tag.as_str(), n);
        }
        if let Some(n) = self.post {
            let _ = write!(s, ".post{n}");
        }
        if let Some(n) = self.dev {
            let _ = write!(s, ".dev{n}");
        }
        if !self.local.is_empty() {
            s.push('+');
            let segments: Vec<String> = self
                .local
                .iter()
                .map(|seg| match seg {
                    LocalSegment::Number(n) => n.to_string(),
                    LocalSegment::Text(t) => t.clone(),
                })
                .collect();
            s.push_str(&segments.join("."));
        }
        s
    }

    /// Release segments with insignificant trailing zeros removed.
    /// `1.0.0` and `1.0` and `1` all trim to `[1]`.
    fn trimmed_release(&self) -> &[u64] {
        let mut len = self.release.len();
        while len > 1 && self.release[len - 1] == 0 {
            len -= 1;
        }
        &self.release[..len]
    }

    // Phase rank at a given release: developmental-only releases sort
    // before pre-releases, which sort before final and post releases.
    fn pre_key(&self) -> (u8, u8, u64) {
        match (&self.pre, self.post, self.dev) {
            (Some((tag, n)), _, _) => (1, *tag as u8, *n),
            (None, None, Some(_)) => (0, 0, 0),
            (None, _, _) => (2, 0, 0),
        }
    }

    fn post_key(&self) -> (u8, u64) {
        match self.post {
            Some(n) => (1, n),
            None => (0, 0),
        }
    }

    fn dev_key(&self) -> (u8, u64) {
        match self.dev {
            Some(n) => (0, n),
            None => (1, 0),
        }
    }
}

fn group_number(
    caps: &regex::Captures<'_>,
    name: &str,
    invalid: impl Fn() -> PidxError,
) -> Result<u64, PidxError> {
    match caps.name(name) {
        Some(m) => m.as_str().parse::<u64>().map_err(|_| invalid()),
        None => Ok(0),
    }
}

fn cmp_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

fn cmp_local(a: &[LocalSegment], b: &[LocalSegment]) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            for (x, y) in a.iter().zip(b.iter()) {
                match x.cmp(y) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            a.len().cmp(&b.len())
        }
    }
}

impl Ord for VersionId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| cmp_release(self.trimmed_release(), other.trimmed_release()))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post_key().cmp(&other.post_key()))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| cmp_local(&self.local, &other.local))
    }
}

impl PartialOrd for VersionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionId {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionId {}

impl Hash for VersionId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epoch.hash(state);
        self.trimmed_release().hash(state);
        self.pre.hash(state);
        self.post.hash(state);
        self.dev.hash(state);
        self.local.hash(state);
    }
}

impl FromStr for VersionId {
    type Err = PidxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionId {
    type Error = PidxError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<VersionId> for String {
    fn from(version: VersionId) -> Self {
        version.canonical()
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}
