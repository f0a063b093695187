//! Semantic versions and version ranges as persisted documents write them.
//!
//! Documents record ranges with npm-style semantics, which differ from
//! Cargo's in one important way: a bare `1.2.3` is an exact match, not a
//! caret requirement. [`VersionRange`] accepts that syntax and lowers it onto
//! [`semver::VersionReq`]:
//!
//! | written            | meaning                      |
//! |--------------------|------------------------------|
//! | `1.2.3`, `=1.2.3`  | exactly 1.2.3                |
//! | `1.2`, `1.2.x`     | `>=1.2.0 <1.3.0`             |
//! | `1`, `1.x`, `1.*`  | `>=1.0.0 <2.0.0`             |
//! | `*`, `x`, empty    | any release                  |
//! | `^1.2`, `~1.2.3`   | caret / tilde, as in Cargo   |
//! | `>=1 <2`           | intersection (space joined)  |
//! | `1.0.0 - 2.3`      | inclusive hyphen range       |
//! | `1.x \|\| >=3`     | union                        |

use semver::{Version, VersionReq};
use std::fmt;
use std::str::FromStr;

/// Parses a semantic version, tolerating a leading `=` or `v`.
pub fn parse_version(input: &str) -> Result<Version, semver::Error> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed).trim_start();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed)
}

/// A set of acceptable versions, possibly a union of several requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    source: String,
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// The range matching every release.
    pub fn any() -> Self {
        Self {
            source: "*".to_string(),
            alternatives: vec![VersionReq::STAR],
        }
    }

    pub fn parse(input: &str) -> Result<Self, semver::Error> {
        let alternatives = input
            .split("||")
            .map(|set| VersionReq::parse(&lower_set(set)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            source: input.trim().to_string(),
            alternatives,
        })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// The range as originally written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for VersionRange {
    type Err = semver::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// True when `version` parses and satisfies `range`. Unparsable input on
/// either side matches nothing.
pub fn satisfies(version: &str, range: &str) -> bool {
    match (parse_version(version), VersionRange::parse(range)) {
        (Ok(version), Ok(range)) => range.matches(&version),
        _ => false,
    }
}

/// Lowers one `||`-free comparator set into Cargo requirement syntax.
fn lower_set(set: &str) -> String {
    let set = set.trim();
    if let Some((low, high)) = set.split_once(" - ") {
        let low = strip_wildcards(low.trim()).unwrap_or_else(|| "0.0.0".to_string());
        return match strip_wildcards(high.trim()) {
            Some(high) => format!(">={low}, <={high}"),
            None => format!(">={low}"),
        };
    }

    let mut comparators = Vec::new();
    let mut pending_op = String::new();
    for token in set.split_whitespace() {
        if token.chars().all(is_operator_char) {
            pending_op.push_str(token);
            continue;
        }
        let token = format!("{}{}", std::mem::take(&mut pending_op), token);
        if let Some(lowered) = lower_comparator(&token) {
            comparators.push(lowered);
        }
    }

    if comparators.is_empty() {
        "*".to_string()
    } else {
        comparators.join(", ")
    }
}

/// Returns `None` for a comparator that accepts everything.
fn lower_comparator(token: &str) -> Option<String> {
    let op_len = token
        .find(|c: char| !is_operator_char(c))
        .unwrap_or(token.len());
    let (op, version) = token.split_at(op_len);
    let version = version.strip_prefix('v').unwrap_or(version);

    if op.is_empty() || op == "=" {
        if is_full_version(version) {
            return Some(format!("={version}"));
        }
        return strip_wildcards(version).map(|partial| format!("{partial}.*"));
    }
    strip_wildcards(version).map(|partial| format!("{op}{partial}"))
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '^' | '~')
}

fn is_wildcard(part: &str) -> bool {
    matches!(part, "*" | "x" | "X")
}

/// Three numeric components, ignoring any pre-release or build suffix.
fn is_full_version(version: &str) -> bool {
    let core = version.split(['-', '+']).next().unwrap_or_default();
    let parts: Vec<&str> = core.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty() && !is_wildcard(p))
}

/// Drops trailing wildcard components: `1.2.x` becomes `1.2`, `*` becomes
/// `None`.
fn strip_wildcards(version: &str) -> Option<String> {
    let kept: Vec<&str> = version
        .split('.')
        .take_while(|part| !part.is_empty() && !is_wildcard(part))
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join("."))
    }
}
