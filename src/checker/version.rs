//! Release version parsing and ordering.
//!
//! Accepts the shapes found in jar manifests: `2.14.1`, `2.0`, `v2.3`,
//! `2.0-beta9`, `2.0-rc1`, `2.0beta9` and `2.17.1+build.5`.
//!
//! Ordering follows the usual pre-release rules:
//!
//! - release segments compare numerically, missing segments count as zero
//!   (`2.0 == 2.0.0`)
//! - a pre-release sorts before its release (`2.0-beta9 < 2.0`)
//! - qualifiers compare piecewise, numbers before words, and runs of digits
//!   inside a qualifier compare numerically (`beta9 < beta10 < rc1`)
//! - build metadata after `+` is ignored

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Error returned when a string is not a usable version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version '{input}': {reason}")]
pub struct VersionParseError {
    /// The rejected input, untrimmed.
    pub input: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Identifier {
    Numeric(u64),
    Alpha(String),
}

/// A parsed release version.
#[derive(Debug, Clone)]
pub struct Version {
    release: Vec<u64>,
    pre: Vec<Identifier>,
    text: String,
}

impl Version {
    /// Parses a version string. Same as `str::parse::<Version>()`.
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        input.parse()
    }

    /// Numeric release segments as written, without padding.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| VersionParseError {
            input: s.to_string(),
            reason,
        };

        let text = s.trim();
        if text.is_empty() {
            return Err(fail("empty version string"));
        }

        let body = text.strip_prefix(['v', 'V']).unwrap_or(text);
        let body = match body.split_once('+') {
            Some((_, "")) => return Err(fail("empty build metadata")),
            Some((head, _build)) => head,
            None => body,
        };

        let release_end = body
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(body.len());
        let (release_part, rest) = body.split_at(release_end);

        let (release_part, qualifier) = if rest.is_empty() {
            (release_part, None)
        } else if let Some(qualifier) = rest.strip_prefix('-') {
            (release_part, Some(qualifier))
        } else if rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
            // `2.0beta9` and `2.0.Final` style qualifiers
            (release_part.strip_suffix('.').unwrap_or(release_part), Some(rest))
        } else {
            return Err(fail("unexpected character after release number"));
        };

        if release_part.is_empty() {
            return Err(fail("missing numeric release"));
        }

        let release = release_part
            .split('.')
            .map(|segment| {
                if segment.is_empty() {
                    return Err(fail("empty release segment"));
                }
                segment
                    .parse::<u64>()
                    .map_err(|_| fail("release segment out of range"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pre = match qualifier {
            None => Vec::new(),
            Some("") => return Err(fail("empty pre-release qualifier")),
            Some(qualifier) => parse_qualifier(qualifier)
                .ok_or_else(|| fail("invalid pre-release qualifier"))?,
        };

        Ok(Self {
            release,
            pre,
            text: text.to_string(),
        })
    }
}

/// Splits a qualifier into identifiers on `.`, `-`, `_` and on every
/// boundary between digits and letters.
fn parse_qualifier(qualifier: &str) -> Option<Vec<Identifier>> {
    let mut identifiers = Vec::new();

    for part in qualifier.split(['.', '-', '_']) {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }

        let mut rest = part;
        while let Some(first) = rest.chars().next() {
            let digits = first.is_ascii_digit();
            let end = rest
                .find(|c: char| c.is_ascii_digit() != digits)
                .unwrap_or(rest.len());
            let (chunk, tail) = rest.split_at(end);

            identifiers.push(if digits {
                Identifier::Numeric(chunk.parse().ok()?)
            } else {
                Identifier::Alpha(chunk.to_ascii_lowercase())
            });
            rest = tail;
        }
    }

    Some(identifiers)
}

fn compare_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_pre(a: &[Identifier], b: &[Identifier]) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_release(&self.release, &other.release)
            .then_with(|| compare_pre(&self.pre, &other.pre))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
