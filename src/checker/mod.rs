//! Release version classification.
//!
//! A [`VulnerabilityChecker`] turns the free-text version taken from a
//! manifest into a [`Verdict`]. [`RangeChecker`] is the implementation used
//! by the scanner: it compiles a table of [`Advisory`] ranges once and tests
//! versions against it.
//!
//! # Example
//!
//! ```
//! use log4scan::checker::{default_checker, Verdict, VulnerabilityChecker};
//!
//! let checker = default_checker().unwrap();
//! assert_eq!(checker.classify("2.14.1"), Verdict::Vulnerable);
//! assert_eq!(checker.classify("2.17.1"), Verdict::NotVulnerable);
//! assert_eq!(checker.classify(""), Verdict::Undetermined);
//! ```

mod ranges;
mod version;

pub use ranges::{
    Advisory, RangeSpec, VersionRange, ALL_ADVISORIES, DEFAULT_ADVISORIES, LOG4J_DOS, LOG4SHELL,
};
pub use version::{Version, VersionParseError};

use serde::{Deserialize, Serialize};

/// Outcome of classifying one release version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Vulnerable,
    NotVulnerable,
    /// The version could not be parsed. Reported as not vulnerable, but
    /// this is missing information rather than a clean result.
    Undetermined,
}

impl Verdict {
    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Verdict::Vulnerable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Vulnerable => "vulnerable",
            Verdict::NotVulnerable => "not-vulnerable",
            Verdict::Undetermined => "undetermined",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether a release of the target library is affected.
///
/// Implementations must be pure: the same version always yields the same
/// answer and nothing is logged or mutated.
pub trait VulnerabilityChecker: Send + Sync {
    /// Returns the human-readable name of this checker.
    fn name(&self) -> &'static str;

    /// Returns true if `version` falls inside a known vulnerable range.
    fn is_vulnerable(&self, version: &Version) -> bool;

    /// Parses `raw` and tests it, surfacing the parse error to the caller.
    fn evaluate(&self, raw: &str) -> Result<bool, VersionParseError> {
        let version = raw.parse::<Version>()?;
        Ok(self.is_vulnerable(&version))
    }

    /// Like [`evaluate`](Self::evaluate), folding parse failures into
    /// [`Verdict::Undetermined`].
    fn classify(&self, raw: &str) -> Verdict {
        match self.evaluate(raw) {
            Ok(true) => Verdict::Vulnerable,
            Ok(false) => Verdict::NotVulnerable,
            Err(_) => Verdict::Undetermined,
        }
    }
}

/// Checks versions against a compiled set of advisory ranges.
#[derive(Debug, Clone)]
pub struct RangeChecker {
    advisories: Vec<Advisory>,
    ranges: Vec<VersionRange>,
}

impl RangeChecker {
    /// Compiles every range of every advisory.
    ///
    /// # Errors
    ///
    /// Returns an error if a range bound is not a valid version.
    pub fn new(advisories: &[Advisory]) -> Result<Self, VersionParseError> {
        let ranges = advisories
            .iter()
            .flat_map(|advisory| advisory.ranges.iter())
            .map(RangeSpec::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            advisories: advisories.to_vec(),
            ranges,
        })
    }

    /// Advisories this checker was built from.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }
}

impl VulnerabilityChecker for RangeChecker {
    fn name(&self) -> &'static str {
        "Log4j advisory ranges"
    }

    fn is_vulnerable(&self, version: &Version) -> bool {
        self.ranges.iter().any(|range| range.contains(version))
    }
}

/// Checker over [`DEFAULT_ADVISORIES`].
pub fn default_checker() -> Result<RangeChecker, VersionParseError> {
    RangeChecker::new(DEFAULT_ADVISORIES)
}

/// Checker over the default table, plus [`LOG4J_DOS`] when requested.
pub fn checker_with_dos_range(include_dos_range: bool) -> Result<RangeChecker, VersionParseError> {
    if include_dos_range {
        RangeChecker::new(ALL_ADVISORIES)
    } else {
        default_checker()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log4shell_boundaries() {
        let checker = default_checker().unwrap();

        assert_eq!(checker.classify("2.0"), Verdict::Vulnerable);
        assert_eq!(checker.classify("2.12.1"), Verdict::Vulnerable);
        assert_eq!(checker.classify("2.12.2"), Verdict::NotVulnerable);
        assert_eq!(checker.classify("2.13.0"), Verdict::Vulnerable);
        assert_eq!(checker.classify("2.14.1"), Verdict::Vulnerable);
        assert_eq!(checker.classify("2.15.0"), Verdict::Vulnerable);
        assert_eq!(checker.classify("2.15.1"), Verdict::NotVulnerable);
        assert_eq!(checker.classify("2.16.0"), Verdict::NotVulnerable);
        assert_eq!(checker.classify("2.17.1"), Verdict::NotVulnerable);
    }

    #[test]
    fn test_log4j1_not_vulnerable() {
        let checker = default_checker().unwrap();
        assert_eq!(checker.classify("1.9.9"), Verdict::NotVulnerable);
        assert_eq!(checker.classify("1.2.17"), Verdict::NotVulnerable);
    }

    #[test]
    fn test_prerelease_below_release_bound() {
        let checker = default_checker().unwrap();
        assert_eq!(checker.classify("2.0-beta9"), Verdict::NotVulnerable);
        assert_eq!(checker.classify("2.0-rc1"), Verdict::NotVulnerable);
    }

    #[test]
    fn test_unparsable_version_is_undetermined() {
        let checker = default_checker().unwrap();
        assert_eq!(checker.classify(""), Verdict::Undetermined);
        assert_eq!(checker.classify("${project.version}"), Verdict::Undetermined);
        assert!(!checker.classify("").is_vulnerable());
        assert!(checker.evaluate("").is_err());
    }

    #[test]
    fn test_classify_is_deterministic() {
        let checker = default_checker().unwrap();
        for raw in ["2.14.1", "2.16.0", "", "junk"] {
            assert_eq!(checker.classify(raw), checker.classify(raw));
        }
    }

    #[test]
    fn test_dos_range_opt_in() {
        let checker = checker_with_dos_range(true).unwrap();

        assert_eq!(checker.classify("2.0-beta9"), Verdict::Vulnerable);
        assert_eq!(checker.classify("2.12.2"), Verdict::Vulnerable);
        assert_eq!(checker.classify("2.12.3"), Verdict::NotVulnerable);
        assert_eq!(checker.classify("2.16.0"), Verdict::Vulnerable);
        assert_eq!(checker.classify("2.17.0"), Verdict::NotVulnerable);
        assert_eq!(checker.advisories().len(), 2);

        let default = checker_with_dos_range(false).unwrap();
        assert_eq!(default.classify("2.16.0"), Verdict::NotVulnerable);
        assert_eq!(default.advisories(), DEFAULT_ADVISORIES);
    }

    #[test]
    fn test_verdict_strings() {
        assert_eq!(Verdict::Vulnerable.to_string(), "vulnerable");
        assert_eq!(Verdict::NotVulnerable.to_string(), "not-vulnerable");
        assert_eq!(
            serde_json::to_string(&Verdict::NotVulnerable).unwrap(),
            "\"not_vulnerable\""
        );
    }
}
