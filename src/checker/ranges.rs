//! Published vulnerable Log4j release ranges.
//!
//! Ranges are kept as named tables of version strings so new advisories can
//! be added without touching comparison code. [`RangeSpec::compile`] turns
//! them into [`VersionRange`]s.

use std::fmt;

use super::version::{Version, VersionParseError};

/// Inclusive version bounds as written in an advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub min: &'static str,
    pub max: &'static str,
    /// Versions inside `min..=max` that are not affected.
    pub excluding: &'static [&'static str],
}

/// A published defect and the releases it affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advisory {
    pub ids: &'static [&'static str],
    pub summary: &'static str,
    pub ranges: &'static [RangeSpec],
}

/// JNDI lookup remote code execution (Log4Shell) and its incomplete fix.
pub const LOG4SHELL: Advisory = Advisory {
    ids: &["CVE-2021-44228", "CVE-2021-45046"],
    summary: "JNDI lookup remote code execution",
    ranges: &[
        RangeSpec {
            min: "2.0",
            max: "2.12.1",
            excluding: &[],
        },
        RangeSpec {
            min: "2.13.0",
            max: "2.15.0",
            excluding: &[],
        },
    ],
};

/// Uncontrolled recursion in self-referential lookups.
pub const LOG4J_DOS: Advisory = Advisory {
    ids: &["CVE-2021-45105"],
    summary: "denial of service through recursive lookup evaluation",
    ranges: &[RangeSpec {
        min: "2.0-alpha1",
        max: "2.16.0",
        excluding: &["2.12.3"],
    }],
};

/// Advisories applied when nothing else is configured.
pub const DEFAULT_ADVISORIES: &[Advisory] = &[LOG4SHELL];

/// Every advisory the checker knows about.
pub const ALL_ADVISORIES: &[Advisory] = &[LOG4SHELL, LOG4J_DOS];

impl Advisory {
    pub fn label(&self) -> String {
        self.ids.join(", ")
    }
}

impl RangeSpec {
    pub fn compile(&self) -> Result<VersionRange, VersionParseError> {
        let mut range = VersionRange::new(self.min.parse()?, self.max.parse()?);
        for excluded in self.excluding {
            range = range.excluding(excluded.parse()?);
        }
        Ok(range)
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">= {}, <= {}", self.min, self.max)?;
        if !self.excluding.is_empty() {
            write!(f, " (excluding {})", self.excluding.join(", "))?;
        }
        Ok(())
    }
}

/// Inclusive `min..=max` interval with optional holes.
#[derive(Debug, Clone)]
pub struct VersionRange {
    min: Version,
    max: Version,
    excluded: Vec<Version>,
}

impl VersionRange {
    pub fn new(min: Version, max: Version) -> Self {
        Self {
            min,
            max,
            excluded: Vec::new(),
        }
    }

    pub fn excluding(mut self, version: Version) -> Self {
        self.excluded.push(version);
        self
    }

    pub fn contains(&self, version: &Version) -> bool {
        *version >= self.min && *version <= self.max && !self.excluded.contains(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_all_tables_compile() {
        for advisory in ALL_ADVISORIES {
            for spec in advisory.ranges {
                assert!(spec.compile().is_ok(), "{} {}", advisory.label(), spec);
            }
        }
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let range = VersionRange::new(v("2.13.0"), v("2.15.0"));
        assert!(range.contains(&v("2.13.0")));
        assert!(range.contains(&v("2.15.0")));
        assert!(range.contains(&v("2.14.1")));
        assert!(!range.contains(&v("2.12.4")));
        assert!(!range.contains(&v("2.15.1")));
    }

    #[test]
    fn test_range_exclusion() {
        let range = LOG4J_DOS.ranges[0].compile().unwrap();
        assert!(range.contains(&v("2.12.2")));
        assert!(!range.contains(&v("2.12.3")));
        assert!(range.contains(&v("2.0-alpha1")));
        assert!(range.contains(&v("2.16.0")));
        assert!(!range.contains(&v("2.17.0")));
    }

    #[test]
    fn test_range_spec_display() {
        assert_eq!(LOG4SHELL.ranges[0].to_string(), ">= 2.0, <= 2.12.1");
        assert_eq!(
            LOG4J_DOS.ranges[0].to_string(),
            ">= 2.0-alpha1, <= 2.16.0 (excluding 2.12.3)"
        );
    }

    #[test]
    fn test_advisory_label() {
        assert_eq!(LOG4SHELL.label(), "CVE-2021-44228, CVE-2021-45046");
    }
}
