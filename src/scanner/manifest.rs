//! Release version extraction from `META-INF/MANIFEST.MF` text.
//!
//! Log4j 2 declares `Log4jReleaseVersion`; older builds, and 1.x, only
//! carry `Implementation-Version`. The first occurrence of the primary key
//! wins, the fallback is consulted only when it is absent.

use regex::Regex;
use std::sync::LazyLock;

static RELEASE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ReleaseVersion:[ \t]*(\S+)").expect("release version pattern is valid")
});

static IMPLEMENTATION_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Implementation-Version:[ \t]*(\S+)")
        .expect("implementation version pattern is valid")
});

/// Returns the declared release version, or `None` if neither key is
/// present with a value.
pub fn extract_release_version(manifest: &str) -> Option<String> {
    [&*RELEASE_VERSION, &*IMPLEMENTATION_VERSION]
        .into_iter()
        .find_map(|pattern| pattern.captures(manifest))
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG4J_CORE_MANIFEST: &str = "Manifest-Version: 1.0\r\n\
        Bundle-Name: Apache Log4j Core\r\n\
        Implementation-Title: Apache Log4j Core\r\n\
        Implementation-Version: 2.14.1-SNAPSHOT\r\n\
        Log4jReleaseVersion: 2.14.1\r\n\
        Multi-Release: true\r\n\r\n";

    #[test]
    fn test_release_key_preferred() {
        assert_eq!(
            extract_release_version(LOG4J_CORE_MANIFEST).as_deref(),
            Some("2.14.1")
        );
    }

    #[test]
    fn test_release_key_with_unix_newlines() {
        let manifest = "Manifest-Version: 1.0\nLog4jReleaseVersion: 2.14.1\n";
        assert_eq!(extract_release_version(manifest).as_deref(), Some("2.14.1"));
    }

    #[test]
    fn test_release_key_on_last_line() {
        assert_eq!(
            extract_release_version("Log4jReleaseVersion: 2.16.0").as_deref(),
            Some("2.16.0")
        );
    }

    #[test]
    fn test_implementation_version_fallback() {
        let manifest = "Manifest-Version: 1.0\r\n\
            Implementation-Title: log4j\r\n\
            Implementation-Version: 1.2.17\r\n";
        assert_eq!(extract_release_version(manifest).as_deref(), Some("1.2.17"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let manifest = "Log4jReleaseVersion: 2.14.1\nLog4jReleaseVersion: 2.17.1\n";
        assert_eq!(extract_release_version(manifest).as_deref(), Some("2.14.1"));
    }

    #[test]
    fn test_no_version_keys() {
        let manifest = "Manifest-Version: 1.0\r\nCreated-By: Maven\r\n";
        assert_eq!(extract_release_version(manifest), None);
        assert_eq!(extract_release_version(""), None);
    }

    #[test]
    fn test_empty_value_not_taken_from_next_line() {
        let manifest = "Implementation-Version:\nCreated-By: Maven\n";
        assert_eq!(extract_release_version(manifest), None);
    }
}
