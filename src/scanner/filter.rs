//! Name patterns deciding which files and entries the scanner looks at.

use regex::Regex;
use std::sync::LazyLock;

/// Entry holding the library's build attributes.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

static ARCHIVE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^.+\.[wej]ar$").expect("archive name pattern is valid"));

// `log4j` is matched literally, only the extension ignores case.
static TARGET_LIBRARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"log4j.+\.(?i:jar)$").expect("library name pattern is valid"));

/// True for `.jar`, `.war` and `.ear` names, in any case.
pub fn is_archive_name(name: &str) -> bool {
    ARCHIVE_NAME.is_match(name)
}

/// True when a container's basename identifies it as the Log4j library
/// itself, e.g. `log4j-core-2.14.1.jar`.
pub fn is_target_library(name: &str) -> bool {
    TARGET_LIBRARY.is_match(name)
}

/// Last component of a `/`-separated archive entry name.
pub fn basename(entry_name: &str) -> &str {
    let trimmed = entry_name.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_extensions() {
        assert!(is_archive_name("app.jar"));
        assert!(is_archive_name("app.war"));
        assert!(is_archive_name("app.ear"));
        assert!(is_archive_name("APP.WAR"));
        assert!(is_archive_name("lib.Jar"));
    }

    #[test]
    fn test_non_archive_names() {
        assert!(!is_archive_name("app.zip"));
        assert!(!is_archive_name("app.jar.bak"));
        assert!(!is_archive_name("notes.txt"));
        assert!(!is_archive_name(".jar"));
        assert!(!is_archive_name("app.tar"));
    }

    #[test]
    fn test_target_library_names() {
        assert!(is_target_library("log4j-core-2.14.1.jar"));
        assert!(is_target_library("log4j-api-2.17.1.jar"));
        assert!(is_target_library("log4j-1.2.17.jar"));
        assert!(is_target_library("log4j-core-2.14.1.JAR"));
    }

    #[test]
    fn test_target_library_token_is_literal() {
        assert!(!is_target_library("LOG4J-core-2.14.1.jar"));
        assert!(!is_target_library("slf4j-api-1.7.32.jar"));
        assert!(!is_target_library("log4j.jar"));
        assert!(!is_target_library("log4j-core-2.14.1.war"));
        assert!(!is_target_library("log4j-core-2.14.1.jar.sha1"));
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("WEB-INF/lib/log4j-core-2.14.1.jar"), "log4j-core-2.14.1.jar");
        assert_eq!(basename("app.jar"), "app.jar");
        assert_eq!(basename("lib/nested.jar/"), "nested.jar");
    }
}
