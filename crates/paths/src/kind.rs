//! # Kind Tags
//!
//! Archival kind segment of the object key.

use std::fmt;

/// Filename marker for packaged bundles
pub const PACKAGED_BUNDLE_MARKER: &str = ".tar.gz";

/// Archival kind segment (`file` or `test`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    /// Explicit file artifacts and packaged test bundles
    File,
    /// Raw test output
    Test,
}

impl KindTag {
    /// Derive the kind for a test archive from its filename.
    ///
    /// A filename containing `.tar.gz` is a packaged bundle and is grouped with
    /// file artifacts; everything else is test output.
    pub fn for_test_archive(file_name: &str) -> Self {
        if file_name.contains(PACKAGED_BUNDLE_MARKER) {
            KindTag::File
        } else {
            KindTag::Test
        }
    }

    /// Path segment used in object keys
    pub fn as_str(&self) -> &'static str {
        match self {
            KindTag::File => "file",
            KindTag::Test => "test",
        }
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packaged_bundle_is_file_kind() {
        assert_eq!(KindTag::for_test_archive("report.tar.gz"), KindTag::File);
        assert_eq!(
            KindTag::for_test_archive("junit-results.tar.gz"),
            KindTag::File
        );
    }

    #[test]
    fn test_marker_anywhere_in_name_is_file_kind() {
        // Matches on containment, not only on the suffix
        assert_eq!(
            KindTag::for_test_archive("bundle.tar.gz.part"),
            KindTag::File
        );
    }

    #[test]
    fn test_plain_output_is_test_kind() {
        assert_eq!(KindTag::for_test_archive("junit.xml"), KindTag::Test);
        assert_eq!(KindTag::for_test_archive("report.tar"), KindTag::Test);
        assert_eq!(KindTag::for_test_archive("coverage.gz"), KindTag::Test);
        assert_eq!(KindTag::for_test_archive(""), KindTag::Test);
    }

    #[test]
    fn test_display_matches_segment() {
        assert_eq!(KindTag::File.to_string(), "file");
        assert_eq!(KindTag::Test.to_string(), "test");
    }
}
