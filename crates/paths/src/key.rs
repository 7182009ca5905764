//! # Object Keys
//!
//! Subfolder composition and full object key construction.

use crate::kind::KindTag;
use std::fmt;

/// Compose the archival subfolder for a task.
///
/// Returns `existing/pipeline/task_id/kind` when `existing` is non-empty and
/// `pipeline/task_id/kind` otherwise. Trailing slashes on `existing` are
/// dropped so a base configured as `base/` does not produce an empty segment.
///
/// Pure and deterministic: identical inputs always produce identical output.
pub fn compose_subfolder(existing: &str, pipeline_name: &str, task_id: u64, kind: KindTag) -> String {
    let base = existing.trim_end_matches('/');
    if base.is_empty() {
        format!("{pipeline_name}/{task_id}/{kind}")
    } else {
        format!("{base}/{pipeline_name}/{task_id}/{kind}")
    }
}

/// Join a subfolder and an object name into the key stored remotely
pub fn join_object_key(subfolder: &str, object_name: &str) -> String {
    let base = subfolder.trim_end_matches('/');
    let name = object_name.trim_start_matches('/');
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}

/// Fully resolved remote object key
///
/// Built with [`ObjectKey::new`] and optionally rooted under a base subfolder
/// carried by the storage location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    base: String,
    pipeline_name: String,
    task_id: u64,
    kind: KindTag,
    object_name: String,
}

impl ObjectKey {
    pub fn new(
        pipeline_name: impl Into<String>,
        task_id: u64,
        kind: KindTag,
        object_name: impl Into<String>,
    ) -> Self {
        Self {
            base: String::new(),
            pipeline_name: pipeline_name.into(),
            task_id,
            kind,
            object_name: object_name.into(),
        }
    }

    /// Root the key under a base subfolder
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    pub fn kind(&self) -> KindTag {
        self.kind
    }

    /// Subfolder portion of the key (everything but the object name)
    pub fn subfolder(&self) -> String {
        compose_subfolder(&self.base, &self.pipeline_name, self.task_id, self.kind)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_object_key(&self.subfolder(), &self.object_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_without_existing_subfolder() {
        assert_eq!(compose_subfolder("", "ci-1", 42, KindTag::File), "ci-1/42/file");
    }

    #[test]
    fn test_compose_with_existing_subfolder() {
        assert_eq!(
            compose_subfolder("base", "ci-1", 42, KindTag::File),
            "base/ci-1/42/file"
        );
    }

    #[test]
    fn test_compose_trims_trailing_slash_on_base() {
        assert_eq!(
            compose_subfolder("base/", "ci-1", 42, KindTag::Test),
            "base/ci-1/42/test"
        );
        assert_eq!(compose_subfolder("/", "ci-1", 42, KindTag::Test), "ci-1/42/test");
    }

    #[test]
    fn test_compose_is_deterministic() {
        let first = compose_subfolder("base", "nightly", 7, KindTag::Test);
        let second = compose_subfolder("base", "nightly", 7, KindTag::Test);
        assert_eq!(first, second);
    }

    #[test]
    fn test_compose_changes_with_each_input() {
        let reference = compose_subfolder("base", "ci-1", 42, KindTag::File);
        assert_ne!(reference, compose_subfolder("other", "ci-1", 42, KindTag::File));
        assert_ne!(reference, compose_subfolder("base", "ci-2", 42, KindTag::File));
        assert_ne!(reference, compose_subfolder("base", "ci-1", 43, KindTag::File));
        assert_ne!(reference, compose_subfolder("base", "ci-1", 42, KindTag::Test));
    }

    #[test]
    fn test_join_object_key() {
        assert_eq!(join_object_key("ci-1/42/file", "app.zip"), "ci-1/42/file/app.zip");
        assert_eq!(join_object_key("ci-1/42/file/", "/app.zip"), "ci-1/42/file/app.zip");
        assert_eq!(join_object_key("", "app.zip"), "app.zip");
    }

    #[test]
    fn test_object_key_display() {
        let key = ObjectKey::new("ci-1", 42, KindTag::Test, "junit.xml");
        assert_eq!(key.to_string(), "ci-1/42/test/junit.xml");
        assert_eq!(key.kind(), KindTag::Test);

        let rooted = key.with_base("archives");
        assert_eq!(rooted.subfolder(), "archives/ci-1/42/test");
        assert_eq!(rooted.to_string(), "archives/ci-1/42/test/junit.xml");
    }
}
