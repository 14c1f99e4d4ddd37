//! Turns a service's optional image reference into a URL that is always
//! safe to render.
//!
//! Remote URLs pass through untouched. Site-relative paths are kept only
//! when the file is present under the public assets root; anything else,
//! including a failed probe, degrades to [`FALLBACK_IMAGE_URL`]. Nothing in
//! here returns an error: a missing picture must never stop a page.

use crate::core::AssetStore;
use std::path::{Component, Path, PathBuf};

pub const FALLBACK_IMAGE_URL: &str = "https://images.unsplash.com/photo-1460925895917-afdab827c52f?q=80&w=2015&auto=format&fit=crop";

#[derive(Debug, Clone)]
pub struct AssetResolver<A: AssetStore> {
    store: A,
    fallback: String,
}

impl<A: AssetStore> AssetResolver<A> {
    pub fn new(store: A) -> Self {
        Self::with_fallback(store, FALLBACK_IMAGE_URL)
    }

    pub fn with_fallback(store: A, fallback: impl Into<String>) -> Self {
        Self {
            store,
            fallback: fallback.into(),
        }
    }

    pub fn resolve_image(&self, image_ref: Option<&str>) -> String {
        self.resolve(image_ref).0
    }

    /// Same as [`resolve_image`](Self::resolve_image), also reporting
    /// whether the fallback was used.
    pub fn resolve(&self, image_ref: Option<&str>) -> (String, bool) {
        let image_ref = match image_ref {
            Some(r) if !r.is_empty() => r,
            _ => return (self.fallback.clone(), true),
        };

        if is_absolute_url(image_ref) {
            return (image_ref.to_string(), false);
        }

        let relative = strip_leading_separator(image_ref);
        match self.store.exists(relative) {
            Ok(true) => (image_ref.to_string(), false),
            Ok(false) => {
                tracing::debug!("Image {} not found in public assets", image_ref);
                (self.fallback.clone(), true)
            }
            Err(e) => {
                tracing::debug!("Could not probe image {}: {}", image_ref, e);
                (self.fallback.clone(), true)
            }
        }
    }
}

pub fn is_absolute_url(image_ref: &str) -> bool {
    image_ref.starts_with("http")
}

/// Drops exactly one leading `/`.
pub fn strip_leading_separator(image_ref: &str) -> &str {
    image_ref.strip_prefix('/').unwrap_or(image_ref)
}

/// Existence probes against a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetStore for LocalAssetStore {
    fn exists(&self, relative_path: &str) -> std::io::Result<bool> {
        let relative = Path::new(relative_path);
        // never probe outside the root
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Ok(false);
        }
        self.root.join(relative).try_exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FailingStore;

    impl AssetStore for FailingStore {
        fn exists(&self, _relative_path: &str) -> io::Result<bool> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        probes: Mutex<Vec<String>>,
    }

    impl AssetStore for RecordingStore {
        fn exists(&self, relative_path: &str) -> io::Result<bool> {
            self.probes.lock().unwrap().push(relative_path.to_string());
            Ok(false)
        }
    }

    fn public_dir_with(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"img").unwrap();
        }
        dir
    }

    #[test]
    fn test_absent_reference_uses_fallback() {
        let dir = public_dir_with(&[]);
        let resolver = AssetResolver::new(LocalAssetStore::new(dir.path()));

        assert_eq!(resolver.resolve_image(None), FALLBACK_IMAGE_URL);
        assert_eq!(resolver.resolve_image(Some("")), FALLBACK_IMAGE_URL);
    }

    #[test]
    fn test_existing_upload_is_kept_as_written() {
        let dir = public_dir_with(&["uploads/team.jpg"]);
        let resolver = AssetResolver::new(LocalAssetStore::new(dir.path()));

        assert_eq!(
            resolver.resolve_image(Some("/uploads/team.jpg")),
            "/uploads/team.jpg"
        );
        assert_eq!(
            resolver.resolve_image(Some("uploads/team.jpg")),
            "uploads/team.jpg"
        );
    }

    #[test]
    fn test_missing_upload_uses_fallback() {
        let dir = public_dir_with(&["uploads/team.jpg"]);
        let resolver = AssetResolver::new(LocalAssetStore::new(dir.path()));

        assert_eq!(
            resolver.resolve_image(Some("/uploads/missing.jpg")),
            FALLBACK_IMAGE_URL
        );
    }

    #[test]
    fn test_remote_url_skips_probe() {
        let store = RecordingStore::default();
        let resolver = AssetResolver::new(store);

        assert_eq!(
            resolver.resolve_image(Some("https://cdn.example.com/x.jpg")),
            "https://cdn.example.com/x.jpg"
        );
        assert!(resolver.store.probes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_leading_slash_probes_same_file() {
        let resolver = AssetResolver::new(RecordingStore::default());

        resolver.resolve_image(Some("/uploads/x.png"));
        resolver.resolve_image(Some("uploads/x.png"));

        let probes = resolver.store.probes.lock().unwrap();
        assert_eq!(*probes, vec!["uploads/x.png", "uploads/x.png"]);
    }

    #[test]
    fn test_probe_failure_is_swallowed() {
        let resolver = AssetResolver::new(FailingStore);

        let (url, used_fallback) = resolver.resolve(Some("/uploads/team.jpg"));
        assert_eq!(url, FALLBACK_IMAGE_URL);
        assert!(used_fallback);
    }

    #[test]
    fn test_custom_fallback() {
        let resolver = AssetResolver::with_fallback(FailingStore, "/img/default.jpg");
        assert_eq!(resolver.resolve_image(None), "/img/default.jpg");
    }

    #[test]
    fn test_store_refuses_paths_outside_root() {
        let outer = public_dir_with(&["secret.jpg"]);
        let public = outer.path().join("public");
        std::fs::create_dir_all(&public).unwrap();
        let store = LocalAssetStore::new(&public);

        assert!(!store.exists("../secret.jpg").unwrap());
        assert!(!store.exists("/etc/passwd").unwrap());
    }

    #[test]
    fn test_unnormalised_references_fall_back_even_when_file_exists() {
        let dir = public_dir_with(&["uploads/team.jpg"]);
        let resolver = AssetResolver::new(LocalAssetStore::new(dir.path()));

        assert_eq!(
            resolver.resolve_image(Some("//uploads/team.jpg")),
            FALLBACK_IMAGE_URL
        );
        assert_eq!(
            resolver.resolve_image(Some("uploads/../uploads/team.jpg")),
            FALLBACK_IMAGE_URL
        );
    }

    #[test]
    fn test_only_one_separator_is_stripped() {
        assert_eq!(strip_leading_separator("/uploads/a.png"), "uploads/a.png");
        assert_eq!(strip_leading_separator("//uploads/a.png"), "/uploads/a.png");
        assert_eq!(strip_leading_separator("uploads/a.png"), "uploads/a.png");
    }
}
