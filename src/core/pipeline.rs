use crate::core::asset_resolver::{AssetResolver, LocalAssetStore};
use crate::core::directory::SourceDirectory;
use crate::core::render::{render_home_page, render_not_found, render_service_detail};
use crate::core::{
    AssetStore, ConfigProvider, Pipeline, RenderedPage, ResolvedService, Service,
    ServiceDirectory, SiteBuild, Storage,
};
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::is_safe_slug;
use std::collections::HashSet;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const NOT_FOUND_PAGE: &str = "404.html";

pub struct SitePipeline<S, C, D = SourceDirectory, A = LocalAssetStore>
where
    S: Storage,
    C: ConfigProvider,
    D: ServiceDirectory,
    A: AssetStore,
{
    storage: S,
    config: C,
    directory: D,
    resolver: AssetResolver<A>,
}

impl<S: Storage, C: ConfigProvider> SitePipeline<S, C> {
    /// Directory and asset store are derived from `config`.
    pub fn new(storage: S, config: C) -> Result<Self> {
        let directory = SourceDirectory::from_config(&config)?;
        let resolver = AssetResolver::with_fallback(
            LocalAssetStore::new(config.public_dir()),
            config.fallback_image(),
        );
        Ok(Self::with_parts(storage, config, directory, resolver))
    }
}

impl<S, C, D, A> SitePipeline<S, C, D, A>
where
    S: Storage,
    C: ConfigProvider,
    D: ServiceDirectory,
    A: AssetStore,
{
    pub fn with_parts(storage: S, config: C, directory: D, resolver: AssetResolver<A>) -> Self {
        Self {
            storage,
            config,
            directory,
            resolver,
        }
    }

    fn resolve_services(&self, services: Vec<Service>) -> Vec<ResolvedService> {
        services
            .into_iter()
            .map(|service| {
                let (image_url, used_fallback) =
                    self.resolver.resolve(service.image_url.as_deref());
                if used_fallback && service.image_url.is_some() {
                    tracing::info!(
                        "Service '{}' falls back to the stock image",
                        service.slug
                    );
                }
                ResolvedService {
                    service,
                    image_url,
                    used_fallback,
                }
            })
            .collect()
    }

    fn bundle(&self, pages: &[RenderedPage], manifest: &[u8]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for page in pages {
            zip.start_file(page.path.as_str(), SimpleFileOptions::default())?;
            zip.write_all(page.html.as_bytes())?;
        }
        zip.start_file(MANIFEST_FILE, SimpleFileOptions::default())?;
        zip.write_all(manifest)?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S, C, D, A> Pipeline for SitePipeline<S, C, D, A>
where
    S: Storage,
    C: ConfigProvider,
    D: ServiceDirectory,
    A: AssetStore,
{
    async fn extract(&self) -> Result<Vec<Service>> {
        self.directory.list_services().await
    }

    async fn transform(&self, services: Vec<Service>) -> Result<SiteBuild> {
        let site_name = self.config.site_name();
        let services = self.resolve_services(services);

        let mut pages = vec![RenderedPage {
            path: "index.html".to_string(),
            html: render_home_page(site_name, &services),
        }];

        let mut seen = HashSet::new();
        for resolved in &services {
            let slug = resolved.service.slug.as_str();
            if !is_safe_slug(slug) {
                tracing::warn!(
                    "No detail page for '{}': slug '{}' is not path-safe",
                    resolved.service.title,
                    slug
                );
                continue;
            }
            if !seen.insert(slug) {
                tracing::warn!("Duplicate slug '{}', keeping the first service", slug);
                continue;
            }
            let html = render_service_detail(site_name, &services, slug).ok_or_else(|| {
                SiteError::processing(format!("service '{}' vanished during render", slug))
            })?;
            pages.push(RenderedPage {
                path: format!("services/{}/index.html", slug),
                html,
            });
        }

        pages.push(RenderedPage {
            path: NOT_FOUND_PAGE.to_string(),
            html: render_not_found(site_name),
        });

        Ok(SiteBuild { services, pages })
    }

    async fn load(&self, build: SiteBuild) -> Result<String> {
        for page in &build.pages {
            tracing::debug!("Writing {} ({} bytes)", page.path, page.html.len());
            self.storage
                .write_file(&page.path, page.html.as_bytes())
                .await?;
        }

        let manifest = serde_json::to_vec_pretty(&build.manifest(chrono::Utc::now()))?;
        self.storage.write_file(MANIFEST_FILE, &manifest).await?;

        match self.config.bundle_filename() {
            Some(bundle_name) => {
                let data = self.bundle(&build.pages, &manifest)?;
                tracing::debug!("Writing bundle {} ({} bytes)", bundle_name, data.len());
                self.storage.write_file(bundle_name, &data).await?;
                Ok(format!("{}/{}", self.config.output_path(), bundle_name))
            }
            None => Ok(self.config.output_path().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset_resolver::FALLBACK_IMAGE_URL;
    use crate::core::BuildManifest;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        bundle: Option<String>,
    }

    impl ConfigProvider for MockConfig {
        fn site_name(&self) -> &str {
            "Acme IT"
        }

        fn source(&self) -> &str {
            "unused.json"
        }

        fn public_dir(&self) -> &str {
            "public"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn fallback_image(&self) -> &str {
            FALLBACK_IMAGE_URL
        }

        fn bundle_filename(&self) -> Option<&str> {
            self.bundle.as_deref()
        }

        fn request_timeout_seconds(&self) -> u64 {
            5
        }
    }

    struct StaticDirectory(Vec<Service>);

    #[async_trait]
    impl ServiceDirectory for StaticDirectory {
        async fn list_services(&self) -> Result<Vec<Service>> {
            Ok(self.0.clone())
        }
    }

    /// Only `uploads/present.jpg` exists.
    struct FixedAssets;

    impl AssetStore for FixedAssets {
        fn exists(&self, relative_path: &str) -> std::io::Result<bool> {
            Ok(relative_path == "uploads/present.jpg")
        }
    }

    fn service(slug: &str, image_url: Option<&str>) -> Service {
        Service {
            id: None,
            slug: slug.to_string(),
            title: format!("Title {}", slug),
            short_description: "short".to_string(),
            full_description: "full".to_string(),
            image_url: image_url.map(str::to_string),
            features: None,
            icon: None,
            is_exclusive: false,
        }
    }

    fn build_pipeline(
        storage: MockStorage,
        services: Vec<Service>,
        bundle: Option<&str>,
    ) -> SitePipeline<MockStorage, MockConfig, StaticDirectory, FixedAssets> {
        SitePipeline::with_parts(
            storage,
            MockConfig {
                bundle: bundle.map(str::to_string),
            },
            StaticDirectory(services),
            AssetResolver::new(FixedAssets),
        )
    }

    #[tokio::test]
    async fn test_transform_resolves_images_once_per_service() {
        let services = vec![
            service("present", Some("/uploads/present.jpg")),
            service("missing", Some("/uploads/missing.jpg")),
            service("remote", Some("https://cdn.example.com/r.jpg")),
            service("none", None),
        ];
        let pipeline = build_pipeline(MockStorage::new(), services, None);

        let extracted = pipeline.extract().await.unwrap();
        let build = pipeline.transform(extracted).await.unwrap();

        let images: Vec<&str> = build.services.iter().map(|s| s.image_url.as_str()).collect();
        assert_eq!(
            images,
            vec![
                "/uploads/present.jpg",
                FALLBACK_IMAGE_URL,
                "https://cdn.example.com/r.jpg",
                FALLBACK_IMAGE_URL
            ]
        );
        assert_eq!(build.fallback_count(), 2);
    }

    #[tokio::test]
    async fn test_transform_renders_every_page() {
        let services = vec![service("web", None), service("cloud", None)];
        let pipeline = build_pipeline(MockStorage::new(), services, None);

        let build = pipeline
            .transform(pipeline.extract().await.unwrap())
            .await
            .unwrap();

        let paths: Vec<&str> = build.pages.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "index.html",
                "services/web/index.html",
                "services/cloud/index.html",
                NOT_FOUND_PAGE
            ]
        );
    }

    #[tokio::test]
    async fn test_transform_skips_pages_for_unsafe_and_duplicate_slugs() {
        let services = vec![
            service("web", None),
            service("../escape", None),
            service("web", Some("/uploads/present.jpg")),
        ];
        let pipeline = build_pipeline(MockStorage::new(), services, None);

        let build = pipeline
            .transform(pipeline.extract().await.unwrap())
            .await
            .unwrap();

        assert_eq!(build.services.len(), 3);
        assert_eq!(build.pages.len(), 3);
        assert!(!build.pages.iter().any(|p| p.path.contains("..")));

        // still on the homepage, just without a link
        let home = &build.pages[0].html;
        assert!(home.contains("Title ../escape"));
        assert!(!home.contains("href=\"/services/../escape\""));
    }

    #[tokio::test]
    async fn test_load_writes_pages_and_manifest() {
        let storage = MockStorage::new();
        let pipeline = build_pipeline(storage.clone(), vec![service("web", None)], None);

        let build = pipeline
            .transform(pipeline.extract().await.unwrap())
            .await
            .unwrap();
        let output = pipeline.load(build).await.unwrap();

        assert_eq!(output, "test_output");
        assert!(storage.get_file("index.html").await.is_some());
        assert!(storage.get_file("services/web/index.html").await.is_some());
        assert!(storage.get_file(NOT_FOUND_PAGE).await.is_some());

        let manifest: BuildManifest =
            serde_json::from_slice(&storage.get_file(MANIFEST_FILE).await.unwrap()).unwrap();
        assert_eq!(manifest.service_count, 1);
        assert_eq!(manifest.fallback_images, 1);
        assert_eq!(manifest.pages.len(), 3);
    }

    #[tokio::test]
    async fn test_load_with_bundle() {
        let storage = MockStorage::new();
        let pipeline = build_pipeline(
            storage.clone(),
            vec![service("web", None), service("cloud", None)],
            Some("site.zip"),
        );

        let build = pipeline
            .transform(pipeline.extract().await.unwrap())
            .await
            .unwrap();
        let output = pipeline.load(build).await.unwrap();

        assert_eq!(output, "test_output/site.zip");

        let zip_bytes = storage.get_file("site.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();

        assert_eq!(
            names,
            vec![
                "404.html",
                "index.html",
                "manifest.json",
                "services/cloud/index.html",
                "services/web/index.html"
            ]
        );
    }

    #[tokio::test]
    async fn test_extract_propagates_directory_errors() {
        struct BrokenDirectory;

        #[async_trait]
        impl ServiceDirectory for BrokenDirectory {
            async fn list_services(&self) -> Result<Vec<Service>> {
                Err(SiteError::DirectoryError {
                    status: 502,
                    endpoint: "http://directory".to_string(),
                })
            }
        }

        let pipeline = SitePipeline::with_parts(
            MockStorage::new(),
            MockConfig { bundle: None },
            BrokenDirectory,
            AssetResolver::new(FixedAssets),
        );

        assert!(matches!(
            pipeline.extract().await,
            Err(SiteError::DirectoryError { status: 502, .. })
        ));
    }
}
