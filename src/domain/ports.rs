use crate::domain::model::{Service, SiteBuild};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Write-only sink for the generated site; paths are relative to its root.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Read-only view of the public assets directory.
pub trait AssetStore: Send + Sync {
    /// Probe whether `relative_path` exists under the assets root.
    fn exists(&self, relative_path: &str) -> std::io::Result<bool>;
}

#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>>;
}

pub trait ConfigProvider: Send + Sync {
    fn site_name(&self) -> &str;
    /// Directory endpoint URL or path to a JSON file of services.
    fn source(&self) -> &str;
    fn public_dir(&self) -> &str;
    fn output_path(&self) -> &str;
    fn fallback_image(&self) -> &str;
    fn bundle_filename(&self) -> Option<&str>;
    fn request_timeout_seconds(&self) -> u64;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Service>>;
    async fn transform(&self, services: Vec<Service>) -> Result<SiteBuild>;
    async fn load(&self, build: SiteBuild) -> Result<String>;
}
