use crate::core::{ConfigProvider, Service, ServiceDirectory};
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::is_remote_source;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

/// Pulls the services list from a JSON API.
pub struct HttpServiceDirectory {
    client: Client,
    endpoint: String,
}

impl HttpServiceDirectory {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ServiceDirectory for HttpServiceDirectory {
    async fn list_services(&self) -> Result<Vec<Service>> {
        tracing::debug!("Requesting services from: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        tracing::debug!("Directory response status: {}", status);
        if !status.is_success() {
            return Err(SiteError::DirectoryError {
                status: status.as_u16(),
                endpoint: self.endpoint.clone(),
            });
        }

        let body = response.bytes().await?;
        let services: Vec<Service> = serde_json::from_slice(&body)?;
        Ok(services)
    }
}

/// Reads the services list from a JSON file exported by the directory.
pub struct FileServiceDirectory {
    path: PathBuf,
}

impl FileServiceDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ServiceDirectory for FileServiceDirectory {
    async fn list_services(&self) -> Result<Vec<Service>> {
        tracing::debug!("Reading services from: {}", self.path.display());
        let data = tokio::fs::read(&self.path).await?;
        let services: Vec<Service> = serde_json::from_slice(&data)?;
        Ok(services)
    }
}

pub enum SourceDirectory {
    Http(HttpServiceDirectory),
    File(FileServiceDirectory),
}

impl SourceDirectory {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let source = config.source();
        if is_remote_source(source) {
            let timeout = Duration::from_secs(config.request_timeout_seconds());
            Ok(Self::Http(HttpServiceDirectory::new(source, timeout)?))
        } else {
            Ok(Self::File(FileServiceDirectory::new(source)))
        }
    }
}

#[async_trait]
impl ServiceDirectory for SourceDirectory {
    async fn list_services(&self) -> Result<Vec<Service>> {
        match self {
            SourceDirectory::Http(directory) => directory.list_services().await,
            SourceDirectory::File(directory) => directory.list_services().await,
        }
    }
}

/// First service carrying `slug`. Duplicate slugs are not rejected.
pub fn find_by_slug<'a, T: AsRef<Service>>(services: &'a [T], slug: &str) -> Option<&'a T> {
    services.iter().find(|s| s.as_ref().slug == slug)
}
