use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory feeds use either numeric database ids or opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceId::Number(n) => write!(f, "{}", n),
            ServiceId::Text(s) => f.write_str(s),
        }
    }
}

/// A catalog entry as served by the service directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default)]
    pub id: Option<ServiceId>,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub full_description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_exclusive: bool,
}

impl AsRef<Service> for Service {
    fn as_ref(&self) -> &Service {
        self
    }
}

/// A service paired with the image URL the pages will actually show.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedService {
    pub service: Service,
    pub image_url: String,
    pub used_fallback: bool,
}

impl AsRef<Service> for ResolvedService {
    fn as_ref(&self) -> &Service {
        &self.service
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// Path relative to the output root, always `/`-separated.
    pub path: String,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct SiteBuild {
    pub services: Vec<ResolvedService>,
    pub pages: Vec<RenderedPage>,
}

impl SiteBuild {
    pub fn fallback_count(&self) -> usize {
        self.services.iter().filter(|s| s.used_fallback).count()
    }

    /// Total HTML bytes across every rendered page.
    pub fn page_bytes(&self) -> usize {
        self.pages.iter().map(|p| p.html.len()).sum()
    }

    pub fn manifest(&self, generated_at: DateTime<Utc>) -> BuildManifest {
        BuildManifest {
            generated_at,
            service_count: self.services.len(),
            fallback_images: self.fallback_count(),
            pages: self.pages.iter().map(|p| p.path.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildManifest {
    pub generated_at: DateTime<Utc>,
    pub service_count: usize,
    pub fallback_images: usize,
    pub pages: Vec<String>,
}
