use crate::core::asset_resolver::FALLBACK_IMAGE_URL;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{
    validate_bundle_filename, validate_non_empty_string, validate_path, validate_positive_number,
    validate_source, Validate,
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_BUNDLE_FILENAME: &str = "site.zip";

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub site: SiteConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory API endpoint or local JSON file.
    pub location: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    pub public_dir: String,
    pub fallback_image: Option<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            public_dir: "public".to_string(),
            fallback_image: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub bundle: Option<BundleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value, leaving unknown
    /// variables untouched.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().is_some_and(|m| m.enabled)
    }
}

impl ConfigProvider for TomlConfig {
    fn site_name(&self) -> &str {
        &self.site.name
    }

    fn source(&self) -> &str {
        &self.source.location
    }

    fn public_dir(&self) -> &str {
        &self.assets.public_dir
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn fallback_image(&self) -> &str {
        self.assets
            .fallback_image
            .as_deref()
            .unwrap_or(FALLBACK_IMAGE_URL)
    }

    fn bundle_filename(&self) -> Option<&str> {
        let bundle = self.output.bundle.as_ref().filter(|b| b.enabled)?;
        Some(bundle.filename.as_deref().unwrap_or(DEFAULT_BUNDLE_FILENAME))
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("site.name", &self.site.name)?;
        validate_source("source.location", &self.source.location)?;
        validate_positive_number("source.timeout_seconds", self.request_timeout_seconds(), 1)?;
        validate_path("assets.public_dir", &self.assets.public_dir)?;
        validate_non_empty_string("assets.fallback_image", self.fallback_image())?;
        validate_path("output.path", &self.output.path)?;
        if let Some(filename) = self.bundle_filename() {
            validate_bundle_filename("output.bundle.filename", filename)?;
        }
        Ok(())
    }
}
