pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use self::config::CliConfig;
pub use self::config::{cli::LocalStorage, toml_config::TomlConfig};

pub use self::core::asset_resolver::{AssetResolver, LocalAssetStore, FALLBACK_IMAGE_URL};
pub use self::core::{engine::SiteEngine, pipeline::SitePipeline};
pub use self::utils::error::{Result, SiteError};
