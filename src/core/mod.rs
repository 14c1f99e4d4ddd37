pub mod asset_resolver;
pub mod directory;
pub mod engine;
pub mod pipeline;
pub mod render;

pub use crate::domain::model::{
    BuildManifest, RenderedPage, ResolvedService, Service, ServiceId, SiteBuild,
};
pub use crate::domain::ports::{AssetStore, ConfigProvider, Pipeline, ServiceDirectory, Storage};
pub use crate::utils::error::Result;
