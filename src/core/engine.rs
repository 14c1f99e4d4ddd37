use crate::core::{Pipeline, SiteBuild};
use crate::utils::error::Result;
use crate::utils::monitor::BuildMonitor;

pub struct SiteEngine<P: Pipeline> {
    pipeline: P,
    monitor: BuildMonitor,
}

impl<P: Pipeline> SiteEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: BuildMonitor::new(monitor_enabled),
        }
    }

    /// Extract, render and write the site. Returns where it landed.
    pub async fn run(&self) -> Result<String> {
        let build = self.render().await?;

        let (pages, bytes) = (build.pages.len(), build.page_bytes());
        tracing::info!("Writing {} pages...", pages);
        let output_path = self.pipeline.load(build).await?;
        self.monitor.record("load", pages, bytes);
        self.monitor.log_summary();

        tracing::info!("Site written to: {}", output_path);
        Ok(output_path)
    }

    /// Extract and render without writing anything.
    pub async fn preview(&self) -> Result<SiteBuild> {
        let build = self.render().await?;
        for resolved in &build.services {
            tracing::info!(
                "🖼  {} -> {}{}",
                resolved.service.slug,
                resolved.image_url,
                if resolved.used_fallback { " (fallback)" } else { "" }
            );
        }
        for page in &build.pages {
            tracing::info!("📄 would write {}", page.path);
        }
        Ok(build)
    }

    async fn render(&self) -> Result<SiteBuild> {
        tracing::info!("Fetching services...");
        let services = self.pipeline.extract().await?;
        tracing::info!("Fetched {} services", services.len());
        self.monitor.record("extract", services.len(), 0);

        tracing::info!("Rendering pages...");
        let build = self.pipeline.transform(services).await?;
        tracing::info!(
            "Rendered {} pages, {} services using the fallback image",
            build.pages.len(),
            build.fallback_count()
        );
        self.monitor
            .record("transform", build.pages.len(), build.page_bytes());

        Ok(build)
    }
}
