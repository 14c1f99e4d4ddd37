use anyhow::Context;
use catalog_site::core::ConfigProvider;
use catalog_site::utils::error::ErrorSeverity;
use catalog_site::utils::{logger, validation::Validate};
use catalog_site::{CliConfig, LocalStorage, SiteEngine, SiteError, SitePipeline, TomlConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting catalog-site");
    tracing::debug!("CLI config: {:?}", args);

    let exit_code = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = TomlConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path))?;
            let monitor = args.monitor || config.monitoring_enabled();
            build_site(config, monitor, args.dry_run).await
        }
        None => {
            let (monitor, dry_run) = (args.monitor, args.dry_run);
            build_site(args, monitor, dry_run).await
        }
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

async fn build_site<C>(config: C, monitor: bool, dry_run: bool) -> i32
where
    C: ConfigProvider + Validate,
{
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        return 1;
    }

    if monitor {
        tracing::info!("🔍 Build monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path());
    let pipeline = match SitePipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => return report_failure(&e),
    };
    let engine = SiteEngine::new_with_monitoring(pipeline, monitor);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        return match engine.preview().await {
            Ok(_) => 0,
            Err(e) => report_failure(&e),
        };
    }

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Site built successfully!");
            println!("📁 Output saved to: {}", output_path);
            0
        }
        Err(e) => report_failure(&e),
    }
}

fn report_failure(e: &SiteError) -> i32 {
    tracing::error!(
        "❌ Site build failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
