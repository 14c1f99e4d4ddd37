pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use crate::core::asset_resolver::FALLBACK_IMAGE_URL;
    use crate::core::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{
        validate_bundle_filename, validate_non_empty_string, validate_path,
        validate_positive_number, validate_source, Validate,
    };
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "catalog-site")]
    #[command(about = "Build the services catalog site from a service directory")]
    pub struct CliConfig {
        /// Directory API endpoint or path to a JSON file of services
        #[arg(long, default_value = "data/services.json")]
        pub source: String,

        #[arg(long, default_value = "IT Services")]
        pub site_name: String,

        /// Root that site-relative image paths are checked against
        #[arg(long, default_value = "public")]
        pub public_dir: String,

        #[arg(long, default_value = "./dist")]
        pub output_path: String,

        #[arg(long, default_value = FALLBACK_IMAGE_URL)]
        pub fallback_image: String,

        #[arg(long, help = "Also write a zip archive of the site")]
        pub bundle: bool,

        #[arg(long, default_value = "site.zip")]
        pub bundle_name: String,

        #[arg(long, default_value = "10")]
        pub timeout_seconds: u64,

        /// TOML configuration file; replaces the flags above
        #[arg(short, long)]
        pub config: Option<String>,

        #[arg(long, help = "Render without writing any files")]
        pub dry_run: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub log_json: bool,
    }

    impl ConfigProvider for CliConfig {
        fn site_name(&self) -> &str {
            &self.site_name
        }

        fn source(&self) -> &str {
            &self.source
        }

        fn public_dir(&self) -> &str {
            &self.public_dir
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn fallback_image(&self) -> &str {
            &self.fallback_image
        }

        fn bundle_filename(&self) -> Option<&str> {
            self.bundle.then_some(self.bundle_name.as_str())
        }

        fn request_timeout_seconds(&self) -> u64 {
            self.timeout_seconds
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_source("source", &self.source)?;
            validate_non_empty_string("site_name", &self.site_name)?;
            validate_path("public_dir", &self.public_dir)?;
            validate_path("output_path", &self.output_path)?;
            validate_non_empty_string("fallback_image", &self.fallback_image)?;
            validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
            if self.bundle {
                validate_bundle_filename("bundle_name", &self.bundle_name)?;
            }
            Ok(())
        }
    }

}
