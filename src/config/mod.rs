pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "roster-site")]
#[command(about = "Render the program's student roster page from its JSON data")]
pub struct CliConfig {
    #[arg(long, help = "Base URL of the deployed site; reads from --site-root when absent")]
    pub site_url: Option<String>,

    #[arg(long, default_value = ".")]
    pub site_root: String,

    #[arg(long, default_value = "data/students.json")]
    pub data_path: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "5")]
    pub concurrent_requests: usize,

    #[arg(long, help = "Check every photo and bake placeholder avatars into the page")]
    pub probe_images: bool,

    #[arg(long, default_value = "10")]
    pub timeout_secs: u64,

    #[arg(long, help = "Cohort year to select before writing the page")]
    pub filter: Option<String>,

    #[arg(long, default_value = "Nos Étudiants")]
    pub title: String,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn site_url(&self) -> Option<&str> {
        self.site_url.as_deref()
    }

    fn site_root(&self) -> &str {
        &self.site_root
    }

    fn data_path(&self) -> &str {
        &self.data_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn probe_images(&self) -> bool {
        self.probe_images
    }

    fn request_timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn initial_filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    fn page_title(&self) -> &str {
        &self.title
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        if let Some(site_url) = &self.site_url {
            validation::validate_url("site_url", site_url)?;
        } else {
            validation::validate_path("site_root", &self.site_root)?;
        }
        validation::validate_relative_path("data_path", &self.data_path)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;
        validation::validate_positive_number("timeout_secs", self.timeout_secs as usize, 1)?;
        if let Some(filter) = &self.filter {
            validation::validate_non_empty_string("filter", filter)?;
        }
        Ok(())
    }
}
