// Adapters layer: concrete implementations for external systems (site over
// HTTP, site checkout on disk, photo probing).

pub mod file;
pub mod http;
pub mod probe;

use crate::core::photos::PhotoResolver;
use crate::domain::model::Cohort;
use crate::domain::ports::{ConfigProvider, RosterSource};
use crate::utils::error::{LoadError, Result, RosterError};
use async_trait::async_trait;
use probe::{SiteBase, SiteImageProbe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub use file::FileRosterSource;
pub use http::HttpRosterSource;

/// The roster source selected by configuration: the deployed site when a
/// site URL is configured, the local checkout otherwise.
#[derive(Debug, Clone)]
pub enum SiteSource {
    Http(HttpRosterSource),
    File(FileRosterSource),
}

impl SiteSource {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs());
        match config.site_url() {
            Some(site_url) => Ok(SiteSource::Http(HttpRosterSource::from_site(
                site_url,
                config.data_path(),
                timeout,
            )?)),
            None => Ok(SiteSource::File(FileRosterSource::new(
                config.site_root(),
                config.data_path(),
            ))),
        }
    }
}

#[async_trait]
impl RosterSource for SiteSource {
    async fn load(&self) -> std::result::Result<Vec<Cohort>, LoadError> {
        match self {
            SiteSource::Http(source) => source.load().await,
            SiteSource::File(source) => source.load().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            SiteSource::Http(source) => source.describe(),
            SiteSource::File(source) => source.describe(),
        }
    }
}

/// Photo resolver for the configured site, or `None` when probing is off.
pub fn photo_resolver<C: ConfigProvider>(config: &C) -> Result<Option<PhotoResolver>> {
    if !config.probe_images() {
        return Ok(None);
    }

    let base = match config.site_url() {
        Some(site_url) => SiteBase::Remote(http::site_base_url(site_url)?),
        None => SiteBase::Local(PathBuf::from(config.site_root())),
    };
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs()))
        .build()
        .map_err(|e| RosterError::ConfigError {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

    let probe = SiteImageProbe::new(client, base);
    Ok(Some(PhotoResolver::new(
        Arc::new(probe),
        config.concurrent_requests(),
    )))
}
