use crate::domain::labels::Labels;
use crate::domain::model::Cohort;
use crate::utils::error::{LoadError, Result};
use async_trait::async_trait;

/// Where the roster document comes from. Every call re-fetches.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn load(&self) -> std::result::Result<Vec<Cohort>, LoadError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Outcome of trying to fetch one photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    Loaded,
    Failed(String),
}

#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, src: &str) -> ImageStatus;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Base URL of the deployed site; `None` reads from `site_root` instead.
    fn site_url(&self) -> Option<&str>;
    fn site_root(&self) -> &str;
    fn data_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
    fn probe_images(&self) -> bool;
    fn request_timeout_secs(&self) -> u64;
    fn initial_filter(&self) -> Option<&str>;
    fn page_title(&self) -> &str;

    fn labels(&self) -> Labels {
        Labels::default()
    }
}
