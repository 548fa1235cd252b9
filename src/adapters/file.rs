use crate::domain::model::{Cohort, RosterDocument};
use crate::domain::ports::RosterSource;
use crate::utils::error::LoadError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads the roster document from a site checkout on disk.
#[derive(Debug, Clone)]
pub struct FileRosterSource {
    path: PathBuf,
}

impl FileRosterSource {
    pub fn new(site_root: impl AsRef<Path>, data_path: &str) -> Self {
        Self {
            path: site_root.as_ref().join(data_path.trim_start_matches("./")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RosterSource for FileRosterSource {
    async fn load(&self) -> Result<Vec<Cohort>, LoadError> {
        tracing::debug!("Reading roster document {}", self.path.display());
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        let document: RosterDocument = serde_json::from_slice(&data)?;
        Ok(document.batches)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
