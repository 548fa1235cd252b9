use crate::domain::model::{Cohort, RosterDocument};
use crate::domain::ports::RosterSource;
use crate::utils::error::{LoadError, Result, RosterError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetches the roster document from a deployed site.
#[derive(Debug, Clone)]
pub struct HttpRosterSource {
    client: Client,
    url: Url,
}

impl HttpRosterSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RosterError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, url })
    }

    /// `site_url` is treated as a directory even without a trailing slash.
    pub fn from_site(site_url: &str, data_path: &str, timeout: Duration) -> Result<Self> {
        let url = join_site_path(site_url, data_path)?;
        Self::new(url, timeout)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

pub fn site_base_url(site_url: &str) -> Result<Url> {
    let mut base = site_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base).map_err(|e| RosterError::InvalidConfigValueError {
        field: "site_url".to_string(),
        value: site_url.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

pub fn join_site_path(site_url: &str, path: &str) -> Result<Url> {
    let base = site_base_url(site_url)?;
    base.join(path.trim_start_matches("./"))
        .map_err(|e| RosterError::InvalidConfigValueError {
            field: "data_path".to_string(),
            value: path.to_string(),
            reason: format!("Cannot resolve against {}: {}", base, e),
        })
}

#[async_trait]
impl RosterSource for HttpRosterSource {
    async fn load(&self) -> std::result::Result<Vec<Cohort>, LoadError> {
        tracing::debug!("Making roster request to: {}", self.url);
        let response = self.client.get(self.url.clone()).send().await?;
        tracing::debug!("Roster response status: {}", response.status());

        if !response.status().is_success() {
            return Err(LoadError::Status {
                status: response.status().as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let document: RosterDocument = serde_json::from_slice(&body)?;
        Ok(document.batches)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn source(server: &MockServer) -> HttpRosterSource {
        HttpRosterSource::from_site(&server.url("/bdsi"), "data/students.json", Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn site_url_is_treated_as_directory() {
        let url = join_site_path("https://example.com/bdsi", "./data/students.json").unwrap();
        assert_eq!(url.as_str(), "https://example.com/bdsi/data/students.json");
    }

    #[tokio::test]
    async fn test_load_successful_response() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/bdsi/data/students.json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "batches": [
                        {"year": 2024, "coordinator": {"name": "B"}, "students": []},
                        {"year": 2023, "coordinator": {"name": "A"}, "students": [{"name": "C"}]}
                    ]
                }));
        });

        let cohorts = source(&server).load().await.unwrap();

        api_mock.assert();
        assert_eq!(cohorts.len(), 2);
        assert_eq!(cohorts[0].year.as_str(), "2024");
        assert_eq!(cohorts[1].members.len(), 1);
    }

    #[tokio::test]
    async fn test_load_error_status() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/bdsi/data/students.json");
            then.status(404);
        });

        let err = source(&server).load().await.unwrap_err();

        api_mock.assert();
        assert!(matches!(err, LoadError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_load_schema_mismatch() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/bdsi/data/students.json");
            then.status(200).json_body(serde_json::json!({"cohorts": []}));
        });

        let err = source(&server).load().await.unwrap_err();

        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[tokio::test]
    async fn test_every_load_refetches() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/bdsi/data/students.json");
            then.status(200).json_body(serde_json::json!({"batches": []}));
        });
        let source = source(&server);

        source.load().await.unwrap();
        source.load().await.unwrap();

        api_mock.assert_hits(2);
    }
}
