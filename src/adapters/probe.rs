use crate::domain::ports::{ImageProbe, ImageStatus};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::PathBuf;
use url::Url;

/// Where relative photo paths resolve.
#[derive(Debug, Clone)]
pub enum SiteBase {
    Remote(Url),
    Local(PathBuf),
}

/// Checks whether photo sources would load in a browser.
#[derive(Debug, Clone)]
pub struct SiteImageProbe {
    client: Client,
    base: SiteBase,
}

impl SiteImageProbe {
    pub fn new(client: Client, base: SiteBase) -> Self {
        Self { client, base }
    }

    async fn probe_remote(&self, url: Url) -> ImageStatus {
        match self.client.head(url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                if content_type.starts_with("image/") {
                    ImageStatus::Loaded
                } else {
                    ImageStatus::Failed(format!("{} is not an image ({})", url, content_type))
                }
            }
            Ok(response) => ImageStatus::Failed(format!("{} returned {}", url, response.status())),
            Err(e) => ImageStatus::Failed(e.to_string()),
        }
    }

    async fn probe_local(&self, path: PathBuf) -> ImageStatus {
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => ImageStatus::Loaded,
            Ok(_) => ImageStatus::Failed(format!("{} is empty or not a file", path.display())),
            Err(e) => ImageStatus::Failed(format!("{}: {}", path.display(), e)),
        }
    }
}

#[async_trait]
impl ImageProbe for SiteImageProbe {
    async fn probe(&self, src: &str) -> ImageStatus {
        let src = src.trim();
        if src.is_empty() {
            return ImageStatus::Failed("empty source".to_string());
        }
        if src.starts_with("data:") {
            return ImageStatus::Loaded;
        }
        if let Ok(absolute) = Url::parse(src) {
            return match absolute.scheme() {
                "http" | "https" => self.probe_remote(absolute).await,
                scheme => ImageStatus::Failed(format!("unsupported scheme {}", scheme)),
            };
        }

        match &self.base {
            SiteBase::Remote(base) => match base.join(src) {
                Ok(url) => self.probe_remote(url).await,
                Err(e) => ImageStatus::Failed(e.to_string()),
            },
            SiteBase::Local(root) => {
                let relative = src.trim_start_matches("./").trim_start_matches('/');
                self.probe_local(root.join(relative)).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method;
    use tempfile::TempDir;

    #[tokio::test]
    async fn local_photos_must_exist_and_be_non_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/sara.jpg"), b"\xFF\xD8\xFF").unwrap();
        std::fs::write(dir.path().join("images/empty.jpg"), b"").unwrap();
        let probe = SiteImageProbe::new(Client::new(), SiteBase::Local(dir.path().to_path_buf()));

        assert_eq!(probe.probe("images/sara.jpg").await, ImageStatus::Loaded);
        assert_eq!(probe.probe("./images/sara.jpg").await, ImageStatus::Loaded);
        assert!(matches!(probe.probe("images/empty.jpg").await, ImageStatus::Failed(_)));
        assert!(matches!(probe.probe("images/nobody.jpg").await, ImageStatus::Failed(_)));
        assert!(matches!(probe.probe("").await, ImageStatus::Failed(_)));
    }

    #[tokio::test]
    async fn data_uris_always_load() {
        let probe = SiteImageProbe::new(Client::new(), SiteBase::Local(PathBuf::from("/nonexistent")));
        assert_eq!(probe.probe("data:image/svg+xml,%3Csvg%3E").await, ImageStatus::Loaded);
    }

    #[tokio::test]
    async fn remote_photos_need_image_content_type() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::HEAD).path("/site/images/ok.jpg");
            then.status(200).header("Content-Type", "image/jpeg");
        });
        server.mock(|when, then| {
            when.method(Method::HEAD).path("/site/images/page.jpg");
            then.status(200).header("Content-Type", "text/html");
        });
        server.mock(|when, then| {
            when.method(Method::HEAD).path("/site/images/gone.jpg");
            then.status(404);
        });
        let base = Url::parse(&server.url("/site/")).unwrap();
        let probe = SiteImageProbe::new(Client::new(), SiteBase::Remote(base));

        assert_eq!(probe.probe("images/ok.jpg").await, ImageStatus::Loaded);
        assert!(matches!(probe.probe("images/page.jpg").await, ImageStatus::Failed(_)));
        assert!(matches!(probe.probe("images/gone.jpg").await, ImageStatus::Failed(_)));
    }
}
