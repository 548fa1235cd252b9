use crate::core::filter::{FilterKey, Transition};
use crate::core::markup::escape_text;
use crate::core::page::{Applied, PageSnapshot, RosterPage};
use crate::core::{RosterSource, Storage};
use crate::utils::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};

pub const PAGE_FILE: &str = "index.html";
pub const SNAPSHOT_FILE: &str = "roster.json";
const STYLESHEET: &str = "css/style.css";

#[derive(Debug, Clone)]
pub struct SiteReport {
    pub applied: Applied,
    pub files: Vec<String>,
    pub snapshot: PageSnapshot,
}

/// Drives one roster page to completion and writes its snapshot.
pub struct SiteEngine<S: RosterSource, T: Storage> {
    page: RosterPage<S>,
    storage: T,
    title: String,
    initial_filter: Option<FilterKey>,
}

impl<S: RosterSource, T: Storage> SiteEngine<S, T> {
    pub fn new(page: RosterPage<S>, storage: T, title: impl Into<String>) -> Self {
        Self {
            page,
            storage,
            title: title.into(),
            initial_filter: None,
        }
    }

    pub fn with_initial_filter(mut self, key: Option<&str>) -> Self {
        self.initial_filter = key.map(FilterKey::parse);
        self
    }

    pub fn page(&self) -> &RosterPage<S> {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut RosterPage<S> {
        &mut self.page
    }

    /// Loads and renders the page, writes `index.html` and `roster.json`.
    /// A failed load still writes the error page before the load error is
    /// returned.
    pub async fn run(&mut self) -> Result<SiteReport> {
        let applied = self.page.run().await;

        if let (Applied::Rendered { .. }, Some(key)) = (applied, self.initial_filter.clone()) {
            if self.page.select(&key) == Transition::UnknownKey {
                tracing::warn!("⚠️ Cohort '{}' not found, showing all cohorts", key);
            }
        }

        let snapshot = self.page.snapshot();
        let html = render_document(&self.title, &self.page.to_html(), Utc::now());
        self.storage.write_file(PAGE_FILE, html.as_bytes()).await?;
        let json = serde_json::to_vec_pretty(&snapshot)?;
        self.storage.write_file(SNAPSHOT_FILE, &json).await?;
        tracing::debug!("Wrote {} ({} bytes) and {}", PAGE_FILE, html.len(), SNAPSHOT_FILE);

        if let Some(err) = self.page.take_load_error() {
            return Err(err.into());
        }

        Ok(SiteReport {
            applied,
            files: vec![PAGE_FILE.to_string(), SNAPSHOT_FILE.to_string()],
            snapshot,
        })
    }
}

pub fn render_document(title: &str, body: &str, generated_at: DateTime<Utc>) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <meta name=\"generated\" content=\"{generated}\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"{css}\">\n\
         </head>\n<body>\n{body}\n</body>\n</html>\n",
        generated = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        title = escape_text(title),
        css = STYLESHEET,
        body = body,
    )
}
