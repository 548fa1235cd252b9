use crate::core::ConfigProvider;
use crate::domain::labels::Labels;
use crate::utils::error::{Result, RosterError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_DATA_PATH: &str = "data/students.json";
const DEFAULT_TITLE: &str = "Nos Étudiants";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub labels: Labels,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: Option<String>,
    pub url: Option<String>,
    pub root: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub data_path: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    pub probe_images: Option<bool>,
    pub concurrent_requests: Option<usize>,
    pub initial_filter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RosterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RosterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SITE_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| RosterError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        match &self.site.url {
            Some(url) => validation::validate_url("site.url", url)?,
            None => validation::validate_path("site.root", self.site_root())?,
        }

        validation::validate_relative_path("source.data_path", self.data_path())?;
        if self.output.path.trim().is_empty() {
            return Err(RosterError::MissingConfigError {
                field: "output.path".to_string(),
            });
        }
        validation::validate_path("output.path", &self.output.path)?;

        if let Some(concurrent) = self.render.concurrent_requests {
            validation::validate_positive_number("render.concurrent_requests", concurrent, 1)?;
        }
        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_positive_number("source.timeout_seconds", timeout as usize, 1)?;
        }

        // 分頁標籤與錯誤畫面文字不可為空
        validation::validate_non_empty_string("labels.all_tab", &self.labels.all_tab)?;
        validation::validate_non_empty_string("labels.retry", &self.labels.retry)?;

        Ok(())
    }

    pub fn json_logs(&self) -> bool {
        self.output.json_logs.unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn site_url(&self) -> Option<&str> {
        self.site.url.as_deref()
    }

    fn site_root(&self) -> &str {
        self.site.root.as_deref().unwrap_or(".")
    }

    fn data_path(&self) -> &str {
        self.source.data_path.as_deref().unwrap_or(DEFAULT_DATA_PATH)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn concurrent_requests(&self) -> usize {
        self.render.concurrent_requests.unwrap_or(5)
    }

    fn probe_images(&self) -> bool {
        self.render.probe_images.unwrap_or(false)
    }

    fn request_timeout_secs(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(10)
    }

    fn initial_filter(&self) -> Option<&str> {
        self.render.initial_filter.as_deref()
    }

    fn page_title(&self) -> &str {
        self.site.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    fn labels(&self) -> Labels {
        self.labels.clone()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
