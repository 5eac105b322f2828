use crate::core::exporter::DEFAULT_CONST_NAME;
use crate::domain::model::DuplicatePolicy;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// 全部欄位皆有預設值，空檔案即等同原本的爬取設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub load: LoadConfig,
}

/// 目錄 API 連線設定，建立後不再變動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlConfig {
    #[serde(default = "default_start_id")]
    pub start_id: u64,
    #[serde(default = "default_end_id")]
    pub end_id: u64,
    /// 相鄰請求的最小間隔，0 代表不節流
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_intermediate_file")]
    pub intermediate_file: String,
    #[serde(default = "default_artifact_file")]
    pub artifact_file: String,
    #[serde(default = "default_const_name")]
    pub const_name: String,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

fn default_endpoint() -> String {
    "https://ydz.chp.org.cn/front-api/entry".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_start_id() -> u64 {
    2
}

fn default_end_id() -> u64 {
    615
}

fn default_delay_ms() -> u64 {
    500
}

fn default_output_path() -> String {
    ".".to_string()
}

fn default_intermediate_file() -> String {
    "medicines.json".to_string()
}

fn default_artifact_file() -> String {
    "medicine_data.js".to_string()
}

fn default_const_name() -> String {
    DEFAULT_CONST_NAME.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
            headers: HashMap::new(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_id: default_start_id(),
            end_id: default_end_id(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            intermediate_file: default_intermediate_file(),
            artifact_file: default_artifact_file(),
            const_name: default_const_name(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => EtlError::MissingInput {
                path: path.display().to_string(),
            },
            _ => EtlError::IoError(e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_ENDPOINT})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern must compile"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        validation::validate_positive_number(
            "source.timeout_seconds",
            self.source.timeout_seconds,
            1,
        )?;
        validation::validate_id_range("crawl", self.crawl.start_id, self.crawl.end_id)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_file_name("load.intermediate_file", &self.load.intermediate_file)?;
        validation::validate_file_name("load.artifact_file", &self.load.artifact_file)?;
        validation::validate_js_identifier("load.const_name", &self.load.const_name)?;

        if self.load.intermediate_file == self.load.artifact_file {
            return Err(EtlError::InvalidConfigValueError {
                field: "load.artifact_file".to_string(),
                value: self.load.artifact_file.clone(),
                reason: "Must differ from load.intermediate_file".to_string(),
            });
        }

        Ok(())
    }
}
