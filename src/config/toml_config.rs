use crate::core::projector::{MonthStrategy, NetEarningsStrategy, ProjectionOptions};
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub export: ExportConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub projection: ProjectionConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub month_strategy: Option<MonthStrategy>,
    pub net_earnings: Option<NetEarningsStrategy>,
    pub keep_unresolved: Option<bool>,
    /// `YYYY-MM-DD`
    pub reference_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
    pub filenames: Option<FilenameConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilenameConfig {
    pub csv: Option<String>,
    pub tsv: Option<String>,
    pub json: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
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
        validation::validate_non_empty_string("export.name", &self.export.name)?;
        validation::validate_path("source.input_path", &self.source.input_path)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        if let Some(raw) = &self.projection.reference_date {
            validation::validate_date("projection.reference_date", raw)?;
        }

        if let Some(filename) = self
            .load
            .compression
            .as_ref()
            .and_then(|c| c.filename.as_deref())
        {
            validation::validate_non_empty_string("load.compression.filename", filename)?;
        }

        Ok(())
    }

    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.projection
            .reference_date
            .as_deref()
            .and_then(|raw| validation::validate_date("projection.reference_date", raw).ok())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.source.input_path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn compression_enabled(&self) -> bool {
        self.load
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }

    fn output_filename(&self, format: &str) -> String {
        let configured = match format {
            "zip" => self.load.compression.as_ref().and_then(|c| c.filename.clone()),
            "csv" => self.load.filenames.as_ref().and_then(|f| f.csv.clone()),
            "tsv" => self.load.filenames.as_ref().and_then(|f| f.tsv.clone()),
            "json" => self.load.filenames.as_ref().and_then(|f| f.json.clone()),
            _ => None,
        };
        configured.unwrap_or_else(|| super::default_output_filename(format))
    }

    fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            month_strategy: self.projection.month_strategy.unwrap_or_default(),
            net_earnings: self.projection.net_earnings.unwrap_or_default(),
            keep_unresolved: self.projection.keep_unresolved.unwrap_or(false),
            reference_date: self.reference_date(),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
