use crate::core::phrase::DEFAULT_STOPWORDS;
use crate::core::ConfigProvider;
use crate::domain::bundle::{
    EngineSettings, SearchSettings, DEFAULT_MAX_WORDS, DEFAULT_SEARCH_BASE_URL,
    DEFAULT_THRESHOLD_KM,
};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const OUTPUT_FORMATS: &[&str] = &["json", "csv", "zip"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub inputs: InputsConfig,
    #[serde(default)]
    pub neighbors: NeighborsConfig,
    #[serde(default)]
    pub phrases: PhrasesConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub run: RunConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    pub nodes: String,
    pub aliases: String,
    pub tours: String,
    pub ports: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeighborsConfig {
    pub threshold_km: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhrasesConfig {
    pub max_words: Option<usize>,
    /// 取代預設的停用詞表
    pub stopwords: Option<Vec<String>>,
    /// 附加在停用詞表之後
    pub extra_stopwords: Option<Vec<String>>,
    pub search: Option<SearchConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    pub base_url: Option<String>,
    pub partner_id: Option<String>,
    pub campaign: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub include_low_confidence: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${VIATOR_PID})；未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ProcessingError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("inputs.nodes", &self.inputs.nodes)?;
        validation::validate_path("inputs.aliases", &self.inputs.aliases)?;
        validation::validate_path("inputs.tours", &self.inputs.tours)?;
        validation::validate_path("inputs.ports", &self.inputs.ports)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        validation::validate_positive_threshold("neighbors.threshold_km", self.threshold_km())?;
        validation::validate_range("phrases.max_words", self.max_words(), 1, 10)?;
        validation::validate_positive_number("run.concurrency", self.concurrency(), 1)?;
        validation::validate_url("phrases.search.base_url", &self.search_settings().base_url)?;
        validation::validate_formats("load.output_formats", &self.load.output_formats, OUTPUT_FORMATS)?;

        Ok(())
    }

    pub fn threshold_km(&self) -> f64 {
        self.neighbors.threshold_km.unwrap_or(DEFAULT_THRESHOLD_KM)
    }

    pub fn max_words(&self) -> usize {
        self.phrases.max_words.unwrap_or(DEFAULT_MAX_WORDS)
    }

    pub fn stopwords(&self) -> Vec<String> {
        let mut words: Vec<String> = match &self.phrases.stopwords {
            Some(list) => list.clone(),
            None => DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
        };
        if let Some(extra) = &self.phrases.extra_stopwords {
            words.extend(extra.iter().cloned());
        }
        words
    }

    pub fn search_settings(&self) -> SearchSettings {
        let search = self.phrases.search.clone().unwrap_or_default();
        SearchSettings {
            base_url: search
                .base_url
                .unwrap_or_else(|| DEFAULT_SEARCH_BASE_URL.to_string()),
            partner_id: search.partner_id.filter(|v| !v.trim().is_empty()),
            campaign: search.campaign.filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn include_low_confidence(&self) -> bool {
        self.matching.include_low_confidence.unwrap_or(true)
    }

    /// 只保留高信心比對
    pub fn set_strict(&mut self) {
        self.matching.include_low_confidence = Some(false);
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

impl ConfigProvider for TomlConfig {
    fn nodes_path(&self) -> &str {
        &self.inputs.nodes
    }

    fn aliases_path(&self) -> &str {
        &self.inputs.aliases
    }

    fn tours_path(&self) -> &str {
        &self.inputs.tours
    }

    fn ports_path(&self) -> &str {
        &self.inputs.ports
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn concurrency(&self) -> usize {
        self.run.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            threshold_km: self.threshold_km(),
            max_words: self.max_words(),
            stopwords: self.stopwords(),
            include_low_confidence: self.include_low_confidence(),
            search: self.search_settings(),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
