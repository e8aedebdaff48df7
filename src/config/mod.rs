pub mod cli;
pub mod toml_config;

use crate::core::phrase::DEFAULT_STOPWORDS;
use crate::core::ConfigProvider;
use crate::domain::bundle::{
    EngineSettings, SearchSettings, DEFAULT_MAX_WORDS, DEFAULT_SEARCH_BASE_URL,
    DEFAULT_THRESHOLD_KM,
};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "travel-etl")]
#[command(about = "Resolve destinations, match tours and link nearby cruise ports")]
pub struct CliConfig {
    #[arg(long, default_value = "data/nodes.json")]
    pub nodes_path: String,

    #[arg(long, default_value = "data/city-aliases.json")]
    pub aliases_path: String,

    #[arg(long, default_value = "data/tours.json")]
    pub tours_path: String,

    /// Ports as JSON, or CSV when the file ends in .csv
    #[arg(long, default_value = "data/ports.json")]
    pub ports_path: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "json,csv")]
    pub output_formats: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_THRESHOLD_KM)]
    pub threshold_km: f64,

    #[arg(long, default_value_t = DEFAULT_MAX_WORDS)]
    pub max_words: usize,

    /// Extra stop words, added to the built-in list
    #[arg(long, value_delimiter = ',')]
    pub stopwords: Vec<String>,

    #[arg(long, default_value = DEFAULT_SEARCH_BASE_URL)]
    pub search_base_url: String,

    #[arg(long, env = "VIATOR_PID")]
    pub partner_id: Option<String>,

    #[arg(long, env = "VIATOR_MCID")]
    pub campaign: Option<String>,

    #[arg(long, default_value = "4")]
    pub concurrency: usize,

    #[arg(long, help = "Drop low-confidence (substring) matches")]
    pub strict: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit JSON log lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn nodes_path(&self) -> &str {
        &self.nodes_path
    }

    fn aliases_path(&self) -> &str {
        &self.aliases_path
    }

    fn tours_path(&self) -> &str {
        &self.tours_path
    }

    fn ports_path(&self) -> &str {
        &self.ports_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            threshold_km: self.threshold_km,
            max_words: self.max_words,
            stopwords: DEFAULT_STOPWORDS
                .iter()
                .map(|w| w.to_string())
                .chain(self.stopwords.iter().cloned())
                .collect(),
            include_low_confidence: !self.strict,
            search: SearchSettings {
                base_url: self.search_base_url.clone(),
                partner_id: self.partner_id.clone(),
                campaign: self.campaign.clone(),
            },
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("nodes_path", &self.nodes_path)?;
        validation::validate_path("aliases_path", &self.aliases_path)?;
        validation::validate_path("tours_path", &self.tours_path)?;
        validation::validate_path("ports_path", &self.ports_path)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_threshold("threshold_km", self.threshold_km)?;
        validation::validate_range("max_words", self.max_words, 1, 10)?;
        validation::validate_positive_number("concurrency", self.concurrency, 1)?;
        validation::validate_url("search_base_url", &self.search_base_url)?;
        validation::validate_formats(
            "output_formats",
            &self.output_formats,
            toml_config::OUTPUT_FORMATS,
        )?;
        Ok(())
    }
}
