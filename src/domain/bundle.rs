use crate::domain::model::{
    DataQualityIssue, DestinationNode, MatchResult, PortRecord, Rejection, TourRecord,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_THRESHOLD_KM: f64 = 200.0;
pub const DEFAULT_MAX_WORDS: usize = 4;
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://www.viator.com/searchResults/all";

/// 一次執行的不可變輸入快照
#[derive(Debug, Clone, Default)]
pub struct SourceSnapshot {
    pub nodes: Vec<DestinationNode>,
    pub aliases: Vec<(String, String)>,
    pub raw_tours: Vec<serde_json::Value>,
    pub raw_ports: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub base_url: String,
    pub partner_id: Option<String>,
    pub campaign: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            partner_id: None,
            campaign: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub threshold_km: f64,
    pub max_words: usize,
    pub stopwords: Vec<String>,
    pub include_low_confidence: bool,
    pub search: SearchSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            threshold_km: DEFAULT_THRESHOLD_KM,
            max_words: DEFAULT_MAX_WORDS,
            stopwords: crate::core::phrase::DEFAULT_STOPWORDS
                .iter()
                .map(|w| w.to_string())
                .collect(),
            include_low_confidence: true,
            search: SearchSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPhrase {
    pub record_id: String,
    pub node_id: String,
    pub phrase: String,
    pub search_url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCounts {
    pub input: usize,
    pub kept: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tours: BatchCounts,
    pub ports: BatchCounts,
    pub data_quality_issues: usize,
    pub matches_by_strategy: BTreeMap<String, usize>,
    pub nodes_matched: usize,
    pub nodes_without_matches: Vec<String>,
    pub skipped_nodes: Vec<String>,
    pub rejections: Vec<Rejection>,
    pub issues: Vec<DataQualityIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputBundle {
    pub generated_at: DateTime<Utc>,
    pub tours: Vec<TourRecord>,
    pub ports: Vec<PortRecord>,
    pub matches: Vec<MatchResult>,
    pub phrases: Vec<QueryPhrase>,
    pub regions: BTreeMap<String, Vec<String>>,
    pub summary: RunSummary,
}
