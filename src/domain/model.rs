use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 來源不明的原始記錄，欄位名稱依匯入版本而異
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(obj) => Some(Self {
                data: obj.into_iter().collect(),
            }),
            _ => None,
        }
    }

    /// 以點分隔路徑取值，例如 `pricing.summary.fromPrice`
    pub fn get_path(&self, path: &str) -> Option<&serde_json::Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.data.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Active,
    Inactive,
    Planned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationNode {
    #[serde(rename = "nodeId", alias = "node_id", alias = "slug")]
    pub node_id: String,
    pub name: String,
    #[serde(default)]
    pub region: String,
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub: Option<String>,
}

impl DestinationNode {
    /// 顯示名稱去掉結尾的 "Guide"，例如 "Las Vegas Guide" -> "Las Vegas"
    pub fn city_name(&self) -> String {
        let trimmed = self.name.trim();
        let mut words: Vec<&str> = trimmed.split_whitespace().collect();
        if words.len() > 1
            && words
                .last()
                .is_some_and(|w| w.eq_ignore_ascii_case("guide"))
        {
            words.pop();
        }
        words.join(" ")
    }

    pub fn is_active(&self) -> bool {
        self.status == NodeStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub duration: Option<String>,
    pub tags: Vec<String>,
    pub booking_url: Option<String>,
    pub destination_key: Option<String>,
}

impl TourRecord {
    pub fn trust_score(&self) -> Option<u32> {
        crate::core::trust::trust_score(self.rating, self.review_count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerVolume {
    pub count: u64,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    pub id: String,
    pub name: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub passenger_volume: Option<PassengerVolume>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub neighbors: Vec<Neighbor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    ExactKey,
    ExactName,
    Substring,
}

impl MatchStrategy {
    pub fn confidence(self) -> Confidence {
        match self {
            MatchStrategy::ExactKey | MatchStrategy::ExactName => Confidence::High,
            MatchStrategy::Substring => Confidence::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchStrategy::ExactKey => "exact-key",
            MatchStrategy::ExactName => "exact-name",
            MatchStrategy::Substring => "substring",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Low,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub record_id: String,
    pub strategy: MatchStrategy,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub node_id: String,
    pub entries: Vec<MatchEntry>,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn record_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.record_id.as_str())
    }

    pub fn high_confidence(&self) -> impl Iterator<Item = &MatchEntry> {
        self.entries
            .iter()
            .filter(|e| e.confidence == Confidence::High)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Tour,
    Port,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Tour => f.write_str("tour"),
            RecordKind::Port => f.write_str("port"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum RejectReason {
    NotAnObject,
    MissingIdentity,
    MissingCoordinates,
    InvalidCoordinates { lat: f64, lng: f64 },
    DuplicateIdentifier { id: String },
}

/// 被丟棄的輸入記錄（不會中斷批次）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub kind: RecordKind,
    pub index: usize,
    #[serde(flatten)]
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Missing,
    Unparseable,
    OutOfRange,
    DuplicateId,
    /// tour 沒有比對到任何 active 節點
    NoCityMatch,
}

/// 非致命的資料品質問題
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityIssue {
    pub record_kind: RecordKind,
    pub record_id: String,
    pub field: String,
    pub issue: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeOutcome<T> {
    pub records: Vec<T>,
    pub rejections: Vec<Rejection>,
    pub issues: Vec<DataQualityIssue>,
}

impl<T> NormalizeOutcome<T> {
    pub fn total_input(&self) -> usize {
        self.records.len() + self.rejections.len()
    }

    /// 輸入非空但全部被丟棄：匯入流程有缺陷，而不是「沒有資料」
    pub fn is_empty_batch(&self) -> bool {
        self.records.is_empty() && !self.rejections.is_empty()
    }
}
