use crate::core::alias::{AliasResolver, Resolution};
use crate::core::catalog::NodeCatalog;
use crate::core::matcher::{EntityMatcher, MatchOptions};
use crate::core::neighbors::{build_neighbors, group_by_region, validate_threshold};
use crate::core::normalizer::{normalize_ports, normalize_tours};
use crate::core::phrase::{keywords, phrase_from_keywords, search_text, SearchLinkBuilder, StopWords};
use crate::domain::bundle::{
    BatchCounts, EngineSettings, OutputBundle, QueryPhrase, RunSummary, SourceSnapshot,
};
use crate::domain::model::{
    DataQualityIssue, DestinationNode, IssueKind, MatchResult, NormalizeOutcome, PortRecord,
    RecordKind, TourRecord,
};
use crate::utils::error::{ConfigError, EtlError, Result};
use std::collections::{HashMap, HashSet};

pub const MAX_PHRASE_WORDS: usize = 10;

/// 正規化後的記錄，尚未建立關聯
#[derive(Debug, Clone)]
pub struct Normalized {
    pub tours: NormalizeOutcome<TourRecord>,
    pub ports: NormalizeOutcome<PortRecord>,
}

/// 單次執行所需的已驗證配置與查詢表
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: NodeCatalog,
    aliases: AliasResolver,
    settings: EngineSettings,
    stopwords: StopWords,
    links: SearchLinkBuilder,
}

impl Engine {
    /// 驗證節點、別名與設定；任何結構性錯誤都在這裡失敗
    pub fn new(
        nodes: Vec<DestinationNode>,
        aliases: &[(String, String)],
        settings: EngineSettings,
    ) -> Result<Self> {
        validate_threshold(settings.threshold_km)?;
        if !(1..=MAX_PHRASE_WORDS).contains(&settings.max_words) {
            return Err(ConfigError::InvalidMaxWords {
                value: settings.max_words,
            }
            .into());
        }

        let catalog = NodeCatalog::load(nodes)?;
        let aliases = AliasResolver::load(aliases.iter().map(|(k, v)| (k, v)), &catalog)?;
        let stopwords = StopWords::new(&settings.stopwords);
        let links = SearchLinkBuilder::new(&settings.search)?;

        tracing::info!(
            "🧭 Engine ready: {} nodes ({} active), {} aliases, threshold {} km",
            catalog.len(),
            catalog.active().count(),
            aliases.len(),
            settings.threshold_km
        );

        Ok(Self {
            catalog,
            aliases,
            settings,
            stopwords,
            links,
        })
    }

    pub fn from_snapshot(snapshot: &SourceSnapshot, settings: EngineSettings) -> Result<Self> {
        Self::new(snapshot.nodes.clone(), &snapshot.aliases, settings)
    }

    pub fn catalog(&self) -> &NodeCatalog {
        &self.catalog
    }

    pub fn aliases(&self) -> &AliasResolver {
        &self.aliases
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn resolve(&self, raw_city: &str) -> Resolution {
        self.aliases.resolve(raw_city)
    }

    /// 正規化兩種記錄；整批被丟棄時回傳 EmptyBatch
    pub fn normalize(
        &self,
        raw_tours: &[serde_json::Value],
        raw_ports: &[serde_json::Value],
    ) -> Result<Normalized> {
        let tours = normalize_tours(raw_tours);
        let ports = normalize_ports(raw_ports);

        for (kind, empty, total) in [
            (RecordKind::Tour, tours.is_empty_batch(), tours.total_input()),
            (RecordKind::Port, ports.is_empty_batch(), ports.total_input()),
        ] {
            if empty {
                tracing::error!("❌ All {} {} records were rejected", total, kind);
                return Err(EtlError::EmptyBatch {
                    kind: kind.to_string(),
                    total,
                });
            }
        }

        tracing::info!(
            "🧹 Normalized {} tours ({} rejected), {} ports ({} rejected)",
            tours.records.len(),
            tours.rejections.len(),
            ports.records.len(),
            ports.rejections.len()
        );
        Ok(Normalized { tours, ports })
    }

    pub fn link_ports(&self, ports: &[PortRecord]) -> Result<Vec<PortRecord>> {
        build_neighbors(ports, self.settings.threshold_km)
    }

    fn matcher(&self) -> EntityMatcher<'_> {
        EntityMatcher::new(&self.aliases)
            .with_catalog(&self.catalog)
            .with_options(MatchOptions {
                include_low_confidence: self.settings.include_low_confidence,
            })
    }

    pub fn match_node(&self, node: &DestinationNode, tours: &[TourRecord]) -> MatchResult {
        self.matcher()
            .match_node(&node.node_id, &node.city_name(), tours)
    }

    /// 只比對 active 節點，依節點目錄順序輸出
    pub fn match_active(&self, tours: &[TourRecord]) -> Vec<MatchResult> {
        let matcher = self.matcher();
        self.catalog
            .active()
            .map(|node| matcher.match_node(&node.node_id, &node.city_name(), tours))
            .collect()
    }

    pub fn phrase_for(&self, tour: &TourRecord, node: &DestinationNode) -> QueryPhrase {
        let location = node.city_name();
        let picked = keywords(&tour.name, &tour.tags, &self.stopwords, self.settings.max_words);
        QueryPhrase {
            record_id: tour.id.clone(),
            node_id: node.node_id.clone(),
            phrase: phrase_from_keywords(&picked, &location),
            search_url: self
                .links
                .link_for(tour.booking_url.as_deref(), &search_text(&location, &picked)),
        }
    }

    pub fn phrases(&self, tours: &[TourRecord], matches: &[MatchResult]) -> Vec<QueryPhrase> {
        let by_id: HashMap<&str, &TourRecord> = tours
            .iter()
            .rev()
            .map(|t| (t.id.as_str(), t))
            .collect();

        matches
            .iter()
            .filter_map(|m| self.catalog.get(&m.node_id).map(|node| (node, m)))
            .flat_map(|(node, m)| {
                m.record_ids()
                    .filter_map(|id| by_id.get(id))
                    .map(move |tour| self.phrase_for(tour, node))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn assemble(
        &self,
        normalized: Normalized,
        ports: Vec<PortRecord>,
        matches: Vec<MatchResult>,
    ) -> OutputBundle {
        let Normalized { tours, ports: port_outcome } = normalized;
        let phrases = self.phrases(&tours.records, &matches);
        let regions = group_by_region(&ports);

        let mut summary = RunSummary {
            tours: BatchCounts {
                input: tours.total_input(),
                kept: tours.records.len(),
                rejected: tours.rejections.len(),
            },
            ports: BatchCounts {
                input: port_outcome.total_input(),
                kept: port_outcome.records.len(),
                rejected: port_outcome.rejections.len(),
            },
            ..RunSummary::default()
        };

        for m in &matches {
            if m.is_empty() {
                summary.nodes_without_matches.push(m.node_id.clone());
            } else {
                summary.nodes_matched += 1;
            }
            for entry in &m.entries {
                *summary
                    .matches_by_strategy
                    .entry(entry.strategy.to_string())
                    .or_insert(0) += 1;
            }
        }
        summary.skipped_nodes = self
            .catalog
            .nodes()
            .iter()
            .filter(|n| !n.is_active())
            .map(|n| n.node_id.clone())
            .collect();
        summary.rejections = tours
            .rejections
            .into_iter()
            .chain(port_outcome.rejections)
            .collect();
        summary.issues = tours.issues.into_iter().chain(port_outcome.issues).collect();
        summary.issues.extend(unmatched_tours(&tours.records, &matches));
        summary.data_quality_issues = summary.issues.len();

        if summary.data_quality_issues > 0 {
            tracing::warn!(
                "⚠️ {} data quality issues recorded (see summary.issues)",
                summary.data_quality_issues
            );
        }
        if !summary.nodes_without_matches.is_empty() {
            tracing::info!(
                "📭 Nodes with no matches yet: {}",
                summary.nodes_without_matches.join(", ")
            );
        }

        OutputBundle {
            generated_at: chrono::Utc::now(),
            tours: tours.records,
            ports,
            matches,
            phrases,
            regions,
            summary,
        }
    }

    /// 同步執行完整流程（不分工）
    pub fn run(
        &self,
        raw_tours: &[serde_json::Value],
        raw_ports: &[serde_json::Value],
    ) -> Result<OutputBundle> {
        let normalized = self.normalize(raw_tours, raw_ports)?;
        let ports = self.link_ports(&normalized.ports.records)?;
        let matches = self.match_active(&normalized.tours.records);
        Ok(self.assemble(normalized, ports, matches))
    }
}

/// 沒有出現在任何 MatchResult 的 tour，每個 id 記一筆
fn unmatched_tours(tours: &[TourRecord], matches: &[MatchResult]) -> Vec<DataQualityIssue> {
    let matched: HashSet<&str> = matches.iter().flat_map(|m| m.record_ids()).collect();
    let mut seen = HashSet::new();
    let issues: Vec<DataQualityIssue> = tours
        .iter()
        .filter(|t| !matched.contains(t.id.as_str()))
        .filter(|t| seen.insert(t.id.as_str()))
        .map(|t| DataQualityIssue {
            record_kind: RecordKind::Tour,
            record_id: t.id.clone(),
            field: "destination_key".to_string(),
            issue: IssueKind::NoCityMatch,
        })
        .collect();

    if !issues.is_empty() {
        tracing::debug!("🔎 {} tours matched no active node", issues.len());
    }
    issues
}
