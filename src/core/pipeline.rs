use crate::core::engine::Engine;
use crate::core::normalizer::unwrap_collection;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::bundle::{OutputBundle, RunSummary, SourceSnapshot};
use crate::domain::model::{DestinationNode, MatchResult, TourRecord};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;
use zip::write::{FileOptions, ZipWriter};

pub const BUNDLE_ARCHIVE: &str = "destination_bundle.zip";

/// 讀取本地檔案、執行引擎、寫出結果
pub struct BatchPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> BatchPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    async fn read_json(&self, path: &str) -> Result<Value> {
        tracing::debug!("Reading {}", path);
        let bytes = self.storage.read_file(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn read_aliases(&self) -> Result<Vec<(String, String)>> {
        let path = self.config.aliases_path();
        let Value::Object(map) = self.read_json(path).await? else {
            return Err(EtlError::ConfigValidationError {
                field: "aliases_path".to_string(),
                message: format!("{} must contain a JSON object of alias -> nodeId", path),
            });
        };

        map.into_iter()
            .map(|(key, value)| match value {
                Value::String(node_id) => Ok((key, node_id)),
                other => Err(EtlError::ConfigValidationError {
                    field: "aliases_path".to_string(),
                    message: format!("alias '{}' maps to {} instead of a nodeId string", key, other),
                }),
            })
            .collect()
    }

    async fn read_ports(&self) -> Result<Vec<Value>> {
        let path = self.config.ports_path();
        if is_csv(path) {
            let bytes = self.storage.read_file(path).await?;
            return ports_from_csv(&bytes);
        }
        Ok(unwrap_collection(self.read_json(path).await?))
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn wants(&self, format: &str) -> bool {
        self.config
            .output_formats()
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }

    /// 依 concurrency 將 active 節點切塊，每塊一個 blocking task
    async fn match_concurrently(
        &self,
        engine: &Arc<Engine>,
        tours: Arc<Vec<TourRecord>>,
    ) -> Result<Vec<MatchResult>> {
        let active: Vec<DestinationNode> = engine.catalog().active().cloned().collect();
        if active.is_empty() {
            return Ok(Vec::new());
        }

        let workers = self.config.concurrency().max(1);
        let chunk_size = active.len().div_ceil(workers);
        let mut set = JoinSet::new();

        for (chunk_index, chunk) in active.chunks(chunk_size).enumerate() {
            let nodes = chunk.to_vec();
            let engine = Arc::clone(engine);
            let tours = Arc::clone(&tours);
            set.spawn_blocking(move || {
                let results: Vec<MatchResult> = nodes
                    .iter()
                    .map(|node| engine.match_node(node, &tours))
                    .collect();
                (chunk_index, results)
            });
        }

        tracing::debug!(
            "Matching {} active nodes on {} blocking tasks",
            active.len(),
            set.len()
        );

        let mut parts = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            parts.push(joined.map_err(join_failed)?);
        }
        // 依 chunk 順序合併，輸出與目錄順序一致
        parts.sort_by_key(|(chunk_index, _)| *chunk_index);
        Ok(parts.into_iter().flat_map(|(_, results)| results).collect())
    }
}

fn join_failed(e: tokio::task::JoinError) -> EtlError {
    EtlError::ProcessingError {
        message: format!("worker task failed: {}", e),
    }
}

fn is_csv(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// CSV 每列轉成 JSON 物件；空白欄位視為缺值
pub fn ports_from_csv(bytes: &[u8]) -> Result<Vec<Value>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        let object: serde_json::Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();
        rows.push(Value::Object(object));
    }
    Ok(rows)
}

#[derive(Debug, Serialize)]
struct MatchRow<'a> {
    node_id: &'a str,
    rank: usize,
    record_id: &'a str,
    name: &'a str,
    strategy: &'a str,
    confidence: &'a str,
    rating: Option<f64>,
    review_count: Option<u64>,
    trust_score: Option<u32>,
}

pub fn matches_csv(bundle: &OutputBundle) -> Result<Vec<u8>> {
    let tours: HashMap<&str, &TourRecord> = bundle
        .tours
        .iter()
        .rev()
        .map(|t| (t.id.as_str(), t))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    for result in &bundle.matches {
        for (rank, entry) in result.entries.iter().enumerate() {
            let tour = tours.get(entry.record_id.as_str());
            writer.serialize(MatchRow {
                node_id: &result.node_id,
                rank: rank + 1,
                record_id: &entry.record_id,
                name: tour.map(|t| t.name.as_str()).unwrap_or_default(),
                strategy: entry.strategy.as_str(),
                confidence: entry.confidence.as_str(),
                rating: tour.and_then(|t| t.rating),
                review_count: tour.and_then(|t| t.review_count),
                trust_score: tour.and_then(|t| t.trust_score()),
            })?;
        }
    }
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

/// tours.json 的每一筆附上 trust_score
#[derive(Debug, Serialize)]
struct TourOut<'a> {
    #[serde(flatten)]
    tour: &'a TourRecord,
    trust_score: Option<u32>,
}

impl<'a> From<&'a TourRecord> for TourOut<'a> {
    fn from(tour: &'a TourRecord) -> Self {
        Self {
            tour,
            trust_score: tour.trust_score(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SummaryFile<'a> {
    generated_at: &'a chrono::DateTime<chrono::Utc>,
    summary: &'a RunSummary,
}

fn bundle_files(bundle: &OutputBundle) -> Result<Vec<(&'static str, Vec<u8>)>> {
    Ok(vec![
        (
            "tours.json",
            serde_json::to_vec_pretty(&bundle.tours.iter().map(TourOut::from).collect::<Vec<_>>())?,
        ),
        ("ports.json", serde_json::to_vec_pretty(&bundle.ports)?),
        ("matches.json", serde_json::to_vec_pretty(&bundle.matches)?),
        ("phrases.json", serde_json::to_vec_pretty(&bundle.phrases)?),
        ("regions.json", serde_json::to_vec_pretty(&bundle.regions)?),
        (
            "summary.json",
            serde_json::to_vec_pretty(&SummaryFile {
                generated_at: &bundle.generated_at,
                summary: &bundle.summary,
            })?,
        ),
    ])
}

fn zip_files(files: &[(&str, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file::<_, ()>(*name, FileOptions::default())?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BatchPipeline<S, C> {
    async fn extract(&self) -> Result<SourceSnapshot> {
        let nodes: Vec<DestinationNode> =
            serde_json::from_value(self.read_json(self.config.nodes_path()).await?)?;
        let aliases = self.read_aliases().await?;
        let raw_tours = unwrap_collection(self.read_json(self.config.tours_path()).await?);
        let raw_ports = self.read_ports().await?;

        tracing::info!(
            "📥 Loaded {} nodes, {} aliases, {} raw tours, {} raw ports",
            nodes.len(),
            aliases.len(),
            raw_tours.len(),
            raw_ports.len()
        );

        Ok(SourceSnapshot {
            nodes,
            aliases,
            raw_tours,
            raw_ports,
        })
    }

    async fn transform(&self, snapshot: SourceSnapshot) -> Result<OutputBundle> {
        let engine = Arc::new(Engine::from_snapshot(
            &snapshot,
            self.config.engine_settings(),
        )?);
        let normalized = engine.normalize(&snapshot.raw_tours, &snapshot.raw_ports)?;

        let ports_task = {
            let engine = Arc::clone(&engine);
            let ports = normalized.ports.records.clone();
            tokio::task::spawn_blocking(move || engine.link_ports(&ports))
        };

        let tours = Arc::new(normalized.tours.records.clone());
        let matches = self.match_concurrently(&engine, tours).await?;
        let ports = ports_task.await.map_err(join_failed)??;

        let bundle = engine.assemble(normalized, ports, matches);
        tracing::info!(
            "🔗 Matched {} of {} active nodes, {} phrases, {} regions",
            bundle.summary.nodes_matched,
            bundle.matches.len(),
            bundle.phrases.len(),
            bundle.regions.len()
        );
        Ok(bundle)
    }

    async fn load(&self, bundle: OutputBundle) -> Result<String> {
        let mut files = bundle_files(&bundle)?;
        if self.wants("csv") {
            files.push(("matches.csv", matches_csv(&bundle)?));
        }

        for (name, data) in &files {
            self.storage.write_file(&self.output_file(name), data).await?;
        }
        tracing::debug!("Wrote {} output files", files.len());

        if self.wants("zip") {
            let archive = zip_files(&files)?;
            tracing::debug!("Writing ZIP file ({} bytes) to storage", archive.len());
            self.storage
                .write_file(&self.output_file(BUNDLE_ARCHIVE), &archive)
                .await?;
        }

        Ok(self.config.output_path().to_string())
    }
}
