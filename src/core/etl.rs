use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting ETL process...");
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("📥 Extracting source files...");
        let snapshot = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("🔄 Resolving, matching and linking...");
        let bundle = self.pipeline.transform(snapshot).await?;
        tracing::info!(
            "🔄 Kept {} tours and {} ports ({} data quality issues)",
            bundle.tours.len(),
            bundle.ports.len(),
            bundle.summary.data_quality_issues
        );
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("💾 Writing output bundle...");
        let output_path = self.pipeline.load(bundle).await?;
        tracing::info!("📁 Output saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
