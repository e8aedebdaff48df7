use crate::domain::bundle::{EngineSettings, OutputBundle, SourceSnapshot};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn nodes_path(&self) -> &str;
    fn aliases_path(&self) -> &str;
    fn tours_path(&self) -> &str;
    fn ports_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn concurrency(&self) -> usize;
    fn engine_settings(&self) -> EngineSettings;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceSnapshot>;
    async fn transform(&self, snapshot: SourceSnapshot) -> Result<OutputBundle>;
    async fn load(&self, bundle: OutputBundle) -> Result<String>;
}
