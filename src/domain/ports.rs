use crate::core::projector::ProjectionOptions;
use crate::domain::model::{ProjectionResult, SourceRecord};
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
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn compression_enabled(&self) -> bool;
    /// File name for a format (`csv`, `tsv`, `json`) or for the `zip` bundle.
    fn output_filename(&self, format: &str) -> String;
    fn projection_options(&self) -> ProjectionOptions;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SourceRecord>>;
    async fn transform(&self, data: Vec<SourceRecord>) -> Result<ProjectionResult>;
    async fn load(&self, result: ProjectionResult) -> Result<String>;
}
