use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting workforce table export");

        // Extract
        tracing::info!("📥 Reading source records...");
        let records = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", records.len());

        // Transform
        tracing::info!("🔧 Projecting display rows...");
        let result = self.pipeline.transform(records).await?;
        tracing::info!(
            "Projected {} rows for previous month {}",
            result.rows.len(),
            result.previous_month
        );

        // Load
        tracing::info!("💾 Writing exports...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("📁 Output saved to: {}", output_path);

        Ok(output_path)
    }
}
