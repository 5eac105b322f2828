use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting ETL process...");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} records ({:.1?})",
            raw_data.len(),
            started.elapsed()
        );

        // Transform
        let transformed_result = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "Transformed {} records into {} dosage ranges",
            transformed_result.records.len(),
            transformed_result.mapping.len()
        );

        // Load
        let output_path = self.pipeline.load(transformed_result).await?;
        tracing::info!(
            "Output saved to: {} (total {:.1?})",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
