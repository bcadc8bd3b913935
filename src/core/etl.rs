use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        tracing::info!("Starting geocoding run");

        // Extract
        let rows = self.pipeline.extract().await?;
        tracing::info!("Extracted {} valid rows", rows.len());

        // Transform
        let report = self.pipeline.transform(rows).await?;
        tracing::info!(
            "Geocoded {} rows ({} without coordinates)",
            report.geocoded,
            report.failed
        );

        // Load
        let summary = self.pipeline.load(report).await?;
        tracing::info!(
            "Wrote {} rows to {} in {:?}",
            summary.rows_written,
            summary.output_path,
            started.elapsed()
        );

        Ok(summary)
    }
}
