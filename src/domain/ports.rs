use crate::domain::model::{GeocodeReport, GeocodeResult, InputRow, RunSummary};
use crate::utils::error::{GeocodeError, Result};
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
    fn api_endpoint(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<InputRow>>;
    async fn transform(&self, rows: Vec<InputRow>) -> Result<GeocodeReport>;
    async fn load(&self, report: GeocodeReport) -> Result<RunSummary>;
}

/// Resolves a free-text address to a coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, address: &str) -> std::result::Result<GeocodeResult, GeocodeError>;

    /// Like [`Geocoder::lookup`], but logs the failure and collapses it to `None`.
    async fn geocode(&self, address: &str) -> Option<GeocodeResult> {
        match self.lookup(address).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    }
}
