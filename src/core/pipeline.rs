use crate::core::collector::ResultCollector;
use crate::core::dispatcher::BoundedDispatcher;
use crate::core::geocoder::NominatimGeocoder;
use crate::core::parser::parse_rows;
use crate::core::{ConfigProvider, Geocoder, Pipeline, Storage};
use crate::domain::model::{GeocodeReport, InputRow, RunSummary};
use crate::utils::error::{EtlError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Read `ID,Address` rows, geocode them, write `ID,Address,Latitude,Longitude`.
pub struct GeocodePipeline<S: Storage, C: ConfigProvider, G: Geocoder + 'static> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) geocoder: Arc<G>,
    // Non-blank line count of the last extracted file, shown as the progress total.
    line_count: AtomicUsize,
}

impl<S: Storage, C: ConfigProvider> GeocodePipeline<S, C, NominatimGeocoder> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let geocoder = NominatimGeocoder::new(config.api_endpoint(), config.user_agent())?;
        Ok(Self::with_geocoder(storage, config, geocoder))
    }
}

impl<S: Storage, C: ConfigProvider, G: Geocoder + 'static> GeocodePipeline<S, C, G> {
    pub fn with_geocoder(storage: S, config: C, geocoder: G) -> Self {
        Self {
            storage,
            config,
            geocoder: Arc::new(geocoder),
            line_count: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, G: Geocoder + 'static> Pipeline for GeocodePipeline<S, C, G> {
    async fn extract(&self) -> Result<Vec<InputRow>> {
        let path = self.config.input_path();
        tracing::debug!("Reading input file: {}", path);

        let data = self.storage.read_file(path).await?;
        let text = String::from_utf8(data).map_err(|_| EtlError::InvalidEncoding {
            path: path.to_string(),
        })?;

        let parser = parse_rows(&text);
        if parser.is_empty() {
            return Err(EtlError::EmptyInput {
                path: path.to_string(),
            });
        }
        self.line_count.store(parser.line_count(), Ordering::SeqCst);

        let rows: Vec<InputRow> = parser.collect();
        tracing::debug!("Parsed {} valid rows from {}", rows.len(), path);
        Ok(rows)
    }

    async fn transform(&self, rows: Vec<InputRow>) -> Result<GeocodeReport> {
        let expected: Vec<usize> = rows.iter().map(|row| row.row_index).collect();
        let total_lines = self.line_count.load(Ordering::SeqCst).max(rows.len());

        let collector = Arc::new(ResultCollector::new());
        let dispatcher = BoundedDispatcher::new(
            Arc::clone(&self.geocoder),
            self.config.concurrent_requests(),
        );
        dispatcher
            .dispatch(rows, total_lines, Arc::clone(&collector))
            .await?;

        let output_rows = collector.emit(&expected)?;
        Ok(GeocodeReport::from_rows(output_rows))
    }

    async fn load(&self, report: GeocodeReport) -> Result<RunSummary> {
        let path = self.config.output_path();
        tracing::debug!(
            "Writing {} rows ({} bytes) to {}",
            report.rows.len(),
            report.csv_output.len(),
            path
        );

        self.storage
            .write_file(path, report.csv_output.as_bytes())
            .await?;

        Ok(RunSummary {
            output_path: path.to_string(),
            rows_written: report.rows.len(),
            geocoded: report.geocoded,
            failed: report.failed,
        })
    }
}
