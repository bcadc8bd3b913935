use crate::core::collector::ResultCollector;
use crate::domain::model::{InputRow, OutputRow};
use crate::domain::ports::Geocoder;
use crate::utils::error::{EtlError, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_MAX_IN_FLIGHT: usize = 5;

/// Runs one geocode task per row with at most `max_in_flight` requests
/// outstanding at any time.
pub struct BoundedDispatcher<G: Geocoder + 'static> {
    geocoder: Arc<G>,
    max_in_flight: usize,
}

impl<G: Geocoder + 'static> BoundedDispatcher<G> {
    pub fn new(geocoder: Arc<G>, max_in_flight: usize) -> Self {
        Self {
            geocoder,
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Geocodes every row and records the outcome in `collector`.
    ///
    /// Returns once all tasks have finished. `total_lines` is only used for
    /// progress output.
    pub async fn dispatch(
        &self,
        rows: Vec<InputRow>,
        total_lines: usize,
        collector: Arc<ResultCollector>,
    ) -> Result<()> {
        let gate = Arc::new(Semaphore::new(self.max_in_flight));
        let total_rows = rows.len();
        let mut tasks = JoinSet::new();

        for row in rows {
            let gate = Arc::clone(&gate);
            let geocoder = Arc::clone(&self.geocoder);
            let collector = Arc::clone(&collector);

            tasks.spawn(async move {
                // Held until the row is recorded; dropping it releases the slot on every path.
                let _permit = gate.acquire_owned().await.map_err(|e| EtlError::ProcessingError {
                    message: format!("admission gate closed: {}", e),
                })?;

                tracing::info!(
                    "Geocoding {}/{}: {}",
                    row.row_index + 1,
                    total_lines,
                    row.address
                );

                let row_index = row.row_index;
                let result = geocoder.geocode(&row.address).await;
                let output = OutputRow::from_lookup(row, result);

                if output.is_geocoded() {
                    tracing::info!("✓ {}", output);
                } else {
                    tracing::info!("✗ {}", output);
                }

                collector.record(row_index, output)?;
                let done = collector.mark_completed();
                tracing::debug!("Completed {}/{} rows", done, total_rows);
                Ok::<(), EtlError>(())
            });
        }

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| EtlError::ProcessingError {
                message: format!("geocode task failed: {}", e),
            });
            if let Err(e) = outcome.and_then(|recorded| recorded) {
                tracing::error!("{}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::GeocodeResult;
    use crate::utils::error::GeocodeError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records how many lookups overlap.
    #[derive(Default)]
    struct InstrumentedGeocoder {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for InstrumentedGeocoder {
        async fn lookup(&self, address: &str) -> std::result::Result<GeocodeResult, GeocodeError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(10)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            let n: f64 = address.parse().unwrap_or(0.0);
            Ok(GeocodeResult {
                latitude: n,
                longitude: -n,
            })
        }
    }

    /// Earlier rows answer later, so completion order is the reverse of input order.
    struct ReversedLatencyGeocoder {
        rows: u64,
    }

    #[async_trait]
    impl Geocoder for ReversedLatencyGeocoder {
        async fn lookup(&self, address: &str) -> std::result::Result<GeocodeResult, GeocodeError> {
            let n: u64 = address.parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis((self.rows - n) * 5)).await;
            if n % 3 == 0 {
                return Err(GeocodeError::NoLocation {
                    address: address.to_string(),
                });
            }
            Ok(GeocodeResult {
                latitude: n as f64,
                longitude: n as f64,
            })
        }
    }

    fn rows(count: usize) -> Vec<InputRow> {
        (0..count)
            .map(|i| InputRow {
                row_index: i,
                id: i as i64 + 100,
                address: i.to_string(),
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_cap_is_respected() {
        let geocoder = Arc::new(InstrumentedGeocoder::default());
        let dispatcher = BoundedDispatcher::new(geocoder.clone(), DEFAULT_MAX_IN_FLIGHT);
        let collector = Arc::new(ResultCollector::new());

        dispatcher.dispatch(rows(60), 60, collector.clone()).await.unwrap();

        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 60);
        assert!(geocoder.peak.load(Ordering::SeqCst) <= DEFAULT_MAX_IN_FLIGHT);
        assert!(geocoder.peak.load(Ordering::SeqCst) > 1);
        assert_eq!(collector.completed(), 60);
    }

    #[tokio::test]
    async fn test_custom_cap_of_one_serializes_requests() {
        let geocoder = Arc::new(InstrumentedGeocoder::default());
        let dispatcher = BoundedDispatcher::new(geocoder.clone(), 1);

        dispatcher
            .dispatch(rows(8), 8, Arc::new(ResultCollector::new()))
            .await
            .unwrap();

        assert_eq!(geocoder.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_output_order_ignores_completion_order() {
        let dispatcher = BoundedDispatcher::new(Arc::new(ReversedLatencyGeocoder { rows: 10 }), 10);
        let collector = Arc::new(ResultCollector::new());
        let input = rows(10);
        let expected: Vec<usize> = input.iter().map(|r| r.row_index).collect();

        dispatcher.dispatch(input, 10, collector.clone()).await.unwrap();
        let output = collector.emit(&expected).unwrap();

        assert_eq!(
            output.iter().map(|r| r.id).collect::<Vec<_>>(),
            (100..110).collect::<Vec<i64>>()
        );
        assert_eq!(output[0].latitude, None);
        assert_eq!(output[1].latitude, Some(1.0));
        assert_eq!(output[3].longitude, None);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let geocoder = Arc::new(InstrumentedGeocoder::default());
        let dispatcher = BoundedDispatcher::new(geocoder.clone(), 5);
        let collector = Arc::new(ResultCollector::new());

        dispatcher.dispatch(Vec::new(), 0, collector.clone()).await.unwrap();

        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_zero_cap_is_raised_to_one() {
        let dispatcher = BoundedDispatcher::new(Arc::new(InstrumentedGeocoder::default()), 0);
        assert_eq!(dispatcher.max_in_flight(), 1);
    }
}
