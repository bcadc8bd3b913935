use crate::domain::model::OutputRow;
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Write-once sink of output rows keyed by input row index.
///
/// Writers may run on any task; `emit` is only meaningful once every writer
/// has finished.
#[derive(Debug, Default)]
pub struct ResultCollector {
    rows: Mutex<BTreeMap<usize, OutputRow>>,
    completed: AtomicUsize,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, row_index: usize, row: OutputRow) -> Result<()> {
        let mut rows = self.rows.lock().map_err(|_| EtlError::ProcessingError {
            message: "result collector lock poisoned".to_string(),
        })?;

        if rows.contains_key(&row_index) {
            return Err(EtlError::ProcessingError {
                message: format!("row {} was recorded twice", row_index),
            });
        }
        rows.insert(row_index, row);
        Ok(())
    }

    /// Bumps the progress counter and returns the new number of finished rows.
    pub fn mark_completed(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns the rows for `expected`, in ascending index order.
    pub fn emit(&self, expected: &[usize]) -> Result<Vec<OutputRow>> {
        let mut rows = self.rows.lock().map_err(|_| EtlError::ProcessingError {
            message: "result collector lock poisoned".to_string(),
        })?;

        let mut indices = expected.to_vec();
        indices.sort_unstable();
        indices.dedup();

        indices
            .into_iter()
            .map(|index| {
                rows.remove(&index).ok_or_else(|| EtlError::ProcessingError {
                    message: format!("no result recorded for row {}", index),
                })
            })
            .collect()
    }
}
