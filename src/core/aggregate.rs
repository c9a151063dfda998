//! Per-item error collection for batch operations

use crate::error::{PartialFailureError, Result, SeedError};

/// Collects failures from a batch and reduces them to a single result
///
/// - no errors: `Ok(())`
/// - one error: that error, unchanged
/// - two or more: a [`PartialFailureError`] with every message in order
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    errors: Vec<SeedError>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; `None` is ignored
    pub fn add(&mut self, err: impl Into<Option<SeedError>>) {
        if let Some(err) = err.into() {
            self.errors.push(err);
        }
    }

    /// Record the error of `result`, returning its value on success
    pub fn record<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(mut self) -> Result<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(PartialFailureError {
                messages: self.errors.iter().map(|e| e.to_string()).collect(),
            }
            .into()),
        }
    }
}
