//! Turning optional-read failures into neutral results.

use std::collections::HashSet;
use std::sync::Mutex;

use database::DatabaseError;
use tracing::warn;

/// Logs each missing-schema cause once per instance.
///
/// Transient failures are logged every time; missing relations and columns
/// are an expected state during rollout and would otherwise flood the logs.
#[derive(Debug, Default)]
pub struct WarnOnce {
    seen: Mutex<HashSet<String>>,
}

impl WarnOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log that `relation` lacks what `operation` needs, once per pair.
    pub fn missing_schema(&self, relation: &str, operation: &str) {
        let cause = format!("{relation}:{operation}");
        let first = match self.seen.lock() {
            Ok(mut seen) => seen.insert(cause),
            Err(_) => true,
        };
        if first {
            warn!(relation, operation, "Optional schema missing, returning empty result");
        }
    }

    /// Unwrap a query result, falling back to `T::default()` on any error.
    pub fn settle<T: Default>(
        &self,
        relation: &str,
        operation: &str,
        result: Result<T, DatabaseError>,
    ) -> T {
        match result {
            Ok(value) => value,
            Err(err) if err.is_missing_schema() => {
                self.missing_schema(relation, operation);
                T::default()
            }
            Err(err) => {
                warn!(
                    relation,
                    operation,
                    code = %err.code(),
                    error = %err,
                    "Query failed, returning empty result"
                );
                T::default()
            }
        }
    }

    /// Number of distinct causes logged so far.
    pub fn logged_causes(&self) -> usize {
        self.seen.lock().map(|seen| seen.len()).unwrap_or(0)
    }
}
