//! Logging decorator for procedure calls.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use super::ProcedureKind;

/// What one procedure call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub kind: ProcedureKind,
    pub path: String,
    /// `None` on success, the error message on failure.
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl CallRecord {
    pub fn new<T, E: fmt::Display>(
        kind: ProcedureKind,
        path: &str,
        result: &Result<T, E>,
        elapsed: Duration,
    ) -> Self {
        Self {
            kind,
            path: path.to_string(),
            error: result.as_ref().err().map(ToString::to_string),
            elapsed,
        }
    }

    fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Emit as a structured tracing event.
    pub fn emit(&self) {
        match &self.error {
            None => tracing::info!(
                kind = %self.kind,
                path = %self.path,
                duration_ms = format_args!("{:.2}", self.elapsed_ms()),
                "OK request"
            ),
            Some(error) => tracing::error!(
                kind = %self.kind,
                path = %self.path,
                duration_ms = format_args!("{:.2}", self.elapsed_ms()),
                error = %error,
                "Error request"
            ),
        }
    }
}

/// Run `call`, then record its kind, path, outcome, and duration.
pub async fn logged<T, E, F>(kind: ProcedureKind, path: &str, call: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let start = Instant::now();
    let result = call.await;
    CallRecord::new(kind, path, &result, start.elapsed()).emit();
    result
}
