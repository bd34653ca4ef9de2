//! Diagnostics — optional record of calls and failures.
//!
//! The client never depends on diagnostics for correctness. `record` returns
//! nothing, so a sink cannot fail an operation.

use tracing::{info, warn};

use crate::error::{Operation, PokecError};

#[derive(Debug)]
pub enum Diagnostic<'a> {
    /// An operation was invoked; `detail` lists its arguments.
    Call { operation: Operation, detail: String },
    /// An operation is about to surface `error`.
    Failure { operation: Operation, error: &'a PokecError },
}

pub trait Diagnostics: Send + Sync {
    fn record(&self, event: &Diagnostic<'_>);
}

/// Discards everything. Used when `verbose` is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn record(&self, _event: &Diagnostic<'_>) {}
}

/// Forwards to `tracing`. Used when `verbose` is on.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, event: &Diagnostic<'_>) {
        match event {
            Diagnostic::Call { operation, detail } => {
                info!(%operation, %detail, "pokec call");
            }
            Diagnostic::Failure { operation, error } => {
                warn!(%operation, code = error.error_code(), %error, "pokec call failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "diagnostics_test.rs"]
mod tests;
