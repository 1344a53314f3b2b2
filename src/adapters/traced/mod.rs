//! Decorating adapters that log every port call through `tracing`.

pub mod filesystem;

pub use filesystem::TracedFileSystem;

use std::fmt::Debug;
use std::io;

/// Log the outcome of a fallible port call and hand the result back.
///
/// Successes go out at `trace` level for reads and `debug` level for
/// mutations; failures always go out at `debug`.
pub(crate) fn trace_result<T: Debug>(
    port: &str,
    method: &str,
    mutating: bool,
    subject: &str,
    result: io::Result<T>,
) -> io::Result<T> {
    match &result {
        Ok(value) if mutating => {
            tracing::debug!(port, method, subject, ?value, "port call");
        }
        Ok(value) => {
            tracing::trace!(port, method, subject, ?value, "port call");
        }
        Err(err) => {
            tracing::debug!(port, method, subject, error = %err, "port call failed");
        }
    }
    result
}
