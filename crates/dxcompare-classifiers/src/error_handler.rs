//! Log-and-propagate helpers shared by every stage of the pipeline.
//!
//! Failures are never swallowed: each operation logs its error together with a
//! local description at the boundary where it happened, then returns the very
//! same error to its caller. Soft conditions (nothing to evaluate, nothing
//! loaded yet) only emit a warning.
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt::Write as _;

/// Log `error` with `context`, its source chain and a backtrace, then hand it
/// back unchanged so the caller can propagate it.
///
/// ```ignore
/// return Err(log_and_raise(err, "Failed to load CSV"));
/// ```
pub fn log_and_raise<E: Error>(error: E, context: &str) -> E {
    let mut message = format!("{}: {}", context, error);
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(message, "\n  caused by: {}", cause);
        source = cause.source();
    }
    let backtrace = Backtrace::capture();
    if let std::backtrace::BacktraceStatus::Captured = backtrace.status() {
        let _ = write!(message, "\n{}", backtrace);
    }
    log::error!("{}", message);
    error
}

/// Record a non-fatal condition; execution continues.
pub fn log_warning(message: &str) {
    log::warn!("{}", message);
}

/// Boundary adapter applying [`log_and_raise`] to the error arm of a result.
pub trait LogOnError {
    fn log_on_error(self, context: &str) -> Self;
}

impl<T, E: Error> LogOnError for std::result::Result<T, E> {
    fn log_on_error(self, context: &str) -> Self {
        self.map_err(|err| log_and_raise(err, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, PipelineError};

    #[test]
    fn log_and_raise_returns_same_error() {
        let err = PipelineError::ColumnNotFound("Age".to_string());
        let raised = log_and_raise(err, "Failed to drop columns");
        assert_eq!(raised.kind(), ErrorKind::Validation);
        assert_eq!(raised.to_string(), "column 'Age' not found");
    }

    #[test]
    fn log_on_error_passes_ok_through() {
        let ok: Result<u32, PipelineError> = Ok(3);
        assert_eq!(ok.log_on_error("unused").unwrap(), 3);
    }

    #[test]
    fn log_on_error_keeps_error_variant() {
        let failed: Result<(), PipelineError> =
            Err(PipelineError::UnsupportedStrategy("bogus".into()));
        match failed.log_on_error("Failed to fill missing values") {
            Err(PipelineError::UnsupportedStrategy(name)) => assert_eq!(name, "bogus"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
