// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::exception::PatternFluxError;
use std::fmt::Debug;

/// Downstream edge of a detector.
///
/// `publish` is called once per detected complex event, immediately and in
/// detection order. Sinks do no buffering on behalf of the detector.
///
/// # Errors
///
/// A sink that cannot deliver returns `Err`; the detector aborts the current
/// activation and hands the error to the hosting engine unchanged.
pub trait ComplexEventSink<C>: Debug + Send + Sync {
    fn publish(&self, event: C) -> Result<(), PatternFluxError>;

    /// Name used in logs and error messages
    fn sink_name(&self) -> &str {
        "sink"
    }
}
