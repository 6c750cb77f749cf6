// SPDX-License-Identifier: MIT OR Apache-2.0

//! Window Configuration
//!
//! Count and processing-time windows that cut a partition's event stream into
//! the batches handed to a detector.

pub mod window_buffer;

pub use window_buffer::WindowBuffer;

use crate::core::exception::{PatternFluxError, PatternFluxResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tumbling count window: fires every `length` events
pub const WINDOW_TYPE_TUMBLING_COUNT: &str = "tumbling_count";

/// Sliding count window: last `length` events, fires every `slide` events
pub const WINDOW_TYPE_SLIDING_COUNT: &str = "sliding_count";

/// Tumbling time window: events of each `length` ms period
pub const WINDOW_TYPE_TUMBLING_TIME: &str = "tumbling_time";

/// Sliding time window: events of the last `length` ms, fires every `slide` ms
pub const WINDOW_TYPE_SLIDING_TIME: &str = "sliding_time";

/// Check if a window type is supported
pub fn is_supported_window_type(window_type: &str) -> bool {
    matches!(
        window_type,
        WINDOW_TYPE_TUMBLING_COUNT
            | WINDOW_TYPE_SLIDING_COUNT
            | WINDOW_TYPE_TUMBLING_TIME
            | WINDOW_TYPE_SLIDING_TIME
    )
}

/// Window length/slide policy. Time values are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WindowConfig {
    TumblingCount { length: u64 },
    SlidingCount { length: u64, slide: u64 },
    TumblingTime { length: u64 },
    SlidingTime { length: u64, slide: u64 },
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig::TumblingCount { length: 10 }
    }
}

impl WindowConfig {
    /// Build a window config from its type name and raw values
    pub fn from_parts(window_type: &str, length: u64, slide: Option<u64>) -> PatternFluxResult<Self> {
        let config = match window_type {
            WINDOW_TYPE_TUMBLING_COUNT => WindowConfig::TumblingCount { length },
            WINDOW_TYPE_TUMBLING_TIME => WindowConfig::TumblingTime { length },
            WINDOW_TYPE_SLIDING_COUNT | WINDOW_TYPE_SLIDING_TIME => {
                let slide = slide.ok_or_else(|| PatternFluxError::missing_parameter("window.slide"))?;
                if window_type == WINDOW_TYPE_SLIDING_COUNT {
                    WindowConfig::SlidingCount { length, slide }
                } else {
                    WindowConfig::SlidingTime { length, slide }
                }
            }
            other => {
                return Err(PatternFluxError::invalid_parameter_with_details(
                    format!("Unsupported window type '{}'", other),
                    "window.type",
                    "tumbling_count, sliding_count, tumbling_time or sliding_time",
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub const fn window_type(&self) -> &'static str {
        match self {
            WindowConfig::TumblingCount { .. } => WINDOW_TYPE_TUMBLING_COUNT,
            WindowConfig::SlidingCount { .. } => WINDOW_TYPE_SLIDING_COUNT,
            WindowConfig::TumblingTime { .. } => WINDOW_TYPE_TUMBLING_TIME,
            WindowConfig::SlidingTime { .. } => WINDOW_TYPE_SLIDING_TIME,
        }
    }

    #[inline]
    pub const fn is_time_based(&self) -> bool {
        matches!(
            self,
            WindowConfig::TumblingTime { .. } | WindowConfig::SlidingTime { .. }
        )
    }

    /// Reject zero lengths, zero slides and slides longer than the window
    pub fn validate(&self) -> PatternFluxResult<()> {
        let (length, slide) = match *self {
            WindowConfig::TumblingCount { length } | WindowConfig::TumblingTime { length } => {
                (length, length)
            }
            WindowConfig::SlidingCount { length, slide }
            | WindowConfig::SlidingTime { length, slide } => (length, slide),
        };

        if length == 0 {
            return Err(PatternFluxError::configuration_with_key(
                format!("{} window length must be greater than 0", self.window_type()),
                "window.length",
            ));
        }
        if slide == 0 {
            return Err(PatternFluxError::configuration_with_key(
                format!("{} window slide must be greater than 0", self.window_type()),
                "window.slide",
            ));
        }
        if slide > length {
            return Err(PatternFluxError::configuration_with_key(
                format!(
                    "{} window slide ({}) must not exceed its length ({})",
                    self.window_type(),
                    slide,
                    length
                ),
                "window.slide",
            ));
        }
        Ok(())
    }

    pub(crate) fn length_duration(&self) -> Duration {
        match *self {
            WindowConfig::TumblingTime { length } | WindowConfig::SlidingTime { length, .. } => {
                Duration::from_millis(length)
            }
            _ => Duration::ZERO,
        }
    }

    pub(crate) fn slide_duration(&self) -> Duration {
        match *self {
            WindowConfig::TumblingTime { length } => Duration::from_millis(length),
            WindowConfig::SlidingTime { slide, .. } => Duration::from_millis(slide),
            _ => Duration::ZERO,
        }
    }
}
