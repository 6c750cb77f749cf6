// SPDX-License-Identifier: MIT OR Apache-2.0

//! PatternFlux Core Error Types
//!
//! Error handling for detector construction, window activation and stage
//! execution. Nothing here is retried: every error is surfaced to the caller,
//! which owns restart policy.

use thiserror::Error;

/// Result type for PatternFlux operations
pub type PatternFluxResult<T> = Result<T, PatternFluxError>;

/// PatternFlux error types
#[derive(Error, Debug)]
pub enum PatternFluxError {
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        config_key: Option<String>,
    },

    #[error("Invalid parameter '{parameter:?}': {message}")]
    InvalidParameter {
        message: String,
        parameter: Option<String>,
        expected: Option<String>,
    },

    #[error("Missing required parameter: {parameter}")]
    MissingParameter { parameter: String },

    #[error("Validation failed: {message}")]
    ValidationFailed {
        message: String,
        field: Option<String>,
    },

    /// The user-supplied pattern matcher failed while evaluating an event.
    /// Fatal for the current activation.
    #[error("Pattern matcher failed in '{detector}' at event {event_index}: {source}")]
    PatternMatcherFault {
        detector: String,
        event_index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Sink '{sink}' rejected emission: {message}")]
    SinkFailure { sink: String, message: String },

    #[error("Runtime error: {message}")]
    Runtime {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

// Custom error creation helpers
impl PatternFluxError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            config_key: None,
        }
    }

    /// Create a configuration error with a specific key
    pub fn configuration_with_key(message: impl Into<String>, config_key: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            config_key: Some(config_key.into()),
        }
    }

    /// Create an invalid parameter error with details
    pub fn invalid_parameter_with_details(
        message: impl Into<String>,
        parameter: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            message: message.into(),
            parameter: Some(parameter.into()),
            expected: Some(expected.into()),
        }
    }

    /// Create a missing parameter error
    pub fn missing_parameter(parameter: impl Into<String>) -> Self {
        Self::MissingParameter {
            parameter: parameter.into(),
        }
    }

    /// Create a validation failed error for a specific field
    pub fn validation_failed(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Wrap a failure raised by a pattern matcher
    pub fn pattern_matcher_fault(
        detector: impl Into<String>,
        event_index: usize,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::PatternMatcherFault {
            detector: detector.into(),
            event_index,
            source: source.into(),
        }
    }

    pub fn sink_failure(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkFailure {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            source: None,
        }
    }

    /// Create a runtime error with source
    pub fn runtime_with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Runtime {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a generic error from a string
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether the error was detected before any window was processed
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::InvalidParameter { .. }
                | Self::MissingParameter { .. }
                | Self::ValidationFailed { .. }
        )
    }
}
