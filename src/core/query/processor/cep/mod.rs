// SPDX-License-Identifier: MIT OR Apache-2.0

//! Complex event detection over window batches

pub mod windowed_pattern_detector;

pub use windowed_pattern_detector::{WindowedPatternDetector, WindowedPatternDetectorBuilder};

use crate::core::exception::PatternFluxError;
use serde::{Deserialize, Serialize};

/// How a detector scans a window batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Threads state across events and windows; emits at most one complex
    /// event per window and stops scanning at the first match. The state is
    /// left at its value before the matching event.
    #[default]
    BreakOnFirstMatch,

    /// Evaluates every event against the fixed initial state and emits every
    /// match in batch order. The detector never mutates its state.
    EvaluateAll,
}

impl DetectionMode {
    /// Parse detection mode from string (case-insensitive)
    pub fn from_str(s: &str) -> Result<Self, PatternFluxError> {
        match s.to_lowercase().as_str() {
            "break_on_first_match" | "first" => Ok(DetectionMode::BreakOnFirstMatch),
            "evaluate_all" | "all" => Ok(DetectionMode::EvaluateAll),
            _ => Err(PatternFluxError::invalid_parameter_with_details(
                format!("Invalid detection mode '{}'", s),
                "mode",
                "'break_on_first_match' or 'evaluate_all'",
            )),
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DetectionMode::BreakOnFirstMatch => "break_on_first_match",
            DetectionMode::EvaluateAll => "evaluate_all",
        }
    }
}

/// Counters kept by a detector over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorStats {
    pub windows_processed: u64,
    /// Number of matcher invocations
    pub events_evaluated: u64,
    pub matches_emitted: u64,
    pub windows_without_match: u64,
}

impl DetectorStats {
    /// Sum counters of several partitions
    pub fn merged<'a>(stats: impl IntoIterator<Item = &'a DetectorStats>) -> DetectorStats {
        stats
            .into_iter()
            .fold(DetectorStats::default(), |mut acc, s| {
                acc.windows_processed += s.windows_processed;
                acc.events_evaluated += s.events_evaluated;
                acc.matches_emitted += s.matches_emitted;
                acc.windows_without_match += s.windows_without_match;
                acc
            })
    }

    pub fn to_json(&self) -> Result<String, PatternFluxError> {
        serde_json::to_string(self)
            .map_err(|e| PatternFluxError::runtime_with_source("Failed to serialize stats", Box::new(e)))
    }
}
