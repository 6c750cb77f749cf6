// SPDX-License-Identifier: MIT OR Apache-2.0

//! # patternflux
//!
//! Windowed complex-event detection. A [`WindowedPatternDetector`] scans each
//! window batch delivered by an upstream window source with a user-supplied
//! [`PatternMatcher`] and publishes the derived complex events to a
//! [`ComplexEventSink`].
//!
//! [`CepStage`] binds a detector into a partitioned stage: one detector per
//! partition, each fed by its own [`WindowBuffer`].

pub mod core;

pub use crate::core::config::{CepStageConfig, FlatConfig, GroupingKind, PropertySource};
pub use crate::core::event::{MatchOutcome, Window};
pub use crate::core::exception::{PatternFluxError, PatternFluxResult};
pub use crate::core::partition::{CepStage, CepStageBuilder, CepStageHandle, GroupingStrategy};
pub use crate::core::query::input::pattern::PatternMatcher;
pub use crate::core::query::processor::cep::{
    DetectionMode, DetectorStats, WindowedPatternDetector, WindowedPatternDetectorBuilder,
};
pub use crate::core::stream::output::sink::{
    ChannelSink, CollectingSink, ComplexEventSink, LogSink,
};
pub use crate::core::window::{WindowBuffer, WindowConfig};
