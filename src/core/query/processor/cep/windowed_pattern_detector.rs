// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Windowed Pattern Detector
//!
//! Scans each window batch with a [`PatternMatcher`] and publishes the derived
//! complex events to a [`ComplexEventSink`].
//!
//! ## Modes
//!
//! **Break on first match** (default): starting from the owned state, every
//! non-matching event advances the state to the one proposed by the matcher.
//! The first match is published, the remaining events of the batch are not
//! evaluated, and the state stays at its value before the matching event.
//! The state carries over to the next window.
//!
//! **Evaluate all**: every event is evaluated against the initial state,
//! which is never reassigned. Each match is published immediately, in batch
//! order. Any accumulation across events has to live inside the matcher.
//!
//! ## Execution contract
//!
//! The hosting engine invokes [`WindowedPatternDetector::execute_window`]
//! serially per instance, so the state needs no locking. Matcher and sink
//! failures abort the activation and are returned to the caller; there is no
//! retry and no local recovery.

use super::{DetectionMode, DetectorStats};
use crate::core::event::{MatchOutcome, Window};
use crate::core::exception::{PatternFluxError, PatternFluxResult};
use crate::core::query::input::pattern::PatternMatcher;
use crate::core::stream::output::sink::ComplexEventSink;
use log::{debug, error, trace};
use std::fmt::Debug;
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_DETECTOR_NAME: &str = "cep";

/// Complex event detector for one partition.
pub struct WindowedPatternDetector<R, S, C> {
    name: String,
    instance_id: Uuid,
    mode: DetectionMode,
    state: S,
    pattern_matcher: Arc<dyn PatternMatcher<R, S, C>>,
    sink: Arc<dyn ComplexEventSink<C>>,
    stats: DetectorStats,
}

impl<R, S: Debug, C> Debug for WindowedPatternDetector<R, S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowedPatternDetector")
            .field("name", &self.name)
            .field("instance_id", &self.instance_id)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("sink", &self.sink)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<R, S, C> WindowedPatternDetector<R, S, C> {
    pub fn builder() -> WindowedPatternDetectorBuilder<R, S, C> {
        WindowedPatternDetectorBuilder::new()
    }

    /// Process one window batch.
    ///
    /// Returns the number of complex events published for this activation.
    pub fn execute_window(&mut self, batch: &[R]) -> PatternFluxResult<usize> {
        self.stats.windows_processed += 1;

        let emitted = match self.mode {
            DetectionMode::BreakOnFirstMatch => self.scan_until_first_match(batch)?,
            DetectionMode::EvaluateAll => self.scan_all(batch)?,
        };

        if emitted == 0 {
            self.stats.windows_without_match += 1;
        }
        trace!(
            "[{}/{}] window of {} events processed, {} emitted",
            self.name,
            self.instance_id,
            batch.len(),
            emitted
        );
        Ok(emitted)
    }

    /// Process a [`Window`] delivered by a window source.
    pub fn execute(&mut self, window: &Window<R>) -> PatternFluxResult<usize> {
        trace!("[{}] activation for window {}", self.name, window.window_id);
        self.execute_window(window.events())
    }

    fn scan_until_first_match(&mut self, batch: &[R]) -> PatternFluxResult<usize> {
        for (index, event) in batch.iter().enumerate() {
            let outcome = self.evaluate(index, event, &self.state)?;
            self.stats.events_evaluated += 1;

            match outcome.into_parts() {
                (Some(result), _) => {
                    debug!(
                        "[{}] complex event detected at event {}, skipping {} remaining",
                        self.name,
                        index,
                        batch.len() - index - 1
                    );
                    self.publish(result)?;
                    return Ok(1);
                }
                (None, next_state) => self.state = next_state,
            }
        }
        Ok(0)
    }

    fn scan_all(&mut self, batch: &[R]) -> PatternFluxResult<usize> {
        let mut emitted = 0;
        for (index, event) in batch.iter().enumerate() {
            let outcome = self.evaluate(index, event, &self.state)?;
            self.stats.events_evaluated += 1;

            if let Some(result) = outcome.result {
                debug!("[{}] complex event detected at event {}", self.name, index);
                self.publish(result)?;
                emitted += 1;
            }
        }
        Ok(emitted)
    }

    fn evaluate(&self, index: usize, event: &R, state: &S) -> PatternFluxResult<MatchOutcome<C, S>> {
        self.pattern_matcher.apply(event, state).map_err(|e| {
            error!(
                "[{}/{}] pattern matcher failed at event {}: {}",
                self.name, self.instance_id, index, e
            );
            PatternFluxError::pattern_matcher_fault(self.name.clone(), index, e)
        })
    }

    fn publish(&mut self, result: C) -> PatternFluxResult<()> {
        if let Err(e) = self.sink.publish(result) {
            error!(
                "[{}] sink '{}' rejected complex event: {}",
                self.name,
                self.sink.sink_name(),
                e
            );
            return Err(e);
        }
        self.stats.matches_emitted += 1;
        Ok(())
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    #[inline]
    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    /// Current owned state. In evaluate-all mode this is always the initial state.
    #[inline]
    pub fn state(&self) -> &S {
        &self.state
    }

    #[inline]
    pub fn stats(&self) -> DetectorStats {
        self.stats
    }
}

/// Builder for [`WindowedPatternDetector`].
///
/// Initial state, pattern matcher and sink are required; `build` fails with
/// [`PatternFluxError::MissingParameter`] when one of them is absent.
pub struct WindowedPatternDetectorBuilder<R, S, C> {
    name: Option<String>,
    mode: DetectionMode,
    initial_state: Option<S>,
    pattern_matcher: Option<Arc<dyn PatternMatcher<R, S, C>>>,
    sink: Option<Arc<dyn ComplexEventSink<C>>>,
}

impl<R, S, C> Default for WindowedPatternDetectorBuilder<R, S, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, S, C> WindowedPatternDetectorBuilder<R, S, C> {
    pub fn new() -> Self {
        Self {
            name: None,
            mode: DetectionMode::default(),
            initial_state: None,
            pattern_matcher: None,
            sink: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn mode(mut self, mode: DetectionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn initial_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    pub fn pattern_matcher<M>(mut self, matcher: M) -> Self
    where
        M: PatternMatcher<R, S, C> + 'static,
    {
        self.pattern_matcher = Some(Arc::new(matcher));
        self
    }

    /// Use a matcher that is shared with other detectors.
    pub fn shared_pattern_matcher(mut self, matcher: Arc<dyn PatternMatcher<R, S, C>>) -> Self {
        self.pattern_matcher = Some(matcher);
        self
    }

    pub fn sink<K>(mut self, sink: K) -> Self
    where
        K: ComplexEventSink<C> + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn shared_sink(mut self, sink: Arc<dyn ComplexEventSink<C>>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> PatternFluxResult<WindowedPatternDetector<R, S, C>> {
        let name = self
            .name
            .unwrap_or_else(|| DEFAULT_DETECTOR_NAME.to_string());
        if name.trim().is_empty() {
            return Err(PatternFluxError::validation_failed(
                "detector name must not be empty",
                "name",
            ));
        }
        let state = self
            .initial_state
            .ok_or_else(|| PatternFluxError::missing_parameter("initial_state"))?;
        let pattern_matcher = self
            .pattern_matcher
            .ok_or_else(|| PatternFluxError::missing_parameter("pattern_matcher"))?;
        let sink = self
            .sink
            .ok_or_else(|| PatternFluxError::missing_parameter("sink"))?;

        let instance_id = Uuid::new_v4();
        debug!(
            "Created detector '{}' ({}) in {} mode",
            name,
            instance_id,
            self.mode.as_str()
        );

        Ok(WindowedPatternDetector {
            name,
            instance_id,
            mode: self.mode,
            state,
            pattern_matcher,
            sink,
            stats: DetectorStats::default(),
        })
    }
}
