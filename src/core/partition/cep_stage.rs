// SPDX-License-Identifier: MIT OR Apache-2.0

//! # CEP Stage
//!
//! Binds a [`WindowedPatternDetector`] into a partitioned pipeline stage.
//!
//! ```text
//! send(event) → GroupingStrategy → partition channel → WindowBuffer → detector → sink
//! ```
//!
//! Each partition runs on its own thread and owns its detector, its copy of
//! the initial state and its window buffer. Windows of one partition are
//! executed serially. A pattern matcher fault stops the faulting partition;
//! the error is returned from [`CepStageHandle::shutdown`]. State is not
//! persisted: starting the stage again begins from the configured initial
//! state.

use crate::core::config::{CepStageConfig, GroupingKind};
use crate::core::event::Window;
use crate::core::exception::{PatternFluxError, PatternFluxResult};
use crate::core::partition::grouping::GroupingStrategy;
use crate::core::query::input::pattern::PatternMatcher;
use crate::core::query::processor::cep::{DetectionMode, DetectorStats, WindowedPatternDetector};
use crate::core::stream::output::sink::ComplexEventSink;
use crate::core::window::{WindowBuffer, WindowConfig};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{error, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Validated stage definition. Cheap to start several times.
pub struct CepStage<R, S, C> {
    name: String,
    mode: DetectionMode,
    initial_state: S,
    pattern_matcher: Arc<dyn PatternMatcher<R, S, C>>,
    window: WindowConfig,
    partitions: usize,
    grouping: GroupingStrategy<R>,
}

impl<R, S, C> std::fmt::Debug for CepStage<R, S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CepStage")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("window", &self.window)
            .field("partitions", &self.partitions)
            .field("grouping", &self.grouping)
            .finish()
    }
}

impl<R, S, C> CepStage<R, S, C> {
    pub fn builder() -> CepStageBuilder<R, S, C> {
        CepStageBuilder::new()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    #[inline]
    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    #[inline]
    pub fn window(&self) -> &WindowConfig {
        &self.window
    }
}

impl<R, S, C> CepStage<R, S, C>
where
    R: Clone + Send + 'static,
    S: Clone + Send + 'static,
    C: 'static,
{
    /// Spawn one worker per partition, all publishing to `sink`.
    pub fn start<K>(&self, sink: K) -> PatternFluxResult<CepStageHandle<R>>
    where
        K: ComplexEventSink<C> + 'static,
    {
        let sink: Arc<dyn ComplexEventSink<C>> = Arc::new(sink);
        let now = Instant::now();
        let mut senders = Vec::with_capacity(self.partitions);
        let mut workers = Vec::with_capacity(self.partitions);

        for partition in 0..self.partitions {
            let detector = WindowedPatternDetector::builder()
                .name(format!("{}-{}", self.name, partition))
                .mode(self.mode)
                .initial_state(self.initial_state.clone())
                .shared_pattern_matcher(Arc::clone(&self.pattern_matcher))
                .shared_sink(Arc::clone(&sink))
                .build()?;
            let buffer = WindowBuffer::new(self.window, now)?;
            let (sender, receiver) = crossbeam_channel::unbounded();

            let worker = thread::Builder::new()
                .name(format!("{}-partition-{}", self.name, partition))
                .spawn(move || run_partition(detector, buffer, receiver))?;

            senders.push(sender);
            workers.push(worker);
        }

        info!(
            "Started stage '{}' with {} partition(s), {} window, {:?} grouping",
            self.name,
            self.partitions,
            self.window.window_type(),
            self.grouping.kind()
        );

        Ok(CepStageHandle {
            name: self.name.clone(),
            senders,
            workers,
            grouping: self.grouping.clone(),
        })
    }
}

fn run_partition<R: Clone, S, C>(
    mut detector: WindowedPatternDetector<R, S, C>,
    mut buffer: WindowBuffer<R>,
    receiver: Receiver<R>,
) -> PatternFluxResult<DetectorStats> {
    loop {
        let received = match buffer.next_deadline() {
            Some(deadline) => receiver.recv_deadline(deadline),
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(event) => accept_event(&mut detector, &mut buffer, event, Instant::now())?,
            Err(RecvTimeoutError::Timeout) => {
                if let Some(window) = buffer.on_tick(Instant::now()) {
                    execute_or_stop(&mut detector, &window)?;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if buffer.pending() > 0 {
        warn!(
            "[{}] dropping {} event(s) of an incomplete window on shutdown",
            detector.name(),
            buffer.pending()
        );
    }
    Ok(detector.stats())
}

/// Buffer one event arriving at `now`.
///
/// An elapsed time window is closed before the event is added, so an event
/// received after a deadline belongs to the next window.
fn accept_event<R: Clone, S, C>(
    detector: &mut WindowedPatternDetector<R, S, C>,
    buffer: &mut WindowBuffer<R>,
    event: R,
    now: Instant,
) -> PatternFluxResult<()> {
    if let Some(window) = buffer.on_tick(now) {
        execute_or_stop(detector, &window)?;
    }
    if let Some(window) = buffer.on_event(event, now) {
        execute_or_stop(detector, &window)?;
    }
    Ok(())
}

fn execute_or_stop<R, S, C>(
    detector: &mut WindowedPatternDetector<R, S, C>,
    window: &Window<R>,
) -> PatternFluxResult<()> {
    detector.execute(window).map(|_| ()).map_err(|e| {
        error!(
            "[{}] partition stopped at window {}: {}",
            detector.name(),
            window.window_id,
            e
        );
        e
    })
}

/// Running stage. Dropping the handle without `shutdown` detaches the workers;
/// they exit once their input channel is closed.
pub struct CepStageHandle<R> {
    name: String,
    senders: Vec<Sender<R>>,
    workers: Vec<JoinHandle<PatternFluxResult<DetectorStats>>>,
    grouping: GroupingStrategy<R>,
}

impl<R> std::fmt::Debug for CepStageHandle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CepStageHandle")
            .field("name", &self.name)
            .field("partitions", &self.senders.len())
            .field("grouping", &self.grouping)
            .finish()
    }
}

impl<R> CepStageHandle<R> {
    /// Route one event to its partition.
    ///
    /// Fails when the target partition has stopped after a fatal error.
    pub fn send(&self, event: R) -> PatternFluxResult<()> {
        let partition = self.grouping.route(&event, self.senders.len());
        self.senders[partition].send(event).map_err(|_| {
            PatternFluxError::runtime(format!(
                "partition {} of stage '{}' is no longer running",
                partition, self.name
            ))
        })
    }

    #[inline]
    pub fn partitions(&self) -> usize {
        self.senders.len()
    }

    /// Close the input, wait for every partition and return their stats in
    /// partition order. The first partition failure is returned instead.
    pub fn shutdown(self) -> PatternFluxResult<Vec<DetectorStats>> {
        let CepStageHandle {
            name,
            senders,
            workers,
            ..
        } = self;
        drop(senders);

        let mut stats = Vec::with_capacity(workers.len());
        let mut first_error = None;
        for (partition, worker) in workers.into_iter().enumerate() {
            match worker.join() {
                Ok(Ok(partition_stats)) => stats.push(partition_stats),
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(_) => {
                    first_error.get_or_insert(PatternFluxError::runtime(format!(
                        "partition {} of stage '{}' panicked",
                        partition, name
                    )));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!(
                    "Stage '{}' stopped: {:?}",
                    name,
                    DetectorStats::merged(stats.iter())
                );
                Ok(stats)
            }
        }
    }
}

/// Builder for [`CepStage`].
pub struct CepStageBuilder<R, S, C> {
    name: String,
    mode: DetectionMode,
    initial_state: Option<S>,
    pattern_matcher: Option<Arc<dyn PatternMatcher<R, S, C>>>,
    window: Option<WindowConfig>,
    partitions: usize,
    grouping: GroupingStrategy<R>,
    /// Set when a configuration asks for fields grouping without a key
    expected_grouping: Option<GroupingKind>,
}

impl<R, S, C> Default for CepStageBuilder<R, S, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, S, C> CepStageBuilder<R, S, C> {
    pub fn new() -> Self {
        Self {
            name: "cep".to_string(),
            mode: DetectionMode::default(),
            initial_state: None,
            pattern_matcher: None,
            window: None,
            partitions: 1,
            grouping: GroupingStrategy::default(),
            expected_grouping: None,
        }
    }

    /// Seed the builder from a loaded configuration.
    ///
    /// Fields grouping needs a key extractor that cannot come from a file;
    /// supply it with [`CepStageBuilder::grouping`] before `build`.
    pub fn from_config(config: &CepStageConfig) -> Self {
        let grouping = match config.grouping {
            GroupingKind::Global => GroupingStrategy::Global,
            GroupingKind::Shuffle | GroupingKind::Fields => GroupingStrategy::Shuffle,
        };
        Self {
            name: config.name.clone(),
            mode: config.mode,
            window: Some(config.window),
            partitions: config.partitions,
            grouping,
            expected_grouping: (config.grouping == GroupingKind::Fields).then_some(GroupingKind::Fields),
            ..Self::new()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
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

    pub fn window(mut self, window: WindowConfig) -> Self {
        self.window = Some(window);
        self
    }

    pub fn partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn grouping(mut self, grouping: GroupingStrategy<R>) -> Self {
        if self.expected_grouping == Some(grouping.kind()) {
            self.expected_grouping = None;
        }
        self.grouping = grouping;
        self
    }

    pub fn build(self) -> PatternFluxResult<CepStage<R, S, C>> {
        if self.name.trim().is_empty() {
            return Err(PatternFluxError::validation_failed(
                "stage name must not be empty",
                "name",
            ));
        }
        let initial_state = self
            .initial_state
            .ok_or_else(|| PatternFluxError::missing_parameter("initial_state"))?;
        let pattern_matcher = self
            .pattern_matcher
            .ok_or_else(|| PatternFluxError::missing_parameter("pattern_matcher"))?;
        let window = self
            .window
            .ok_or_else(|| PatternFluxError::missing_parameter("window"))?;
        window.validate()?;

        if self.partitions == 0 {
            return Err(PatternFluxError::invalid_parameter_with_details(
                "stage needs at least one partition",
                "partitions",
                ">= 1",
            ));
        }
        if let Some(kind) = self.expected_grouping {
            return Err(PatternFluxError::configuration_with_key(
                format!("{:?} grouping configured but no key extractor supplied", kind),
                "grouping",
            ));
        }

        Ok(CepStage {
            name: self.name,
            mode: self.mode,
            initial_state,
            pattern_matcher,
            window,
            partitions: self.partitions,
            grouping: self.grouping,
        })
    }
}
