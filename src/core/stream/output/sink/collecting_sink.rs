// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::exception::PatternFluxError;
use crate::core::stream::output::sink::sink_trait::ComplexEventSink;
use log::warn;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory sink; clones share the same buffer.
///
/// Used to observe emissions in tests and in embedded setups that poll for
/// results. If a thread panicked while holding the buffer, `publish` fails
/// while the read accessors still return everything collected before.
#[derive(Debug)]
pub struct CollectingSink<C> {
    events: Arc<Mutex<Vec<C>>>,
}

impl<C> Clone for CollectingSink<C> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<C> Default for CollectingSink<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CollectingSink<C> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return everything collected so far
    pub fn drain(&self) -> Vec<C> {
        std::mem::take(&mut *self.buffer())
    }

    // Every critical section is a single push, take or clone, so the vector
    // is intact even when the lock is poisoned.
    fn buffer(&self) -> MutexGuard<'_, Vec<C>> {
        self.events.lock().unwrap_or_else(|poisoned| {
            warn!("collecting sink buffer was poisoned; reading recovered contents");
            poisoned.into_inner()
        })
    }
}

impl<C: Clone> CollectingSink<C> {
    /// Snapshot of collected events in emission order
    pub fn collected(&self) -> Vec<C> {
        self.buffer().clone()
    }
}

impl<C: Debug + Send> ComplexEventSink<C> for CollectingSink<C> {
    fn publish(&self, event: C) -> Result<(), PatternFluxError> {
        self.events
            .lock()
            .map_err(|e| PatternFluxError::sink_failure("collecting", e.to_string()))?
            .push(event);
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "collecting"
    }
}
