// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::config::GroupingKind;
use rand::Rng;
use std::fmt::Debug;
use std::sync::Arc;

/// Key extractor used by fields grouping
pub type KeyFn<R> = Arc<dyn Fn(&R) -> u64 + Send + Sync>;

/// Routing policy for the edge feeding a stage's partitions.
pub enum GroupingStrategy<R> {
    /// Uniform random distribution, no key affinity
    Shuffle,
    /// Events with equal keys always reach the same partition
    Fields(KeyFn<R>),
    /// Every event goes to partition 0
    Global,
}

impl<R> GroupingStrategy<R> {
    pub fn fields<F>(key: F) -> Self
    where
        F: Fn(&R) -> u64 + Send + Sync + 'static,
    {
        GroupingStrategy::Fields(Arc::new(key))
    }

    pub fn kind(&self) -> GroupingKind {
        match self {
            GroupingStrategy::Shuffle => GroupingKind::Shuffle,
            GroupingStrategy::Fields(_) => GroupingKind::Fields,
            GroupingStrategy::Global => GroupingKind::Global,
        }
    }

    /// Pick the partition for `event`; `partitions` must be at least 1.
    pub fn route(&self, event: &R, partitions: usize) -> usize {
        match self {
            GroupingStrategy::Shuffle => rand::thread_rng().gen_range(0..partitions),
            GroupingStrategy::Fields(key) => (key(event) % partitions as u64) as usize,
            GroupingStrategy::Global => 0,
        }
    }
}

impl<R> Default for GroupingStrategy<R> {
    fn default() -> Self {
        GroupingStrategy::Shuffle
    }
}

impl<R> Clone for GroupingStrategy<R> {
    fn clone(&self) -> Self {
        match self {
            GroupingStrategy::Shuffle => GroupingStrategy::Shuffle,
            GroupingStrategy::Fields(key) => GroupingStrategy::Fields(Arc::clone(key)),
            GroupingStrategy::Global => GroupingStrategy::Global,
        }
    }
}

impl<R> Debug for GroupingStrategy<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GroupingStrategy::{:?}", self.kind())
    }
}
