// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::exception::PatternFluxError;
use crate::core::stream::output::sink::sink_trait::ComplexEventSink;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::fmt::Debug;

/// Forwards complex events into a crossbeam channel.
///
/// This is the downstream edge used when a stage feeds another consumer
/// thread. Publishing never blocks the partition worker: a full bounded
/// channel or a dropped receiver fails the publish.
#[derive(Debug, Clone)]
pub struct ChannelSink<C> {
    sender: Sender<C>,
}

impl<C> ChannelSink<C> {
    pub fn new(sender: Sender<C>) -> Self {
        Self { sender }
    }

    /// Create an unbounded sink together with its receiving end
    pub fn unbounded() -> (Self, Receiver<C>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self::new(sender), receiver)
    }

    /// Create a sink over a channel holding at most `capacity` pending events
    pub fn bounded(capacity: usize) -> (Self, Receiver<C>) {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        (Self::new(sender), receiver)
    }
}

impl<C: Debug + Send> ComplexEventSink<C> for ChannelSink<C> {
    fn publish(&self, event: C) -> Result<(), PatternFluxError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => PatternFluxError::sink_failure("channel", "channel full"),
            TrySendError::Disconnected(_) => {
                PatternFluxError::sink_failure("channel", "receiver disconnected")
            }
        })
    }

    fn sink_name(&self) -> &str {
        "channel"
    }
}
