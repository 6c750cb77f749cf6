// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::exception::PatternFluxError;
use crate::core::stream::output::sink::sink_trait::ComplexEventSink;
use std::fmt::Debug;
use std::marker::PhantomData;

/// LogSink - Debug sink that writes every complex event to the log system
///
/// Used primarily for development and for stages whose output is only
/// inspected by operators.
#[derive(Debug, Clone)]
pub struct LogSink<C> {
    prefix: String,
    _marker: PhantomData<fn(C)>,
}

impl<C> Default for LogSink<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> LogSink<C> {
    pub fn new() -> Self {
        Self::with_prefix("[CEP]")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            _marker: PhantomData,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl<C: Debug> ComplexEventSink<C> for LogSink<C> {
    fn publish(&self, event: C) -> Result<(), PatternFluxError> {
        log::info!("{} {:?}", self.prefix, event);
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "log"
    }
}
