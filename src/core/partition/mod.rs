// SPDX-License-Identifier: MIT OR Apache-2.0

//! Partitioned execution of complex event detection
//!
//! A [`CepStage`] binds one detector per partition behind a grouping
//! strategy. Partitions share no state; a pattern whose events are routed to
//! different partitions is not detected.

pub mod cep_stage;
pub mod grouping;

pub use cep_stage::{CepStage, CepStageBuilder, CepStageHandle};
pub use grouping::GroupingStrategy;
