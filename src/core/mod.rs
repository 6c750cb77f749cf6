// SPDX-License-Identifier: MIT OR Apache-2.0

// src/core/mod.rs

pub mod config;
pub mod event;
pub mod exception; // Error taxonomy shared by every component
pub mod partition; // Topology binding and partitioned local execution
pub mod query;
pub mod stream;
pub mod window;

pub use self::exception::{PatternFluxError, PatternFluxResult};
