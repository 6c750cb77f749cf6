// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod output;

pub use self::output::{ChannelSink, CollectingSink, ComplexEventSink, LogSink};
