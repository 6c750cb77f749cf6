// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-partition window assembly
//!
//! Count windows fire as events arrive. Time windows use processing time and
//! fire from [`WindowBuffer::on_tick`]; the owner polls
//! [`WindowBuffer::next_deadline`] to know when to tick. Empty time windows
//! are never delivered.

use super::WindowConfig;
use crate::core::event::Window;
use crate::core::exception::PatternFluxResult;
use std::collections::VecDeque;
use std::time::Instant;

#[derive(Debug)]
pub struct WindowBuffer<R> {
    config: WindowConfig,
    events: VecDeque<(Instant, R)>,
    /// Events received since the last count-window firing
    since_last_fire: u64,
    next_fire: Option<Instant>,
    next_window_id: u64,
}

impl<R: Clone> WindowBuffer<R> {
    pub fn new(config: WindowConfig, now: Instant) -> PatternFluxResult<Self> {
        config.validate()?;
        let next_fire = config
            .is_time_based()
            .then(|| now + config.slide_duration());
        Ok(Self {
            config,
            events: VecDeque::new(),
            since_last_fire: 0,
            next_fire,
            next_window_id: 0,
        })
    }

    /// Add an event; returns a window if a count window fired.
    pub fn on_event(&mut self, event: R, now: Instant) -> Option<Window<R>> {
        self.events.push_back((now, event));

        match self.config {
            WindowConfig::TumblingCount { length } => {
                if self.events.len() as u64 >= length {
                    Some(self.drain_window())
                } else {
                    None
                }
            }
            WindowConfig::SlidingCount { length, slide } => {
                while self.events.len() as u64 > length {
                    self.events.pop_front();
                }
                self.since_last_fire += 1;
                if self.since_last_fire >= slide {
                    self.since_last_fire = 0;
                    Some(self.snapshot_window())
                } else {
                    None
                }
            }
            WindowConfig::TumblingTime { .. } | WindowConfig::SlidingTime { .. } => None,
        }
    }

    /// Advance processing time; returns a window if a time window fired.
    ///
    /// A late tick fires a single window and schedules the next firing after `now`.
    pub fn on_tick(&mut self, now: Instant) -> Option<Window<R>> {
        let next_fire = self.next_fire?;
        if now < next_fire {
            return None;
        }

        let slide = self.config.slide_duration();
        let mut upcoming = next_fire;
        while upcoming <= now {
            upcoming += slide;
        }
        self.next_fire = Some(upcoming);

        let window = match self.config {
            WindowConfig::TumblingTime { .. } => self.drain_window(),
            WindowConfig::SlidingTime { .. } => {
                self.evict_older_than(now);
                self.snapshot_window()
            }
            WindowConfig::TumblingCount { .. } | WindowConfig::SlidingCount { .. } => return None,
        };

        if window.is_empty() {
            None
        } else {
            Some(window)
        }
    }

    /// When the owner should call `on_tick` next; `None` for count windows
    #[inline]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_fire
    }

    /// Events currently buffered
    #[inline]
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    fn evict_older_than(&mut self, now: Instant) {
        let Some(cutoff) = now.checked_sub(self.config.length_duration()) else {
            return;
        };
        while matches!(self.events.front(), Some((arrived, _)) if *arrived <= cutoff) {
            self.events.pop_front();
        }
    }

    fn drain_window(&mut self) -> Window<R> {
        let events = self.events.drain(..).map(|(_, event)| event).collect();
        self.next_id(events)
    }

    fn snapshot_window(&mut self) -> Window<R> {
        let events = self.events.iter().map(|(_, event)| event.clone()).collect();
        self.next_id(events)
    }

    fn next_id(&mut self, events: Vec<R>) -> Window<R> {
        let window = Window::new(self.next_window_id, events);
        self.next_window_id += 1;
        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ids(windows: &[Window<u32>]) -> Vec<u64> {
        windows.iter().map(|w| w.window_id).collect()
    }

    #[test]
    fn test_tumbling_count() {
        let now = Instant::now();
        let mut buffer = WindowBuffer::new(WindowConfig::TumblingCount { length: 3 }, now).unwrap();

        let fired: Vec<_> = (1..=7).filter_map(|e| buffer.on_event(e, now)).collect();

        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].events(), &[1, 2, 3]);
        assert_eq!(fired[1].events(), &[4, 5, 6]);
        assert_eq!(ids(&fired), vec![0, 1]);
        assert_eq!(buffer.pending(), 1);
        assert_eq!(buffer.next_deadline(), None);
    }

    #[test]
    fn test_sliding_count_emits_partial_first_windows() {
        let now = Instant::now();
        let config = WindowConfig::SlidingCount { length: 3, slide: 2 };
        let mut buffer = WindowBuffer::new(config, now).unwrap();

        let fired: Vec<_> = (1..=6).filter_map(|e| buffer.on_event(e, now)).collect();

        assert_eq!(fired.len(), 3);
        assert_eq!(fired[0].events(), &[1, 2]);
        assert_eq!(fired[1].events(), &[2, 3, 4]);
        assert_eq!(fired[2].events(), &[4, 5, 6]);
    }

    #[test]
    fn test_tumbling_time() {
        let start = Instant::now();
        let mut buffer = WindowBuffer::new(WindowConfig::TumblingTime { length: 100 }, start).unwrap();
        assert_eq!(buffer.next_deadline(), Some(start + Duration::from_millis(100)));

        assert!(buffer.on_event(1, start).is_none());
        assert!(buffer.on_event(2, start + Duration::from_millis(40)).is_none());
        assert!(buffer.on_tick(start + Duration::from_millis(50)).is_none());

        let window = buffer.on_tick(start + Duration::from_millis(100)).unwrap();
        assert_eq!(window.events(), &[1, 2]);
        assert_eq!(buffer.pending(), 0);

        // Nothing arrived in the next period, nothing is delivered
        assert!(buffer.on_tick(start + Duration::from_millis(200)).is_none());
        assert_eq!(buffer.next_deadline(), Some(start + Duration::from_millis(300)));
    }

    #[test]
    fn test_sliding_time_evicts_expired_events() {
        let start = Instant::now();
        let config = WindowConfig::SlidingTime { length: 100, slide: 50 };
        let mut buffer = WindowBuffer::new(config, start).unwrap();

        buffer.on_event(1, start + Duration::from_millis(10));
        buffer.on_event(2, start + Duration::from_millis(40));
        let first = buffer.on_tick(start + Duration::from_millis(50)).unwrap();
        assert_eq!(first.events(), &[1, 2]);

        buffer.on_event(3, start + Duration::from_millis(90));
        let second = buffer.on_tick(start + Duration::from_millis(100)).unwrap();
        assert_eq!(second.events(), &[1, 2, 3]);

        let third = buffer.on_tick(start + Duration::from_millis(150)).unwrap();
        assert_eq!(third.events(), &[3]);
        assert_eq!(ids(&[first, second, third]), vec![0, 1, 2]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = WindowBuffer::<u32>::new(WindowConfig::SlidingCount { length: 2, slide: 5 }, Instant::now());
        assert!(result.is_err());
    }
}
