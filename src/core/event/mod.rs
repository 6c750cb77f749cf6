// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event-side data model: window batches and pattern match outcomes.

/// An ordered, finite batch of events delivered for one window activation.
///
/// `window_id` increases monotonically per window source. The detector reads
/// the events once and does not retain the window.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<R> {
    pub window_id: u64,
    events: Vec<R>,
}

impl<R> Window<R> {
    pub fn new(window_id: u64, events: Vec<R>) -> Self {
        Self { window_id, events }
    }

    #[inline]
    pub fn events(&self) -> &[R] {
        &self.events
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<R> {
        self.events
    }
}

/// Outcome of evaluating one event against a state.
///
/// `result` is the derived complex event; `None` is the "no match" sentinel.
/// `state` is the state the matcher proposes for the next event. It is only
/// adopted when there is no match, and only in break-on-first-match mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome<C, S> {
    pub result: Option<C>,
    pub state: S,
}

impl<C, S> MatchOutcome<C, S> {
    pub fn matched(result: C, state: S) -> Self {
        Self {
            result: Some(result),
            state,
        }
    }

    pub fn no_match(state: S) -> Self {
        Self {
            result: None,
            state,
        }
    }

    #[inline]
    pub fn is_match(&self) -> bool {
        self.result.is_some()
    }

    pub fn into_parts(self) -> (Option<C>, S) {
        (self.result, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_outcome_sentinel() {
        let hit: MatchOutcome<&str, u32> = MatchOutcome::matched("alert", 7);
        let miss: MatchOutcome<&str, u32> = MatchOutcome::no_match(8);

        assert!(hit.is_match());
        assert!(!miss.is_match());
        assert_eq!(miss.into_parts(), (None, 8));
    }

    #[test]
    fn test_window_accessors() {
        let window = Window::new(4, vec![1, 2, 3]);
        assert_eq!(window.len(), 3);
        assert!(!window.is_empty());
        assert_eq!(window.events(), &[1, 2, 3]);
        assert_eq!(window.into_events(), vec![1, 2, 3]);
    }
}
