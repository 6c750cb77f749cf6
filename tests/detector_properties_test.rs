// SPDX-License-Identifier: MIT OR Apache-2.0

//! Behavioural properties of the windowed pattern detector in both modes.

use patternflux::{
    CollectingSink, DetectionMode, MatchOutcome, PatternFluxError, PatternFluxResult,
    PatternMatcher, WindowedPatternDetector,
};
use std::sync::{Arc, Mutex};

/// Matcher that records every event it is invoked on
#[derive(Clone)]
struct RecordingMatcher {
    invoked: Arc<Mutex<Vec<i64>>>,
    threshold: i64,
}

impl RecordingMatcher {
    fn new(threshold: i64) -> Self {
        Self {
            invoked: Arc::new(Mutex::new(Vec::new())),
            threshold,
        }
    }

    fn invoked(&self) -> Vec<i64> {
        self.invoked.lock().unwrap().clone()
    }
}

impl PatternMatcher<i64, i64, String> for RecordingMatcher {
    fn apply(&self, event: &i64, sum: &i64) -> PatternFluxResult<MatchOutcome<String, i64>> {
        self.invoked.lock().unwrap().push(*event);
        let next = sum + event;
        if next >= self.threshold {
            Ok(MatchOutcome::matched(format!("sum={}", next), next))
        } else {
            Ok(MatchOutcome::no_match(next))
        }
    }
}

fn detector(
    mode: DetectionMode,
    matcher: RecordingMatcher,
) -> (WindowedPatternDetector<i64, i64, String>, CollectingSink<String>) {
    let sink = CollectingSink::new();
    let detector = WindowedPatternDetector::builder()
        .name("properties")
        .mode(mode)
        .initial_state(0)
        .pattern_matcher(matcher)
        .sink(sink.clone())
        .build()
        .expect("detector should build");
    (detector, sink)
}

#[test]
fn break_on_first_match_never_evaluates_events_after_the_match() {
    let matcher = RecordingMatcher::new(10);
    let (mut detector, sink) = detector(DetectionMode::BreakOnFirstMatch, matcher.clone());

    let emitted = detector.execute_window(&[1, 2, 8, 50, 60]).unwrap();

    assert_eq!(emitted, 1);
    assert_eq!(sink.collected(), vec!["sum=11".to_string()]);
    assert_eq!(matcher.invoked(), vec![1, 2, 8]);
}

#[test]
fn break_on_first_match_folds_state_across_windows() {
    let matcher = RecordingMatcher::new(100);
    let (mut detector, sink) = detector(DetectionMode::BreakOnFirstMatch, matcher);

    let batches: [&[i64]; 3] = [&[5, 10], &[20], &[1, 2, 3]];
    for batch in batches {
        assert_eq!(detector.execute_window(batch).unwrap(), 0);
    }

    assert!(sink.is_empty());
    assert_eq!(*detector.state(), 41);
    assert_eq!(detector.stats().windows_without_match, 3);
}

#[test]
fn break_on_first_match_keeps_pre_match_state() {
    let matcher = RecordingMatcher::new(10);
    let (mut detector, _sink) = detector(DetectionMode::BreakOnFirstMatch, matcher);

    detector.execute_window(&[4, 3, 9, 1]).unwrap();

    // 4 + 3 = 7 before the matching event; the 16 returned with the match is discarded
    assert_eq!(*detector.state(), 7);
}

#[test]
fn evaluate_all_scans_every_event_against_initial_state() {
    let matcher = RecordingMatcher::new(10);
    let (mut detector, sink) = detector(DetectionMode::EvaluateAll, matcher.clone());

    let emitted = detector.execute_window(&[12, 4, 10, 9, 30]).unwrap();

    assert_eq!(emitted, 3);
    assert_eq!(
        sink.collected(),
        vec!["sum=12".to_string(), "sum=10".to_string(), "sum=30".to_string()]
    );
    assert_eq!(matcher.invoked(), vec![12, 4, 10, 9, 30]);
    assert_eq!(*detector.state(), 0);
}

#[test]
fn evaluate_all_string_scenario() {
    let invoked = Arc::new(Mutex::new(Vec::new()));
    let invoked_clone = Arc::clone(&invoked);
    let sink = CollectingSink::new();
    let mut detector = WindowedPatternDetector::builder()
        .mode(DetectionMode::EvaluateAll)
        .initial_state("START".to_string())
        .pattern_matcher(move |event: &&str, state: &String| {
            invoked_clone.lock().unwrap().push(event.to_string());
            if *event == "y" {
                MatchOutcome::matched(format!("match({})", event), state.clone())
            } else {
                MatchOutcome::no_match(format!("{}:{}", state, event))
            }
        })
        .sink(sink.clone())
        .build()
        .unwrap();

    detector.execute_window(&["x", "y", "z"]).unwrap();

    assert_eq!(sink.collected(), vec!["match(y)".to_string()]);
    assert_eq!(detector.state(), "START");
    assert_eq!(*invoked.lock().unwrap(), vec!["x", "y", "z"]);
}

#[test]
fn replaying_a_window_is_deterministic() {
    let batches: [&[i64]; 3] = [&[3, 4], &[2, 9, 1], &[6]];

    let run = || {
        let (mut detector, sink) =
            detector(DetectionMode::BreakOnFirstMatch, RecordingMatcher::new(10));
        for batch in batches {
            detector.execute_window(batch).unwrap();
        }
        (sink.collected(), *detector.state(), detector.stats())
    };

    assert_eq!(run(), run());
}

#[test]
fn matcher_fault_is_fatal_for_the_activation() {
    struct Unreliable;

    impl PatternMatcher<i64, i64, String> for Unreliable {
        fn apply(&self, event: &i64, _: &i64) -> PatternFluxResult<MatchOutcome<String, i64>> {
            if *event == 0 {
                Err(PatternFluxError::other("division by zero"))
            } else {
                Ok(MatchOutcome::matched(format!("ok {}", event), 0))
            }
        }
    }

    let sink = CollectingSink::new();
    let mut detector = WindowedPatternDetector::builder()
        .mode(DetectionMode::EvaluateAll)
        .initial_state(0i64)
        .pattern_matcher(Unreliable)
        .sink(sink.clone())
        .build()
        .unwrap();

    let err = detector.execute_window(&[1, 0, 2]).unwrap_err();

    assert!(matches!(
        err,
        PatternFluxError::PatternMatcherFault { event_index: 1, .. }
    ));
    // Emissions before the fault already left the detector
    assert_eq!(sink.collected(), vec!["ok 1".to_string()]);
}
