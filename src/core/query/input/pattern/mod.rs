// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern matcher interface
//!
//! A matcher maps `(event, state)` to a [`MatchOutcome`]. It must be
//! deterministic and free of externally observable side effects: the same
//! matcher is shared by every partition of a stage and may be re-invoked
//! when a window is replayed.
//!
//! Plain closures are matchers:
//!
//! ```rust
//! use patternflux::{MatchOutcome, PatternMatcher};
//!
//! let threshold = |reading: &i64, sum: &i64| {
//!     let next = sum + reading;
//!     if next >= 10 {
//!         MatchOutcome::matched(next, next)
//!     } else {
//!         MatchOutcome::no_match(next)
//!     }
//! };
//! let outcome = threshold.apply(&7, &3).unwrap();
//! assert_eq!(outcome.result, Some(10));
//! ```

use crate::core::event::MatchOutcome;
use crate::core::exception::PatternFluxResult;

/// User-supplied detection function.
///
/// Fallible matchers implement this trait directly and return `Err`; the
/// detector propagates the error as a fatal fault of the activation.
pub trait PatternMatcher<R, S, C>: Send + Sync {
    fn apply(&self, event: &R, state: &S) -> PatternFluxResult<MatchOutcome<C, S>>;
}

impl<R, S, C, F> PatternMatcher<R, S, C> for F
where
    F: Fn(&R, &S) -> MatchOutcome<C, S> + Send + Sync,
{
    #[inline]
    fn apply(&self, event: &R, state: &S) -> PatternFluxResult<MatchOutcome<C, S>> {
        Ok(self(event, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::exception::PatternFluxError;
    use std::sync::Arc;

    struct RejectNegative;

    impl PatternMatcher<i64, i64, i64> for RejectNegative {
        fn apply(&self, event: &i64, state: &i64) -> PatternFluxResult<MatchOutcome<i64, i64>> {
            if *event < 0 {
                return Err(PatternFluxError::other(format!("negative reading {}", event)));
            }
            Ok(MatchOutcome::no_match(state + event))
        }
    }

    #[test]
    fn test_closure_is_matcher() {
        let matcher: Arc<dyn PatternMatcher<String, (), String>> =
            Arc::new(|event: &String, _: &()| {
                if event == "y" {
                    MatchOutcome::matched(format!("match({})", event), ())
                } else {
                    MatchOutcome::no_match(())
                }
            });

        let hit = matcher.apply(&"y".to_string(), &()).unwrap();
        assert_eq!(hit.result.as_deref(), Some("match(y)"));
        assert!(!matcher.apply(&"x".to_string(), &()).unwrap().is_match());
    }

    #[test]
    fn test_fallible_matcher() {
        let matcher = RejectNegative;
        assert_eq!(matcher.apply(&4, &1).unwrap().state, 5);
        assert!(matcher.apply(&-1, &1).is_err());
    }
}
