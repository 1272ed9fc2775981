//! Test utilities for map matchers.
//!
//! This module provides [`StubMapMatcher`], a deterministic test double for
//! [`MapMatcher`] that returns pre-configured outcomes without making HTTP
//! requests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use trailsnap_core::{MapMatcher, MatchError, MatchRequest, MatchedRoute};

/// Stub `MapMatcher` for testing.
///
/// Outcomes are served in the order they were queued; the last one repeats
/// for every further call. Each outcome may carry a delay, measured on the
/// tokio clock, so tests can make an early request finish after a later one.
/// Clones share the queue and the request log.
#[derive(Debug, Clone)]
pub struct StubMapMatcher {
    state: Arc<Mutex<StubState>>,
}

#[derive(Debug)]
struct StubState {
    replies: VecDeque<StubReply>,
    requests: Vec<MatchRequest>,
}

#[derive(Debug, Clone)]
struct StubReply {
    outcome: Result<MatchedRoute, MatchError>,
    delay: Duration,
}

impl StubMapMatcher {
    fn with_outcome(outcome: Result<MatchedRoute, MatchError>) -> Self {
        let mut replies = VecDeque::new();
        replies.push_back(StubReply {
            outcome,
            delay: Duration::ZERO,
        });
        Self {
            state: Arc::new(Mutex::new(StubState {
                replies,
                requests: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(self, outcome: Result<MatchedRoute, MatchError>) -> Self {
        self.lock().replies.push_back(StubReply {
            outcome,
            delay: Duration::ZERO,
        });
        self
    }

    /// Create a matcher that returns `route`.
    #[must_use]
    pub fn with_route(route: MatchedRoute) -> Self {
        Self::with_outcome(Ok(route))
    }

    /// Create a matcher that returns `error`.
    #[must_use]
    pub fn with_error(error: MatchError) -> Self {
        Self::with_outcome(Err(error))
    }

    /// Queue `route` after the outcomes configured so far.
    #[must_use]
    pub fn then_route(self, route: MatchedRoute) -> Self {
        self.push(Ok(route))
    }

    /// Queue `error` after the outcomes configured so far.
    #[must_use]
    pub fn then_error(self, error: MatchError) -> Self {
        self.push(Err(error))
    }

    /// Delay the most recently queued outcome by `delay`.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        if let Some(reply) = self.lock().replies.back_mut() {
            reply.delay = delay;
        }
        self
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<MatchRequest> {
        self.lock().requests.clone()
    }

    fn next_reply(&self, request: &MatchRequest) -> Option<StubReply> {
        let mut state = self.lock();
        state.requests.push(request.clone());
        if state.replies.len() > 1 {
            state.replies.pop_front()
        } else {
            state.replies.front().cloned()
        }
    }
}

#[async_trait]
impl MapMatcher for StubMapMatcher {
    async fn match_path(&self, request: &MatchRequest) -> Result<MatchedRoute, MatchError> {
        let reply = self.next_reply(request).ok_or(MatchError::NoMatchings)?;
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, LineString};
    use rstest::{fixture, rstest};
    use trailsnap_core::{DrawnPath, Profile};

    #[fixture]
    fn request() -> MatchRequest {
        let path = DrawnPath::new(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }])
            .expect("valid path");
        MatchRequest::new(path, Profile::Driving)
    }

    fn route(secs: u64) -> MatchedRoute {
        MatchedRoute::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]),
            Duration::from_secs(secs),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn last_outcome_repeats(request: MatchRequest) {
        let matcher = StubMapMatcher::with_route(route(10)).then_route(route(20));

        let first = matcher.match_path(&request).await.expect("first");
        let second = matcher.match_path(&request).await.expect("second");
        let third = matcher.match_path(&request).await.expect("third");

        assert_eq!(first.duration, Duration::from_secs(10));
        assert_eq!(second.duration, Duration::from_secs(20));
        assert_eq!(third.duration, Duration::from_secs(20));
    }

    #[rstest]
    #[tokio::test]
    async fn with_error_returns_configured_error(request: MatchRequest) {
        let matcher = StubMapMatcher::with_error(MatchError::Network {
            url: "http://example.com".to_owned(),
            message: "connection refused".to_owned(),
        });

        let err = matcher.match_path(&request).await.expect_err("should fail");

        assert!(matches!(err, MatchError::Network { .. }));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn delayed_outcome_waits_on_tokio_clock(request: MatchRequest) {
        let matcher = StubMapMatcher::with_route(route(1)).with_delay(Duration::from_secs(5));
        let started = tokio::time::Instant::now();

        matcher.match_path(&request).await.expect("route");

        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[rstest]
    #[tokio::test]
    async fn clones_share_request_log(request: MatchRequest) {
        let matcher = StubMapMatcher::with_route(route(1));
        let observer = matcher.clone();

        matcher.match_path(&request).await.expect("route");

        assert_eq!(observer.requests(), vec![request]);
    }
}
