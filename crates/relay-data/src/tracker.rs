//! In-flight tracking for wrapped requests.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

use crate::transport::FetchError;

#[derive(Debug, Default)]
struct TrackerState {
    in_flight: AtomicUsize,
    failures: AtomicU64,
    last_error: Mutex<Option<FetchError>>,
}

/// Wraps requests with a shared loading indicator.
///
/// `loading()` is true while at least one wrapped request is outstanding.
/// Failures are logged, remembered as `last_error()` and turned into `None`
/// so callers never handle them a second time. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    state: Arc<TrackerState>,
}

/// Decrements the in-flight count when the wrapped request settles or is dropped.
struct InFlightGuard {
    state: Arc<TrackerState>,
}

impl InFlightGuard {
    fn enter(state: Arc<TrackerState>) -> Self {
        state.in_flight.fetch_add(1, Ordering::SeqCst);
        Self { state }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RequestTracker {
    /// Create a new tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any wrapped request is outstanding.
    pub fn loading(&self) -> bool {
        self.in_flight() > 0
    }

    /// Number of outstanding wrapped requests.
    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Total number of failed requests.
    pub fn failures(&self) -> u64 {
        self.state.failures.load(Ordering::Relaxed)
    }

    /// The most recent failure, if any.
    pub fn last_error(&self) -> Option<FetchError> {
        self.state
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run a request, marking it in flight until it settles.
    ///
    /// The in-flight count is raised as soon as this is called, before the
    /// returned future is first polled.
    pub fn run<T, Fut>(&self, request: Fut) -> impl Future<Output = Option<T>>
    where
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let state = Arc::clone(&self.state);
        let guard = InFlightGuard::enter(Arc::clone(&state));
        async move {
            let outcome = request.await;
            drop(guard);
            match outcome {
                Ok(value) => Some(value),
                Err(e) => {
                    error!(error = %e, "request failed");
                    state.failures.fetch_add(1, Ordering::Relaxed);
                    *state.last_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(e);
                    None
                }
            }
        }
    }
}
