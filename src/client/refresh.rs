//! Deduplication of credential refreshes.
//!
//! Any number of requests may hit a 401 at the same time. The first one to
//! report it leads a single refresh; the others queue behind it and are
//! released together, first-blocked-first, once the leader settles. A 401
//! that arrives after a refresh already settled reuses that outcome.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::debug;

use super::error::RefreshFailure;

pub type RefreshOutcome = Result<(), RefreshFailure>;

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    /// Number of refreshes that have settled so far, whatever their outcome.
    generation: u64,
    /// Outcome of the most recently settled refresh.
    last: Option<RefreshOutcome>,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// What a request that just received a 401 should do next.
pub enum Ticket<'a> {
    /// Credentials were renewed after the request went out; retry it as is.
    Renewed,
    /// A refresh settled after the request went out and failed. The session
    /// is already gone; report it without refreshing again.
    Expired(RefreshFailure),
    /// No refresh is running: the caller performs it and settles the lease.
    Lead(RefreshLease<'a>),
    /// A refresh is running: wait for its outcome, then retry.
    Wait(oneshot::Receiver<RefreshOutcome>),
}

#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        // The state is only ever mutated in single, non-panicking steps.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generation to stamp on an outgoing request.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock().in_flight
    }

    /// Registers a 401 observed by a request sent at `sent_generation`.
    pub fn join(&self, sent_generation: u64) -> Ticket<'_> {
        let mut state = self.lock();
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            debug!(
                event_name = "session.refresh.queued",
                event_domain = "session",
                waiting = state.waiters.len(),
                "request queued behind in-flight refresh"
            );
            return Ticket::Wait(rx);
        }

        if state.generation != sent_generation {
            // The request carried credentials that a settled refresh has
            // already dealt with.
            match &state.last {
                Some(Err(failure)) => return Ticket::Expired(failure.clone()),
                Some(Ok(())) => return Ticket::Renewed,
                None => {}
            }
        }

        state.in_flight = true;
        Ticket::Lead(RefreshLease {
            coordinator: self,
            settled: false,
        })
    }

    /// Clears the flag and releases every waiter in one critical section,
    /// in the order they queued. `None` means the leader went away; dropping
    /// the senders tells waiters so.
    fn finish(&self, outcome: Option<RefreshOutcome>) -> usize {
        let mut state = self.lock();
        state.in_flight = false;
        let waiters = std::mem::take(&mut state.waiters);
        let released = waiters.len();

        match outcome {
            Some(outcome) => {
                state.generation += 1;
                state.last = Some(outcome.clone());
                for waiter in waiters {
                    // A waiter whose caller was dropped has nobody to tell.
                    let _ = waiter.send(outcome.clone());
                }
            }
            None => drop(waiters),
        }
        released
    }
}

/// Held by the task performing the refresh. Dropping it unsettled releases
/// the in-flight flag so the coordinator never wedges.
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// Publishes the refresh outcome; returns how many waiters were released.
    pub fn settle(mut self, outcome: RefreshOutcome) -> usize {
        self.settled = true;
        self.coordinator.finish(Some(outcome))
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.finish(None);
        }
    }
}
