//! Bounded FIFO of closed traces awaiting export.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::Notify;
use tracing::warn;

use super::settings::BackpressurePolicy;
use super::stats::PipelineCounters;
use crate::observability::domain::{ObservabilityError, TraceRecord};

/// Bounded queue shared by request threads (producers) and the export
/// worker (single consumer).
///
/// Producers never wait on the exporter; they only ever contend on the
/// queue mutex. The `Block` policy may park a producer for at most the
/// configured block timeout. On a multi-thread runtime the wait runs under
/// `block_in_place` so the export worker keeps making progress; on a
/// current-thread runtime the worker cannot run while the producer waits,
/// so `Block` gives up at once, behaving like `RejectNew`.
#[derive(Debug)]
pub(super) struct ExportQueue {
    state: Mutex<QueueState>,
    space: Condvar,
    ready: Notify,
    drained: Notify,
    capacity: usize,
    policy: BackpressurePolicy,
    block_timeout: Duration,
    counters: Arc<PipelineCounters>,
}

#[derive(Debug, Default)]
struct QueueState {
    records: VecDeque<TraceRecord>,
    in_flight: usize,
}

impl QueueState {
    fn is_idle(&self) -> bool {
        self.records.is_empty() && self.in_flight == 0
    }
}

impl ExportQueue {
    pub(super) fn new(
        capacity: usize,
        policy: BackpressurePolicy,
        block_timeout: Duration,
        counters: Arc<PipelineCounters>,
    ) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            space: Condvar::new(),
            ready: Notify::new(),
            drained: Notify::new(),
            capacity: capacity.max(1),
            policy,
            block_timeout,
            counters,
        }
    }

    // Queue contents stay consistent across a panicking holder: every
    // mutation is a single push or pop.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies the backpressure policy before a new trace is opened.
    pub(super) fn admit(&self) -> Result<(), ObservabilityError> {
        let mut state = self.lock();
        if state.records.len() < self.capacity {
            return Ok(());
        }
        match self.policy {
            BackpressurePolicy::DropOldest => {
                self.evict_oldest(&mut state);
                Ok(())
            }
            BackpressurePolicy::RejectNew => Err(self.queue_full()),
            BackpressurePolicy::Block => {
                let guard = self.wait_for_space(state);
                if guard.records.len() < self.capacity {
                    Ok(())
                } else {
                    Err(self.queue_full())
                }
            }
        }
    }

    /// Enqueues a closed trace, applying the backpressure policy when full.
    pub(super) fn push(&self, record: TraceRecord) {
        let mut state = self.lock();
        if state.records.len() >= self.capacity {
            match self.policy {
                BackpressurePolicy::DropOldest => self.evict_oldest(&mut state),
                BackpressurePolicy::RejectNew => {
                    self.discard(&record);
                    return;
                }
                BackpressurePolicy::Block => {
                    state = self.wait_for_space(state);
                    if state.records.len() >= self.capacity {
                        self.discard(&record);
                        return;
                    }
                }
            }
        }
        state.records.push_back(record);
        drop(state);
        self.ready.notify_one();
    }

    /// Takes the oldest trace and marks it in flight.
    pub(super) fn pop(&self) -> Option<TraceRecord> {
        let mut state = self.lock();
        let record = state.records.pop_front()?;
        state.in_flight += 1;
        drop(state);
        self.space.notify_one();
        Some(record)
    }

    /// Marks a popped trace as finished, exported or not.
    pub(super) fn complete(&self) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        let idle = state.is_idle();
        drop(state);
        if idle {
            self.drained.notify_waiters();
        }
    }

    /// Removes every queued trace, counting each as dropped.
    pub(super) fn abandon_all(&self) -> usize {
        let mut state = self.lock();
        let abandoned = state.records.len();
        state.records.clear();
        let idle = state.is_idle();
        drop(state);
        for _ in 0..abandoned {
            self.counters.record_dropped();
        }
        self.space.notify_all();
        if idle {
            self.drained.notify_waiters();
        }
        abandoned
    }

    pub(super) fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub(super) fn is_idle(&self) -> bool {
        self.lock().is_idle()
    }

    /// Resolves when a trace has been queued since the last wake-up.
    pub(super) async fn ready(&self) {
        self.ready.notified().await;
    }

    /// Resolves once no trace is queued or in flight.
    pub(super) async fn wait_drained(&self) {
        loop {
            let mut drained = std::pin::pin!(self.drained.notified());
            drained.as_mut().enable();
            if self.is_idle() {
                return;
            }
            drained.await;
        }
    }

    /// Parks the caller until the queue has room or the block timeout
    /// elapses, returning the reacquired guard.
    fn wait_for_space<'a>(
        &'a self,
        state: MutexGuard<'a, QueueState>,
    ) -> MutexGuard<'a, QueueState> {
        let flavor = Handle::try_current().ok().map(|handle| handle.runtime_flavor());
        match flavor {
            None => self.park(state),
            Some(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(|| self.park(state)),
            Some(_) => {
                warn!(
                    capacity = self.capacity,
                    "export queue full on a current-thread runtime, not waiting"
                );
                state
            }
        }
    }

    fn park<'a>(&'a self, state: MutexGuard<'a, QueueState>) -> MutexGuard<'a, QueueState> {
        self.space
            .wait_timeout_while(state, self.block_timeout, |s| {
                s.records.len() >= self.capacity
            })
            .unwrap_or_else(PoisonError::into_inner)
            .0
    }

    fn evict_oldest(&self, state: &mut QueueState) {
        if let Some(evicted) = state.records.pop_front() {
            self.counters.record_dropped();
            warn!(
                trace_id = %evicted.trace_id,
                capacity = self.capacity,
                "export queue full, dropped oldest trace"
            );
        }
    }

    fn discard(&self, record: &TraceRecord) {
        self.counters.record_dropped();
        warn!(
            trace_id = %record.trace_id,
            capacity = self.capacity,
            policy = %self.policy,
            "export queue full, dropped closed trace"
        );
    }

    fn queue_full(&self) -> ObservabilityError {
        self.counters.record_rejected();
        ObservabilityError::QueueFull {
            capacity: self.capacity,
        }
    }
}
