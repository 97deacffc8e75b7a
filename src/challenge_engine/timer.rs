//! Timer service used for every deferred effect.
//!
//! Tasks are plain data; whoever owns the clock hands fired tasks back to
//! [`ChallengeSession::on_timer`](crate::ChallengeSession::on_timer).

use std::collections::BTreeMap;

use crate::challenge_engine::models::DeferredTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

pub trait TimerService {
    fn schedule_once(&mut self, delay_ms: u64, task: DeferredTask) -> TimerHandle;
    /// Cancelling an already fired or unknown handle is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Deterministic virtual clock. Tasks fire in deadline order; ties fire in
/// scheduling order.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now_ms: u64,
    next_handle: u64,
    queue: BTreeMap<(u64, TimerHandle), DeferredTask>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Remove and return the earliest task due at or before `until_ms`,
    /// moving the clock to its deadline.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<DeferredTask> {
        let (&(deadline, handle), _) = self.queue.iter().next()?;
        if deadline > until_ms {
            return None;
        }
        self.now_ms = self.now_ms.max(deadline);
        self.queue.remove(&(deadline, handle))
    }

    /// Move the clock forward without firing anything.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

impl TimerService for ManualTimer {
    fn schedule_once(&mut self, delay_ms: u64, task: DeferredTask) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.queue.insert((self.now_ms.saturating_add(delay_ms), handle), task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.queue.retain(|&(_, h), _| h != handle);
    }
}
