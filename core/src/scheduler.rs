use alloc::collections::BTreeMap;
use alloc::string::String;
use core::time::Duration;

use crate::*;

/// Deferred work the state machine asked for; the scheduler only hands it back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScheduledAction {
    Cue(Cue),
    CardCue { name: String, defeat: bool },
    /// Finishes a lost game: score drops to 0 and the outcome becomes visible.
    CommitLoss,
    ClearLastResult,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DueTimer {
    pub id: TimerId,
    pub session: SessionId,
    pub action: ScheduledAction,
}

/// Session-tagged, cancelable timers on a logical clock.
///
/// The clock only moves through [`FeedbackScheduler::advance`]; timers due at
/// the same instant fire in the order they were scheduled.
#[derive(Clone, Debug, Default)]
pub struct FeedbackScheduler {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<(Duration, TimerId), (SessionId, ScheduledAction)>,
}

impl FeedbackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn pending_for(&self, session: SessionId) -> usize {
        self.timers
            .values()
            .filter(|(owner, _)| *owner == session)
            .count()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.first_key_value().map(|((deadline, _), _)| *deadline)
    }

    pub fn schedule(
        &mut self,
        session: SessionId,
        delay: Duration,
        action: ScheduledAction,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now.saturating_add(delay);
        log::trace!("timer {:?} for session {} at {:?}: {:?}", id, session, deadline, action);
        self.timers.insert((deadline, id), (session, action));
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|(_, timer), _| *timer != id);
        self.timers.len() != before
    }

    /// Drops every timer owned by `session`; returns how many were removed.
    pub fn cancel_session(&mut self, session: SessionId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, (owner, _)| *owner != session);
        let canceled = before - self.timers.len();
        if canceled > 0 {
            log::debug!("canceled {} timer(s) of session {}", canceled, session);
        }
        canceled
    }

    pub fn cancel_all(&mut self) -> usize {
        let canceled = self.timers.len();
        self.timers.clear();
        canceled
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.now = self.now.saturating_add(elapsed);
    }

    /// Removes and returns the earliest timer whose deadline has passed.
    pub fn pop_due(&mut self) -> Option<DueTimer> {
        let deadline = self.next_deadline()?;
        if deadline > self.now {
            return None;
        }
        let ((_, id), (session, action)) = self.timers.pop_first()?;
        Some(DueTimer {
            id,
            session,
            action,
        })
    }
}
