//! Process-wide schema conflict backoff
//!
//! Clients retrying an optimistic-lock conflict wait this long between
//! attempts. Tests shrink it with an override guard. The newest live guard
//! wins; once every guard is dropped the default applies again, whatever
//! order the guards were dropped in.

use crate::config::types::DEFAULT_SCHEMA_CONFLICT_BACKOFF_MS;
use once_cell::sync::Lazy;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug)]
struct BackoffState {
    default: Duration,
    /// Live overrides in creation order, keyed by guard id
    overrides: Vec<(u64, Duration)>,
    next_id: u64,
}

impl BackoffState {
    fn current(&self) -> Duration {
        self.overrides
            .last()
            .map(|(_, backoff)| *backoff)
            .unwrap_or(self.default)
    }
}

static SCHEMA_CONFLICT_BACKOFF: Lazy<Mutex<BackoffState>> = Lazy::new(|| {
    Mutex::new(BackoffState {
        default: Duration::from_millis(DEFAULT_SCHEMA_CONFLICT_BACKOFF_MS),
        overrides: Vec::new(),
        next_id: 0,
    })
});

fn state() -> MutexGuard<'static, BackoffState> {
    SCHEMA_CONFLICT_BACKOFF
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Current delay between conflict retries
pub fn schema_conflict_backoff() -> Duration {
    state().current()
}

/// Replace the conflict backoff until the returned guard is dropped
#[must_use = "the override is removed when the guard is dropped"]
pub fn override_schema_conflict_backoff(backoff: Duration) -> BackoffOverride {
    let mut state = state();
    let id = state.next_id;
    state.next_id += 1;
    state.overrides.push((id, backoff));
    tracing::debug!(?backoff, live = state.overrides.len(), "schema conflict backoff overridden");
    BackoffOverride { id }
}

/// Removes its schema conflict backoff override on drop
#[derive(Debug)]
pub struct BackoffOverride {
    id: u64,
}

impl Drop for BackoffOverride {
    fn drop(&mut self) {
        let mut state = state();
        state.overrides.retain(|(id, _)| *id != self.id);
        tracing::debug!(current = ?state.current(), "schema conflict backoff override removed");
    }
}
