//! Single-slot debounce timer.
//!
//! # Invariants
//! - At most one scheduled deadline exists; `arm` replaces the previous one.
//! - `expired` is cancel-safe: dropping it keeps the schedule intact.

use std::future;
use std::pin::Pin;
use tokio::time::{sleep_until, Instant, Sleep};

#[derive(Debug, Default)]
pub struct DebounceTimer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels any pending schedule, then schedules `deadline`.
    pub fn arm(&mut self, deadline: Instant) {
        self.sleep = Some(Box::pin(sleep_until(deadline)));
    }

    pub fn cancel(&mut self) {
        self.sleep = None;
    }

    pub fn is_armed(&self) -> bool {
        self.sleep.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.sleep.as_ref().map(|sleep| sleep.deadline())
    }

    /// Resolves when the armed deadline passes; pends forever while unarmed.
    pub async fn expired(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => {
                sleep.as_mut().await;
                self.sleep = None;
            }
            None => future::pending::<()>().await,
        }
    }
}
