// Wall-clock ceilings for the bounded wait / ride loops.
use std::time::Duration;

use tokio::time::Instant;

use crate::errors::{EfClawError, EfClawResult};

pub struct Deadline {
    limit: Duration,
    start: Instant,
}

impl Deadline {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() > self.limit
    }

    /// `Timeout` naming `what` once the limit has passed.
    pub fn check(&self, what: &str) -> EfClawResult<()> {
        if self.is_expired() {
            tracing::warn!(
                what,
                elapsed = ?self.elapsed(),
                limit = ?self.limit,
                "deadline exceeded"
            );
            return Err(EfClawError::Timeout(format!("{what} exceeded {:?}", self.limit)));
        }
        Ok(())
    }
}
