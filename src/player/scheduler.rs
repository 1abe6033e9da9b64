use std::time::Duration;

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_millis(5000);

/// How a progress write travels to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// regular request, the response is inspected
    Awaited,
    /// fire-and-forget, safe to issue while the session is being torn down
    BestEffort,
}

/// Decides whether an unforced sync may go out.
#[derive(Debug)]
pub struct SyncScheduler {
    interval_ms: i64,
    last_sync_ms: Option<i64>,
}

impl SyncScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: i64::try_from(interval.as_millis()).unwrap_or(i64::MAX),
            last_sync_ms: None,
        }
    }

    /// Returns true and records `now_ms` as the last sync when a sync may be sent.
    ///
    /// Forced syncs always pass. A clock that went backwards counts as due.
    pub fn try_begin(&mut self, now_ms: i64, force: bool) -> bool {
        if !force {
            if let Some(last) = self.last_sync_ms {
                let elapsed = now_ms - last;
                if (0..self.interval_ms).contains(&elapsed) {
                    return false;
                }
            }
        }
        self.last_sync_ms = Some(now_ms);
        true
    }

    pub fn reset(&mut self) {
        self.last_sync_ms = None;
    }

    #[cfg(test)]
    pub fn last_sync(&self) -> Option<i64> {
        self.last_sync_ms
    }
}

impl Default for SyncScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_INTERVAL)
    }
}
