//! Wall-clock instants for connection bookkeeping.

use chrono::{DateTime, Duration, Utc};

/// A UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Signed time from `earlier` to `self`.
    pub fn duration_since(&self, earlier: &Timestamp) -> Duration {
        self.0.signed_duration_since(earlier.0)
    }

    /// Whole seconds elapsed since this instant, clamped at zero.
    pub fn elapsed_secs(&self) -> u64 {
        u64::try_from(Timestamp::now().duration_since(self).num_seconds()).unwrap_or(0)
    }
}
