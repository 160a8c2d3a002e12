//! Time source for ledger writes and read freshness tokens.

use chrono::{DateTime, NaiveDate, Utc};

/// Source of "now" for the ledger client and the submitter.
///
/// New purchases and transfers are dated with [`Clock::today`]; read
/// requests embed [`Clock::unix_millis`] in their `_ts` token.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// `purchase_date` / `transaction_date` for a submission: the UTC
    /// calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Millisecond prefix of the cache-busting token.
    fn unix_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Pins submission dates and cache tokens to one instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
