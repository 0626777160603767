//! Source of "today" for date-relative predicates.

use time::{Date, OffsetDateTime};

/// Supplies the current calendar date.
pub trait Clock: Send + Sync {
    /// Today's date in the user's calendar.
    fn today(&self) -> Date;
}

/// Wall clock in the local offset, falling back to UTC when the offset is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
            .date()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}
