//! Time source and the gateway's `signed-date` format.

use std::fmt::{Display, Formatter};

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::error::ClientError;

const SIGNED_DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year repr:last_two][month][day]T[hour][minute][second]Z");

/// Supplies the instant used to stamp outbound requests.
pub trait ClockSource: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock pinned to a single instant, for reproducible signatures in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(OffsetDateTime);

impl FixedClock {
    pub const fn new(instant: OffsetDateTime) -> Self {
        Self(instant)
    }
}

impl ClockSource for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Timestamp rendered as `yyMMddTHHmmssZ` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedDate(String);

impl SignedDate {
    /// Converts to UTC first, so callers may pass an instant in any offset.
    pub fn from_datetime(instant: OffsetDateTime) -> Result<Self, ClientError> {
        instant
            .to_offset(UtcOffset::UTC)
            .format(SIGNED_DATE_FORMAT)
            .map(Self)
            .map_err(|error| {
                ClientError::Encoding(format!("failed to format signed-date: {error}"))
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SignedDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
