//! The reference instant every relative expression is resolved against.
//!
//! The engine never reads the system clock: the caller supplies "now" (and
//! the timezone the text was written in) for each parse call. The value is
//! immutable; extractors only read from it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::WhenError;

/// A point in time plus the timezone used to read local calendar fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReferenceInstant {
    instant: DateTime<Utc>,
    #[serde(serialize_with = "serialize_tz")]
    timezone: Tz,
}

impl ReferenceInstant {
    pub fn new(instant: DateTime<Utc>, timezone: Tz) -> Self {
        Self { instant, timezone }
    }

    /// A reference read in UTC.
    pub fn utc(instant: DateTime<Utc>) -> Self {
        Self::new(instant, Tz::UTC)
    }

    /// Build a reference from an RFC 3339 datetime and an IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns [`WhenError::InvalidDatetime`] if the datetime cannot be parsed,
    /// or [`WhenError::InvalidTimezone`] if the timezone is not a valid IANA name.
    ///
    /// # Examples
    ///
    /// ```
    /// use when_engine::ReferenceInstant;
    ///
    /// let reference = ReferenceInstant::parse("2012-08-10T12:00:00Z", "Europe/Stockholm").unwrap();
    /// assert_eq!(reference.local_datetime().to_string(), "2012-08-10 14:00:00");
    /// ```
    pub fn parse(datetime: &str, timezone: &str) -> Result<Self, WhenError> {
        Ok(Self::new(parse_rfc3339(datetime)?, parse_timezone(timezone)?))
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn local(&self) -> DateTime<Tz> {
        self.instant.with_timezone(&self.timezone)
    }

    pub fn local_datetime(&self) -> NaiveDateTime {
        self.local().naive_local()
    }

    pub fn date(&self) -> NaiveDate {
        self.local_datetime().date()
    }

    pub fn time(&self) -> NaiveTime {
        self.local_datetime().time()
    }

    pub fn hour(&self) -> u32 {
        self.local_datetime().hour()
    }

    /// UTC offset at the reference instant, in minutes east of UTC.
    pub fn timezone_offset_minutes(&self) -> i32 {
        self.local().offset().fix().local_minus_utc() / 60
    }
}

fn serialize_tz<S: serde::Serializer>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(tz.name())
}

/// Parse an RFC 3339 datetime string into `DateTime<Utc>`.
fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, WhenError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| WhenError::InvalidDatetime(format!("'{}': {}", s, e)))
}

/// Parse an IANA timezone string into `Tz`.
fn parse_timezone(s: &str) -> Result<Tz, WhenError> {
    s.parse::<Tz>()
        .map_err(|_| WhenError::InvalidTimezone(format!("'{}'", s)))
}
