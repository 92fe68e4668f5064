use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical calendar-day key: one `YYYY-MM-DD` day in the viewer's
/// local time, or the `Invalid` sentinel for records whose date could
/// not be understood.
///
/// `Invalid` orders before every real day, matches no day and never
/// matches "today". A corrupt record degrades to it instead of failing
/// the whole computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateKey {
    Invalid,
    Day(NaiveDate),
}

impl DateKey {
    /// Normalize a date string of unknown shape.
    ///
    /// An already-canonical `YYYY-MM-DD` is taken as that calendar day
    /// with no timezone reinterpretation. Anything carrying a
    /// time-of-day (`T` or space separated) is cut at the first
    /// separator and the date portion normalized. Everything else is
    /// `Invalid`, including canonical-shaped strings naming an
    /// impossible day.
    pub fn from_text(input: &str) -> Self {
        let trimmed = input.trim();
        let date_part = trimmed
            .split_once(['T', ' '])
            .map_or(trimmed, |(head, _)| head);
        match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            Ok(day) => Self::Day(day),
            Err(_) => Self::Invalid,
        }
    }

    /// Normalize whatever date representation a fetched record carries.
    pub fn from_raw(raw: &RawDate) -> Self {
        match raw {
            RawDate::Day(day) => Self::Day(*day),
            // The instant's own offset defines its local calendar day;
            // the viewer's offset is whatever the caller baked in.
            RawDate::Instant(instant) => Self::Day(instant.naive_local().date()),
            RawDate::Timestamp(timestamp) => Self::Day(timestamp.date()),
            RawDate::Text(text) => Self::from_text(text),
        }
    }

    pub fn day(self) -> Option<NaiveDate> {
        match self {
            Self::Invalid => None,
            Self::Day(day) => Some(day),
        }
    }

    pub fn is_valid(self) -> bool {
        matches!(self, Self::Day(_))
    }
}

impl From<NaiveDate> for DateKey {
    fn from(day: NaiveDate) -> Self {
        Self::Day(day)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => f.write_str("invalid"),
            Self::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for DateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Ok(Self::from_text(&text))
    }
}

/// A log's date exactly as the record store returned it. The store does
/// not normalize encodings, so every variant funnels through
/// [`DateKey::from_raw`] before any comparison or lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    Day(NaiveDate),
    Instant(DateTime<FixedOffset>),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl From<NaiveDate> for RawDate {
    fn from(day: NaiveDate) -> Self {
        Self::Day(day)
    }
}

impl From<&str> for RawDate {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}
