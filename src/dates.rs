use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::{PainelError, Result};

/// Number of digits in a complete ddmmyyyy entry.
pub const DIGIT_DATE_LEN: usize = 8;

fn iso_date_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok())
        .as_ref()
}

fn looks_like_iso_date(value: &str) -> bool {
    iso_date_re().map(|re| re.is_match(value)).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a strict `YYYY-MM-DD` value, as produced by a date picker.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    if !looks_like_iso_date(value) {
        return Err(PainelError::InvalidDate(format!("{value:?} is not YYYY-MM-DD")));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| PainelError::InvalidDate(format!("{value} is not a calendar date")))
}

/// Normalize any date shape the backends send to a calendar date.
///
/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY`, RFC 3339 timestamps and naive
/// `YYYY-MM-DD[T ]HH:MM:SS` timestamps. Timestamps keep their UTC calendar day,
/// so a UTC-midnight value never slides back to the previous day.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc().date());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Serde adapter for row date fields.
pub fn deserialize_flexible<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized date {raw:?}")))
}

/// Parse a date typed on the command line: `YYYY-MM-DD`, `DD/MM/YYYY` or the
/// eight raw digits `DDMMYYYY`.
pub fn parse_user_date(value: &str) -> Result<NaiveDate> {
    let v = value.trim();
    if v.len() == DIGIT_DATE_LEN && v.chars().all(|c| c.is_ascii_digit()) {
        let mut entry = DigitDateEntry::default();
        return entry
            .set_input(v)
            .ok_or_else(|| PainelError::InvalidDate(format!("{v} is not a calendar date")));
    }
    if looks_like_iso_date(v) {
        return parse_iso_date(v);
    }
    NaiveDate::parse_from_str(v, "%d/%m/%Y").map_err(|_| {
        PainelError::InvalidDate(format!(
            "{v:?} (expected YYYY-MM-DD, DD/MM/YYYY or DDMMYYYY)"
        ))
    })
}

// ---------------------------------------------------------------------------
// Digit entry (single ddmmyyyy field)
// ---------------------------------------------------------------------------

/// A date field the user fills by typing digits only. The display grows as
/// `25`, `25/1`, `25/12/2`, ... and a date is committed once all eight digits
/// form a real calendar date.
#[derive(Debug, Clone, Default)]
pub struct DigitDateEntry {
    digits: String,
    committed: Option<NaiveDate>,
}

impl DigitDateEntry {
    pub fn with_date(date: NaiveDate) -> Self {
        Self {
            digits: date.format("%d%m%Y").to_string(),
            committed: Some(date),
        }
    }

    /// Apply the full field text after an edit. Non-digits are stripped and
    /// input longer than eight digits is ignored. Returns the date only when a
    /// new value is committed.
    pub fn set_input(&mut self, raw: &str) -> Option<NaiveDate> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() > DIGIT_DATE_LEN {
            return None;
        }
        self.digits = digits;
        if self.digits.len() < DIGIT_DATE_LEN {
            return None;
        }
        match digits_to_date(&self.digits) {
            Some(date) if self.committed == Some(date) => None,
            Some(date) => {
                self.committed = Some(date);
                Some(date)
            }
            None => {
                warn!(input = %self.display(), "ignoring impossible calendar date");
                None
            }
        }
    }

    /// Type one character at the end of the field.
    pub fn push(&mut self, c: char) -> Option<NaiveDate> {
        if !c.is_ascii_digit() {
            return None;
        }
        let next = format!("{}{c}", self.digits);
        self.set_input(&next)
    }

    pub fn backspace(&mut self) {
        self.digits.pop();
    }

    pub fn display(&self) -> String {
        let d = &self.digits;
        let mut out = String::from(&d[..d.len().min(2)]);
        if d.len() > 2 {
            out.push('/');
            out.push_str(&d[2..d.len().min(4)]);
        }
        if d.len() > 4 {
            out.push('/');
            out.push_str(&d[4..]);
        }
        out
    }

    pub fn committed(&self) -> Option<NaiveDate> {
        self.committed
    }
}

fn digits_to_date(digits: &str) -> Option<NaiveDate> {
    let day: u32 = digits.get(0..2)?.parse().ok()?;
    let month: u32 = digits.get(2..4)?.parse().ok()?;
    let year: i32 = digits.get(4..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

// ---------------------------------------------------------------------------
// Start/end range
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(PainelError::InvalidRange(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Query parameters in the shape every range endpoint expects.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("startDate", self.start.format("%Y-%m-%d").to_string()),
            ("endDate", self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

#[cfg(test)]
impl DateRange {
    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    Start,
    End,
}

/// Two date-picker fields. Each accepts only `YYYY-MM-DD`; anything else is
/// logged and leaves the field as it was.
#[derive(Debug, Clone, Default)]
pub struct DateRangeInput {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRangeInput {
    pub fn from_range(range: DateRange) -> Self {
        Self {
            start: Some(range.start),
            end: Some(range.end),
        }
    }

    /// Returns true when the stored value changed.
    pub fn set(&mut self, field: RangeField, value: &str) -> bool {
        let date = match parse_iso_date(value) {
            Ok(d) => d,
            Err(e) => {
                warn!(?field, value, "rejected date input: {e}");
                return false;
            }
        };
        let slot = match field {
            RangeField::Start => &mut self.start,
            RangeField::End => &mut self.end,
        };
        if *slot == Some(date) {
            return false;
        }
        *slot = Some(date);
        true
    }

    pub fn get(&self, field: RangeField) -> Option<NaiveDate> {
        match field {
            RangeField::Start => self.start,
            RangeField::End => self.end,
        }
    }

    /// The committed range, once both ends are set and in order.
    pub fn range(&self) -> Option<DateRange> {
        let (start, end) = (self.start?, self.end?);
        match DateRange::new(start, end) {
            Ok(r) => Some(r),
            Err(e) => {
                warn!("not fetching: {e}");
                None
            }
        }
    }
}
