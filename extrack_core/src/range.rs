//! Date range normalization for log queries.
//!
//! Turns the raw `from`, `to` and `limit` query inputs into a
//! [`NormalizedRange`]: two inclusive calendar-date bounds and an optional
//! maximum entry count. All comparisons downstream happen on
//! [`NaiveDate`], so no time-of-day or offset can shift a boundary.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::{Field, ValidationError};

/// Wire rendering of dates, also accepted as input (e.g. `Sun Jan 01 2023`)
pub const DISPLAY_DATE_FORMAT: &str = "%a %b %d %Y";

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Other spellings browsers and JavaScript clients commonly send
const LOOSE_DATE_FORMATS: &[&str] = &[
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%Y/%m/%d",
    "%m/%d/%Y",
];

/// Raw log query parameters as received from a client
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LogQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<String>,
}

impl LogQuery {
    pub fn new(from: Option<&str>, to: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }
}

/// Which inputs the caller actually supplied
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Supplied {
    from: bool,
    to: bool,
    limit: bool,
}

/// Resolved `(lower, upper, max_count)` triple
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedRange {
    /// Inclusive lower bound
    pub lower: NaiveDate,
    /// Inclusive upper bound, covering the whole day
    pub upper: NaiveDate,
    /// `None` means unbounded; `Some(0)` yields an empty log
    pub max_count: Option<usize>,
    supplied: Supplied,
}

impl NormalizedRange {
    /// Build a range directly from resolved values
    pub fn new(
        lower: NaiveDate,
        upper: NaiveDate,
        max_count: Option<usize>,
    ) -> Result<Self, ValidationError> {
        if lower > upper {
            return Err(ValidationError::new(
                Field::Range,
                format!("from ({lower}) is after to ({upper})"),
            ));
        }
        Ok(Self {
            lower,
            upper,
            max_count,
            supplied: Supplied::default(),
        })
    }

    /// True when `date` lies within both bounds, ends included
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.lower <= date && date <= self.upper
    }

    /// The lower bound, if the caller supplied one
    pub fn echo_from(&self) -> Option<NaiveDate> {
        self.supplied.from.then_some(self.lower)
    }

    /// The upper bound, if the caller supplied one
    pub fn echo_to(&self) -> Option<NaiveDate> {
        self.supplied.to.then_some(self.upper)
    }

    /// The limit, if the caller supplied one
    pub fn echo_limit(&self) -> Option<usize> {
        if self.supplied.limit {
            self.max_count
        } else {
            None
        }
    }
}

/// Normalize a raw query against the current calendar date
///
/// Absent or blank inputs default to: `from` = [`NaiveDate::MIN`],
/// `to` = `today`, `limit` = unbounded.
pub fn normalize(query: &LogQuery, today: NaiveDate) -> Result<NormalizedRange, ValidationError> {
    let from = present(&query.from)
        .map(|raw| parse_calendar_date(Field::From, raw))
        .transpose()?;
    let to = present(&query.to)
        .map(|raw| parse_calendar_date(Field::To, raw))
        .transpose()?;
    let limit = present(&query.limit).map(parse_limit).transpose()?;

    let mut range = NormalizedRange::new(
        from.unwrap_or(NaiveDate::MIN),
        to.unwrap_or(today),
        limit,
    )?;
    range.supplied = Supplied {
        from: from.is_some(),
        to: to.is_some(),
        limit: limit.is_some(),
    };

    tracing::debug!(
        lower = %range.lower,
        upper = %range.upper,
        max_count = ?range.max_count,
        "Normalized log query"
    );
    Ok(range)
}

/// Parse a calendar date, discarding any time-of-day or offset
///
/// Accepts `YYYY-MM-DD`, RFC 3339 and RFC 2822 timestamps, offset-free
/// `YYYY-MM-DDTHH:MM:SS` timestamps, the display form `Www Mmm DD YYYY`,
/// and month-name or slash spellings such as `Jan 15 2023`,
/// `January 15, 2023`, `15 Jan 2023`, `2023/01/15` and `01/15/2023`
/// (month first). For timestamps the date is taken as written, before any
/// offset is applied.
pub fn parse_calendar_date(field: Field, raw: &str) -> Result<NaiveDate, ValidationError> {
    let input = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, ISO_DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(timestamp.date_naive());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(timestamp.date());
        }
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc2822(input) {
        return Ok(timestamp.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, DISPLAY_DATE_FORMAT) {
        return Ok(date);
    }
    for format in LOOSE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Ok(date);
        }
    }

    Err(ValidationError::new(
        field,
        format!("'{input}' is not a valid date"),
    ))
}

fn parse_limit(raw: &str) -> Result<usize, ValidationError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::new(
            Field::Limit,
            format!("'{raw}' is not a non-negative integer"),
        ));
    }
    raw.parse::<usize>()
        .map_err(|_| ValidationError::new(Field::Limit, format!("'{raw}' is too large")))
}

/// Trimmed value of an optional input, `None` when absent or blank
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
