//! Date normalization for `duration.start` / `duration.end`.
//!
//! Source tables write dates as `1-2-99`, `01.02.1999`, `1999/2/1` and so
//! on. Values are rewritten year-first (`2099-2-1`) when the year position
//! can be told from segment lengths, and left untouched otherwise.
//! Afterwards the record gets a `duration.type` classifying the interval.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use hstat_model::Record;

use crate::error::TransformError;
use crate::transformer::Transformer;

pub const DURATION_START: &str = "duration.start";
pub const DURATION_END: &str = "duration.end";
pub const DURATION_TYPE: &str = "duration.type";

/// Century assumed for two-digit years.
const TWO_DIGIT_YEAR_PREFIX: &str = "20";

const SEPARATORS: [char; 3] = ['-', '.', '/'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationType {
    /// Same year, from Jan 1 through Dec 31.
    Yearly,
    /// Start and end are the same day.
    Daily,
    Unknown,
}

impl DurationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yearly => "YEARLY",
            Self::Daily => "DAILY",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Year, month, and day segments as written in the source.
struct DateSegments<'a> {
    year: String,
    month: &'a str,
    day: &'a str,
}

fn split_segments(value: &str) -> Option<DateSegments<'_>> {
    let segments: Vec<&str> = value.trim().split(SEPARATORS).collect();
    let [first, month, last] = segments.as_slice() else {
        return None;
    };
    if !segments
        .iter()
        .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }
    match (first.len(), last.len()) {
        (4, 4) => None,
        (4, _) => Some(DateSegments {
            year: (*first).to_string(),
            month,
            day: last,
        }),
        (_, 4) => Some(DateSegments {
            year: (*last).to_string(),
            month,
            day: first,
        }),
        (_, 2) => Some(DateSegments {
            year: format!("{TWO_DIGIT_YEAR_PREFIX}{last}"),
            month,
            day: first,
        }),
        _ => None,
    }
}

fn calendar_date(segments: &DateSegments<'_>) -> Option<NaiveDate> {
    let year = segments.year.parse().ok()?;
    let month = segments.month.parse().ok()?;
    let day = segments.day.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Rewrite a date year-first, keeping the source spelling of month and day.
///
/// Returns `None` when the year position is ambiguous or the value is not a
/// real calendar date.
///
/// ```
/// use hstat_transform::date::normalize_date;
///
/// assert_eq!(normalize_date("1-2-99").as_deref(), Some("2099-2-1"));
/// assert_eq!(normalize_date("01.02.1999").as_deref(), Some("1999-02-01"));
/// assert_eq!(normalize_date("2019/12/31").as_deref(), Some("2019-12-31"));
/// assert_eq!(normalize_date("1999-02-2000"), None);
/// ```
pub fn normalize_date(value: &str) -> Option<String> {
    let segments = split_segments(value)?;
    calendar_date(&segments)?;
    Some(format!(
        "{}-{}-{}",
        segments.year, segments.month, segments.day
    ))
}

/// Parse a date with the same year-position heuristics.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    calendar_date(&split_segments(value)?)
}

/// Classify the interval between two (possibly missing) dates.
pub fn classify_duration(start: Option<&str>, end: Option<&str>) -> DurationType {
    let (Some(start), Some(end)) = (start.and_then(parse_date), end.and_then(parse_date)) else {
        return DurationType::Unknown;
    };
    let whole_year = start.year() == end.year()
        && (start.month(), start.day()) == (1, 1)
        && (end.month(), end.day()) == (12, 31);
    if whole_year {
        DurationType::Yearly
    } else if start == end {
        DurationType::Daily
    } else {
        DurationType::Unknown
    }
}

/// Normalizes duration dates and derives `duration.type`. Never fails.
#[derive(Debug, Clone, Default)]
pub struct DateTransformer;

impl DateTransformer {
    pub const NAME: &'static str = "date";

    pub fn new() -> Self {
        Self
    }
}

impl Transformer for DateTransformer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn transform(&mut self, record: &Record) -> Result<Vec<Record>, TransformError> {
        let mut out = record.clone();
        let mut has_duration = false;
        for field in [DURATION_START, DURATION_END] {
            let Some(value) = record.get(field) else {
                continue;
            };
            has_duration = true;
            match normalize_date(value) {
                Some(normalized) => {
                    out.insert(field, normalized);
                }
                None => debug!(field, "unparseable date left unchanged"),
            }
        }
        if has_duration {
            let kind = classify_duration(out.get(DURATION_START), out.get(DURATION_END));
            out.insert(DURATION_TYPE, kind.as_str());
        }
        Ok(vec![out])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_digit_year_is_trailing_and_in_this_century() {
        assert_eq!(normalize_date("1-2-99").as_deref(), Some("2099-2-1"));
        assert_eq!(normalize_date("31/12/05").as_deref(), Some("2005-12-31"));
    }

    #[test]
    fn four_digit_year_at_either_end() {
        assert_eq!(normalize_date("2015.3.7").as_deref(), Some("2015-3-7"));
        assert_eq!(normalize_date("7.3.2015").as_deref(), Some("2015-3-7"));
    }

    #[test]
    fn ambiguous_or_malformed_values_are_rejected() {
        for value in [
            "", "2015", "2015-03", "1-2-3", "99-2-1", "2015-02-2016", "a-b-c", "1-2-99-4",
            "30-2-2015", "2015--1",
        ] {
            assert_eq!(normalize_date(value), None, "{value:?}");
        }
    }

    #[test]
    fn duration_classification() {
        let yearly = classify_duration(Some("2015-1-1"), Some("2015-12-31"));
        assert_eq!(yearly, DurationType::Yearly);
        let daily = classify_duration(Some("2015-06-01"), Some("1.6.2015"));
        assert_eq!(daily, DurationType::Daily);
        let span = classify_duration(Some("2015-1-1"), Some("2016-12-31"));
        assert_eq!(span, DurationType::Unknown);
        assert_eq!(classify_duration(Some("2015-1-1"), None), DurationType::Unknown);
    }

    #[test]
    fn transform_rewrites_dates_and_sets_type() {
        let record = Record::from_iter([
            (DURATION_START, "1-1-15"),
            (DURATION_END, "31.12.2015"),
            ("source", "NFHS4"),
        ]);
        let out = DateTransformer::new().transform(&record).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get(DURATION_START), Some("2015-1-1"));
        assert_eq!(out[0].get(DURATION_END), Some("2015-12-31"));
        assert_eq!(out[0].get(DURATION_TYPE), Some("YEARLY"));
    }

    #[test]
    fn transform_keeps_garbage_dates() {
        let record = Record::from_iter([(DURATION_START, "sometime")]);
        let out = DateTransformer::new().transform(&record).unwrap();
        assert_eq!(out[0].get(DURATION_START), Some("sometime"));
        assert_eq!(out[0].get(DURATION_TYPE), Some("UNKNOWN"));
    }

    #[test]
    fn records_without_durations_are_untouched() {
        let record = Record::from_iter([("source", "NFHS4")]);
        let out = DateTransformer::new().transform(&record).unwrap();
        assert_eq!(out, vec![record]);
    }
}
