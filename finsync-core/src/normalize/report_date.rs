use crate::domain::Scalar;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Coerces a report-date label to a calendar date, dropping any time of day.
///
/// Accepts dates, ISO date strings, date-times (space or `T` separated, with or
/// without an offset) and integer epoch seconds.
pub fn coerce_report_date(label: &Scalar) -> Option<NaiveDate> {
    match label {
        Scalar::Date(d) => Some(*d),
        Scalar::Int(secs) => DateTime::from_timestamp(*secs, 0).map(|dt| dt.date_naive()),
        Scalar::Float(secs) if secs.is_finite() && secs.fract() == 0.0 => {
            DateTime::from_timestamp(*secs as i64, 0).map(|dt| dt.date_naive())
        }
        Scalar::Text(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}
