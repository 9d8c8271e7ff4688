//! Display helpers shared by every frontend.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::types::Frequency;

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// "Today", "Yesterday", or a label such as "Monday, Jan 5" relative to `today`.
///
/// Input that is not an ISO date is returned unchanged.
pub fn format_date(date: &str, today: NaiveDate) -> String {
    let Ok(day) = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") else {
        debug!("Cannot format non-ISO date {:?}", date);
        return date.to_string();
    };

    if day == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_string()
    } else {
        day.format("%A, %b %-d").to_string()
    }
}

/// [`format_date`] against the local calendar.
pub fn format_date_local(date: &str) -> String {
    format_date(date, Local::now().date_naive())
}

/// Hour and minute of a completion timestamp, e.g. "3:05 PM"; empty when absent.
pub fn format_time(timestamp: Option<&str>) -> String {
    timestamp
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(parse_timestamp)
        .map(|time| time.format("%-I:%M %p").to_string())
        .unwrap_or_default()
}

pub fn format_frequency(frequency: Option<Frequency>) -> &'static str {
    frequency.unwrap_or_default().label()
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.with_timezone(&Local).naive_local());
    }
    TIMESTAMP_FORMATS.iter().find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
