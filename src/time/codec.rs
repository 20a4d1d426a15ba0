// ABOUTME: Converts ISO-8601 local date-time strings to epoch milliseconds.
// ABOUTME: Local times are resolved against the process timezone by default.

use chrono::{Local, NaiveDateTime, Offset, TimeDelta, TimeZone};

use crate::error::TimeError;

/// Accepted grammars, tried in order. `%.f` also matches an absent fraction.
const LOCAL_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// How far back to look for the offset in effect before a DST gap.
const MAX_GAP_HOURS: i64 = 24;

/// Parse a local date-time in the process's timezone into epoch milliseconds.
///
/// Surrounding whitespace is rejected, like any other text outside the grammar.
pub fn parse(text: &str) -> Result<i64, TimeError> {
    parse_in(text, &Local)
}

/// Parse a local date-time in the given timezone into epoch milliseconds.
///
/// An ambiguous local time (clocks turned back) resolves to the earlier
/// instant. A local time inside a gap (clocks turned forward) is moved later
/// by the length of the gap.
pub fn parse_in<Tz: TimeZone>(text: &str, tz: &Tz) -> Result<i64, TimeError> {
    let naive = parse_naive(text)?;

    // `earliest` covers both the single and the ambiguous case.
    let millis = match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.timestamp_millis(),
        None => {
            let offset = offset_before_gap(tz, naive).ok_or_else(|| TimeError::Malformed {
                text: text.to_string(),
                reason: "local time does not exist in this timezone".to_string(),
            })?;
            let utc = naive - TimeDelta::seconds(i64::from(offset));
            utc.and_utc().timestamp_millis()
        }
    };

    Ok(millis)
}

/// Parse the text as a naive date-time without any timezone.
pub fn parse_naive(text: &str) -> Result<NaiveDateTime, TimeError> {
    // chrono skips whitespace before numeric fields; the grammar does not.
    if text.trim() != text {
        return Err(TimeError::Malformed {
            text: text.to_string(),
            reason: "surrounding whitespace".to_string(),
        });
    }

    let mut last_error = None;

    for format in LOCAL_DATE_TIME_FORMATS {
        match NaiveDateTime::parse_from_str(text, format) {
            Ok(naive) => return Ok(naive),
            Err(e) => last_error = Some(e),
        }
    }

    Err(TimeError::Malformed {
        text: text.to_string(),
        reason: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no format matched".to_string()),
    })
}

/// Seconds east of UTC in effect just before the gap containing `naive`.
fn offset_before_gap<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<i32> {
    (1..=MAX_GAP_HOURS).find_map(|hours| {
        let earlier = naive - TimeDelta::hours(hours);
        tz.from_local_datetime(&earlier)
            .earliest()
            .map(|dt| dt.offset().fix().local_minus_utc())
    })
}
