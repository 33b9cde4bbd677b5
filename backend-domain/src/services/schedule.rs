use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const TIME_FORMATS: [&str; 4] = ["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M%p"];

/// Combines a `YYYY-MM-DD` date with a loose time of day.
///
/// Slot strings like `9:00 AM - 10:00 AM` resolve to their start. A missing
/// time means midnight; anything unparsable yields `None`.
pub fn parse_schedule(date: Option<&str>, time: Option<&str>) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date?.trim(), "%Y-%m-%d").ok()?;
    let time = match time.map(str::trim).filter(|value| !value.is_empty()) {
        Some(raw) => parse_time_of_day(raw)?,
        None => NaiveTime::MIN,
    };
    Some(date.and_time(time))
}

fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let start = raw
        .split(|ch: char| ch == '-' || ch == '–')
        .next()
        .map(str::trim)
        .unwrap_or(raw)
        .to_uppercase();
    // "9 AM" carries no minutes, which chrono will not accept
    let start = if start.contains(':') {
        start
    } else {
        let digits = start
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(start.len());
        format!("{}:00{}", &start[..digits], &start[digits..])
    };
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&start, format).ok())
}
