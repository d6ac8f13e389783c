//! Shared utility functions for the suds crate.

use chrono::{DateTime, TimeZone};

/// `DD/MM/YYYY`, optionally followed by ` HH:MM`, in the timestamp's zone.
pub fn format_date<Tz>(date: &DateTime<Tz>, include_time: bool) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if include_time {
        date.format("%d/%m/%Y %H:%M").to_string()
    } else {
        date.format("%d/%m/%Y").to_string()
    }
}

/// Human description of `date` relative to `now`.
///
/// Each unit is rounded from the previous rounded unit (seconds, then
/// minutes, hours, days), with halves rounded toward positive infinity.
/// The largest non-zero unit wins: "Tomorrow", "In 3 days", "Yesterday",
/// "2 days ago", "In 5 hours", "1 minute ago", or "Just now".
pub fn relative_time<Tz1, Tz2>(date: &DateTime<Tz1>, now: &DateTime<Tz2>) -> String
where
    Tz1: TimeZone,
    Tz2: TimeZone,
{
    let diff_ms = date.timestamp_millis() - now.timestamp_millis();
    let seconds = round_half_up(diff_ms as f64 / 1000.0);
    let minutes = round_half_up(seconds / 60.0);
    let hours = round_half_up(minutes / 60.0);
    let days = round_half_up(hours / 24.0) as i64;
    let hours = hours as i64;
    let minutes = minutes as i64;

    match (days, hours, minutes) {
        (1, _, _) => "Tomorrow".to_string(),
        (d, _, _) if d > 1 => format!("In {} days", d),
        (-1, _, _) => "Yesterday".to_string(),
        (d, _, _) if d < -1 => format!("{} days ago", -d),
        (_, h, _) if h > 0 => format!("In {} hour{}", h, plural(h)),
        (_, h, _) if h < 0 => format!("{} hour{} ago", -h, plural(h)),
        (_, _, m) if m > 0 => format!("In {} minute{}", m, plural(m)),
        (_, _, m) if m < 0 => format!("{} minute{} ago", -m, plural(m)),
        _ => "Just now".to_string(),
    }
}

fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn plural(n: i64) -> &'static str {
    if n.abs() == 1 { "" } else { "s" }
}
