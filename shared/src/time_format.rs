use chrono::{DateTime, Utc};

const DAYS_PER_MONTH: f64 = 30.4375;
const DAYS_PER_YEAR: f64 = 365.25;

/// Human readable gap between two instants, e.g. "3 hours" or "1 week".
/// Order of the arguments does not matter.
pub fn format_elapsed(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let secs = (to - from).num_milliseconds().unsigned_abs() as f64 / 1000.0;
    format_elapsed_secs(secs)
}

pub fn format_elapsed_secs(secs: f64) -> String {
    let secs = secs.abs();
    if secs < 60.0 {
        return plural(secs, "second");
    }
    let minutes = secs / 60.0;
    if minutes < 60.0 {
        return plural(minutes, "minute");
    }
    let hours = minutes / 60.0;
    if hours < 24.0 {
        return plural(hours, "hour");
    }
    let days = hours / 24.0;
    if days < 7.0 {
        return plural(days, "day");
    }
    if days < DAYS_PER_MONTH {
        return plural(days / 7.0, "week");
    }
    if days < DAYS_PER_YEAR {
        return plural(days / DAYS_PER_MONTH, "month");
    }
    plural(days / DAYS_PER_YEAR, "year")
}

fn plural(value: f64, unit: &str) -> String {
    let whole = value.floor() as u64;
    if whole == 1 {
        format!("1 {unit}")
    } else {
        format!("{whole} {unit}s")
    }
}
