//! Calendar helpers for the date-keyed asteroid feed.
//!
//! The remote feed and its cache are keyed by UTC calendar day (`YYYY-MM-DD`).

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds per day
pub const SECONDS_PER_DAY: i64 = 86400;

/// Today's UTC date as `YYYY-MM-DD`, from the system clock.
pub fn today_utc() -> String {
    let unix_now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    unix_to_date_key(unix_now)
}

/// Format a Unix timestamp as its UTC calendar day.
pub fn unix_to_date_key(unix_secs: i64) -> String {
    let days_since_epoch = unix_secs.div_euclid(SECONDS_PER_DAY);
    let (year, month, day) = days_to_ymd(days_since_epoch);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

/// Convert days since Unix epoch to year, month, day
fn days_to_ymd(days: i64) -> (i32, u32, u32) {
    // Algorithm for Gregorian calendar
    let remaining_days = days + 719468; // Days from year 0 to 1970

    let era = if remaining_days >= 0 {
        remaining_days / 146097
    } else {
        (remaining_days - 146096) / 146097
    };

    let day_of_era = (remaining_days - era * 146097) as u32;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36524 - day_of_era / 146096) / 365;
    let year = (year_of_era as i64 + era * 400) as i32;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };

    (year, month, day)
}
