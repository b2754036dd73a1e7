use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::i18n::Strings;

const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Berlin;

/// Resolve an IANA timezone name, falling back to Europe/Berlin.
pub fn resolve_timezone(name: &str) -> Tz {
    if name.is_empty() {
        return DEFAULT_TIMEZONE;
    }
    name.parse().unwrap_or_else(|_| {
        warn!(timezone = %name, "unknown timezone, using Europe/Berlin");
        DEFAULT_TIMEZONE
    })
}

/// The two lines of the clock card: time and date, localized.
pub fn clock_lines(now: DateTime<Utc>, tz: Tz, strings: &Strings) -> (String, String) {
    let local = now.with_timezone(&tz);
    let time = local
        .format_localized(strings.time_format, strings.date_locale)
        .to_string();
    let date = local
        .format_localized(strings.date_format, strings.date_locale)
        .to_string();
    (time, date)
}
