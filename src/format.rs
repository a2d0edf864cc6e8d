//! Display Formatting
//!
//! Text shown for keys, durations and icons.

use crate::models::TicketKey;
use crate::time::Progress;

/// Separator between ancestors in a key path
pub const ARROW: &str = " ➤ ";

/// Working day used for durations
const SECONDS_PER_DAY: u64 = 3600 * 8;

/// `#` followed by the key zero-padded to the width of `max_key`
pub fn display_key(key: TicketKey, max_key: TicketKey) -> String {
    let width = max_key.checked_ilog10().map_or(0, |d| d as usize + 1);
    format!("#{:0width$}", key, width = width)
}

/// Seconds as `"1d 2h 3m 4s"` with 8-hour days; zero parts are skipped
pub fn fmt_time(seconds: u64) -> String {
    let d = seconds / SECONDS_PER_DAY;
    let h = seconds % SECONDS_PER_DAY / 3600;
    let m = seconds % 3600 / 60;
    let s = seconds % 60;

    [(d, "d"), (h, "h"), (m, "m"), (s, "s")]
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{}{}", n, unit))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"spent / estimate"`, empty when nothing was logged or estimated
pub fn fmt_progress(progress: Progress) -> String {
    if progress.spent == 0 && progress.estimate == 0 {
        return String::new();
    }
    let spent = if progress.spent == 0 { "0s".to_string() } else { fmt_time(progress.spent) };
    let estimate = if progress.estimate == 0 { "?".to_string() } else { fmt_time(progress.estimate) };
    format!("{} / {}", spent, estimate)
}

pub fn priority_icon(priority: i32) -> String {
    format!("/static/ui/icons/priority_{}.svg", priority - 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_key_padding() {
        assert_eq!(display_key(5, 0), "#5");
        assert_eq!(display_key(5, 9), "#5");
        assert_eq!(display_key(5, 10), "#05");
        assert_eq!(display_key(5, 99), "#05");
        assert_eq!(display_key(5, 100), "#005");
        assert_eq!(display_key(1234, 100), "#1234");
    }

    #[test]
    fn test_fmt_time() {
        assert_eq!(fmt_time(0), "");
        assert_eq!(fmt_time(59), "59s");
        assert_eq!(fmt_time(3600), "1h");
        assert_eq!(fmt_time(3600 * 8), "1d");
        assert_eq!(fmt_time(3600 * 8 + 2 * 3600 + 3 * 60 + 4), "1d 2h 3m 4s");
        assert_eq!(fmt_time(3600 * 9 + 60), "1d 1h 1m");
    }

    #[test]
    fn test_fmt_progress() {
        assert_eq!(fmt_progress(Progress::default()), "");
        assert_eq!(fmt_progress(Progress { spent: 1800, estimate: 3600 }), "30m / 1h");
        assert_eq!(fmt_progress(Progress { spent: 60, estimate: 0 }), "1m / ?");
        assert_eq!(fmt_progress(Progress { spent: 0, estimate: 60 }), "0s / 1m");
    }

    #[test]
    fn test_priority_icon_offset() {
        assert_eq!(priority_icon(3), "/static/ui/icons/priority_0.svg");
        assert_eq!(priority_icon(1), "/static/ui/icons/priority_-2.svg");
    }
}
