//! Duration normalizer
//!
//! Turns free-form durations such as `"2h 15m"`, `"45m"` or `"1h"` into a
//! total number of minutes.

/// Parse a duration string into total minutes.
///
/// The text before the first `h` is the hour count. The minute count is the
/// text after the last `h` (or the whole string when there is no `h`) with
/// every `m` removed. Both segments are trimmed before parsing.
///
/// Returns `None` when the string carries neither marker, when a segment is
/// not a non-negative integer, or when the total overflows. Callers treat
/// `None` as "exclude from numeric duration operations".
pub fn parse_duration_minutes(duration: &str) -> Option<u32> {
    let has_hours = duration.contains('h');
    let has_minutes = duration.contains('m');
    if !has_hours && !has_minutes {
        return None;
    }

    let mut hours = 0u32;
    let mut minutes = 0u32;

    if has_hours {
        let (before, _) = duration.split_once('h')?;
        hours = before.trim().parse().ok()?;
    }

    if has_minutes {
        let segment = if has_hours {
            duration.rsplit('h').next()?
        } else {
            duration
        };
        minutes = segment.replace('m', "").trim().parse().ok()?;
    }

    hours.checked_mul(60)?.checked_add(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_and_minutes() {
        assert_eq!(parse_duration_minutes("2h 15m"), Some(135));
        assert_eq!(parse_duration_minutes("1h 52m"), Some(112));
        assert_eq!(parse_duration_minutes("2h 05m"), Some(125));
        assert_eq!(parse_duration_minutes("2h 1m"), Some(121));
    }

    #[test]
    fn test_single_segment() {
        assert_eq!(parse_duration_minutes("45m"), Some(45));
        assert_eq!(parse_duration_minutes("1h"), Some(60));
        assert_eq!(parse_duration_minutes(" 3h "), Some(180));
    }

    #[test]
    fn test_unparsable() {
        assert_eq!(parse_duration_minutes("garbage"), None);
        assert_eq!(parse_duration_minutes(""), None);
        assert_eq!(parse_duration_minutes("two hours"), None);
        assert_eq!(parse_duration_minutes("xh 10m"), None);
        assert_eq!(parse_duration_minutes("2h xm"), None);
        assert_eq!(parse_duration_minutes("-5m"), None);
    }

    #[test]
    fn test_compact_form() {
        // No space between the segments
        assert_eq!(parse_duration_minutes("1h30m"), Some(90));
    }

    #[test]
    fn test_overflow_is_unparsable() {
        assert_eq!(parse_duration_minutes("4294967295h"), None);
    }
}
