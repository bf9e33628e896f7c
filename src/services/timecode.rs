//! Clip start offset formatting
//!
//! Converts the request's minute/second strings into the `00:MM:SS` timecode
//! handed to the downloader's trim arguments.

/// Format a clip start offset as `00:MM:SS`.
///
/// Missing or empty fields contribute 0. A non-numeric value in either field
/// resets BOTH to 0 — legacy client builds depend on this exact fallback, so
/// it is preserved as-is. Magnitudes are not bounds-checked; values of 60 or
/// more pass through uninterpreted.
pub fn format_start(minute: Option<&str>, second: Option<&str>) -> String {
    let (min, sec) = parse_fields(minute, second).unwrap_or((0, 0));
    format!("00:{min:02}:{sec:02}")
}

fn parse_fields(minute: Option<&str>, second: Option<&str>) -> Option<(i32, i32)> {
    let mut min = 0;
    let mut sec = 0;
    if let Some(m) = minute {
        if !m.is_empty() {
            min = m.parse().ok()?;
        }
    }
    if let Some(s) = second {
        if !s.is_empty() {
            sec = s.parse().ok()?;
        }
    }
    Some((min, sec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_basic_offset() {
        assert_eq!(format_start(Some("1"), Some("5")), "00:01:05");
        assert_eq!(format_start(Some("12"), Some("34")), "00:12:34");
    }

    #[test]
    fn missing_fields_default_to_zero() {
        assert_eq!(format_start(None, None), "00:00:00");
        assert_eq!(format_start(Some(""), Some("")), "00:00:00");
        assert_eq!(format_start(None, Some("7")), "00:00:07");
        assert_eq!(format_start(Some("3"), None), "00:03:00");
    }

    #[test]
    fn non_numeric_input_resets_both_fields() {
        assert_eq!(format_start(Some("abc"), Some("5")), "00:00:00");
        assert_eq!(format_start(Some("1"), Some("xyz")), "00:00:00");
        assert_eq!(format_start(Some("1.5"), Some("5")), "00:00:00");
    }

    #[test]
    fn out_of_range_values_pass_through() {
        assert_eq!(format_start(Some("90"), Some("75")), "00:90:75");
        assert_eq!(format_start(Some("120"), Some("0")), "00:120:00");
    }
}
