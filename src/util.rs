use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cuts `text` to at most `max` terminal columns, ending in `…` when cut.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Whole seconds left, rounded up, for a progress fraction of `total_secs`.
pub fn seconds_left(fraction: f64, total_secs: f64) -> u64 {
    let left = (1.0 - fraction.clamp(0.0, 1.0)) * total_secs;
    // float noise from the fraction must not add a whole second
    (left - 1e-9).ceil().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_to_width("banner", 10), "banner");
        assert_eq!(truncate_to_width("banner", 6), "banner");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("admissions", 6), "admis…");
        assert_eq!(truncate_to_width("admissions", 1), "…");
        assert_eq!(truncate_to_width("admissions", 0), "");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // each CJK char is two columns wide
        assert_eq!(truncate_to_width("学校新闻", 5), "学校…");
    }

    #[test]
    fn test_seconds_left() {
        assert_eq!(seconds_left(0.0, 10.0), 10);
        assert_eq!(seconds_left(0.25, 10.0), 8);
        assert_eq!(seconds_left(0.9, 10.0), 1);
        assert_eq!(seconds_left(1.0, 10.0), 0);
        assert_eq!(seconds_left(1.5, 10.0), 0);
    }
}
