//! Number formatting for KPI cards, tables and axis labels.

/// `$1,234,567` with no decimals.
pub fn format_currency(value: f64) -> String {
    let sign = if value.round() < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(value))
}

/// `1,234,567` with no decimals.
pub fn format_count(value: f64) -> String {
    let sign = if value.round() < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(value))
}

/// `85.7%`
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Short axis label: `1.2B`, `3.4M`, `560K`, `12`.
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "K")
    } else {
        return format!("{:.0}", value);
    };

    let text = format!("{:.1}", scaled);
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{}{}", text, suffix)
}

fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(350.0), "$350");
        assert_eq!(format_currency(1234567.4), "$1,234,567");
        assert_eq!(format_currency(-1500.0), "-$1,500");
        assert_eq!(format_currency(-0.2), "$0");
    }

    #[test]
    fn test_format_count_and_percent() {
        assert_eq!(format_count(1000.0), "1,000");
        assert_eq!(format_count(999.6), "1,000");
        assert_eq!(format_percent(85.714), "85.7%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(12.0), "12");
        assert_eq!(format_compact(560_000.0), "560K");
        assert_eq!(format_compact(3_450_000.0), "3.5M");
        assert_eq!(format_compact(2_000_000_000.0), "2B");
        assert_eq!(format_compact(-1_500.0), "-1.5K");
    }
}
