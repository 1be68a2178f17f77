//! Plain-text rendering of report values.

use funnel_core::types::Cents;

/// Rendered in place of any metric that is undefined.
pub const NULL_METRIC: &str = "—";

/// `$12,345.67` from integer cents.
pub fn dollars(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", abs % 100)
}

pub fn dollars_opt(cents: Option<Cents>) -> String {
    cents.map(dollars).unwrap_or_else(|| NULL_METRIC.to_string())
}

/// Percentage with one decimal, e.g. `62.5%`.
pub fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}%"))
        .unwrap_or_else(|| NULL_METRIC.to_string())
}

/// Return multiple, e.g. `3.60x`.
pub fn multiple(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}x"))
        .unwrap_or_else(|| NULL_METRIC.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollars_group_thousands() {
        assert_eq!(dollars(0), "$0.00");
        assert_eq!(dollars(5), "$0.05");
        assert_eq!(dollars(99_999), "$999.99");
        assert_eq!(dollars(180_000), "$1,800.00");
        assert_eq!(dollars(123_456_789), "$1,234,567.89");
        assert_eq!(dollars(-250_050), "-$2,500.50");
    }

    #[test]
    fn null_metrics_render_as_dash() {
        assert_eq!(percent(None), NULL_METRIC);
        assert_eq!(multiple(None), NULL_METRIC);
        assert_eq!(dollars_opt(None), NULL_METRIC);
    }

    #[test]
    fn ratios_render_with_fixed_precision() {
        assert_eq!(multiple(Some(3.6)), "3.60x");
        assert_eq!(percent(Some(62.5)), "62.5%");
        assert_eq!(percent(Some(150.0)), "150.0%");
        assert_eq!(dollars_opt(Some(16_667)), "$166.67");
    }
}
