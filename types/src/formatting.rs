//! Centralized number formatting for report rendering.
//!
//! All numeric display formatting goes through this module so tables and
//! log lines agree on how balances and rates look.

/// Format a number with thousands separators.
///
/// # Examples
/// ```
/// use snaptrack_types::formatting::format_thousands;
/// assert_eq!(format_thousands(0), "0");
/// assert_eq!(format_thousands(500), "500");
/// assert_eq!(format_thousands(1_500), "1,500");
/// assert_eq!(format_thousands(1_500_000), "1,500,000");
/// ```
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Format a win rate as a percentage with one decimal.
///
/// An undefined rate (no games played) renders as `-`, which is not the
/// same thing as `0.0%`.
///
/// # Examples
/// ```
/// use snaptrack_types::formatting::format_win_rate;
/// assert_eq!(format_win_rate(Some(0.625)), "62.5%");
/// assert_eq!(format_win_rate(Some(0.0)), "0.0%");
/// assert_eq!(format_win_rate(None), "-");
/// ```
pub fn format_win_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:.1}%", r * 100.0),
        None => "-".to_string(),
    }
}
