/// Shown in place of a metric that is undefined for an empty selection.
pub const NO_DATA: &str = "No data";

/// `12345.678` → `"12345.68 $"`.
pub fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2} $", v),
        _ => NO_DATA.to_string(),
    }
}

/// Round to an integer and group thousands: `1234567.4` → `"1,234,567"`.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return NO_DATA.to_string();
    }
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 && rounded != "0" {
        grouped.insert(0, '-');
    }
    grouped
}
