//! Formatting helpers merged into the render context as precomputed values.
//! Both follow the `es-CO` locale: `.` groups thousands, `,` starts decimals,
//! dates read day/month/year without zero padding.

/// Format a price with thousands separators. Anything that does not parse as
/// a finite number formats as `"0"`.
pub fn format_price(precio: &str) -> String {
    let value = precio.trim().parse::<f64>().unwrap_or(0.0);
    format_price_f64(value)
}

pub fn format_price_f64(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let negative = value < 0.0;
    // Three fraction digits at most, trailing zeros dropped.
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let int_part = rounded.trunc() as u64;
    let frac = rounded - rounded.trunc();

    let mut out = group_thousands(int_part);
    if frac > 0.0 {
        let digits = format!("{:.3}", frac);
        let digits = digits.trim_start_matches("0.").trim_end_matches('0');
        if !digits.is_empty() {
            out.push(',');
            out.push_str(digits);
        }
    }
    if negative && (int_part > 0 || frac > 0.0) {
        out.insert(0, '-');
    }
    out
}

fn group_thousands(mut n: u64) -> String {
    if n < 1000 {
        return n.to_string();
    }
    let mut groups = Vec::new();
    while n >= 1000 {
        groups.push(format!("{:03}", n % 1000));
        n /= 1000;
    }
    let mut out = n.to_string();
    for group in groups.iter().rev() {
        out.push('.');
        out.push_str(group);
    }
    out
}

/// Format an ISO-ish date (`YYYY-MM-DD`, optionally with a time suffix) as
/// `D/M/YYYY`. Unparseable input formats as the empty string.
pub fn format_date(date: &str) -> String {
    let date_part = date.trim().split(['T', ' ']).next().unwrap_or_default();
    let mut parts = date_part.split('-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return String::new();
    };
    let (Ok(year), Ok(month), Ok(day)) = (
        year.parse::<i32>(),
        month.parse::<u32>(),
        day.parse::<u32>(),
    ) else {
        return String::new();
    };
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return String::new();
    }
    format!("{}/{}/{}", day, month, year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_thousands() {
        assert_eq!(format_price("45000"), "45.000");
        assert_eq!(format_price("1250000"), "1.250.000");
        assert_eq!(format_price("999"), "999");
        assert_eq!(format_price("0"), "0");
    }

    #[test]
    fn test_format_price_decimals() {
        assert_eq!(format_price("45000.5"), "45.000,5");
        assert_eq!(format_price_f64(1234.25), "1.234,25");
    }

    #[test]
    fn test_format_price_garbage_is_zero() {
        assert_eq!(format_price("no-precio"), "0");
        assert_eq!(format_price(""), "0");
        assert_eq!(format_price_f64(f64::NAN), "0");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-03-07"), "7/3/2025");
        assert_eq!(format_date("2024-12-25T10:30:00Z"), "25/12/2024");
        assert_eq!(format_date("2024-12-25 10:30:00"), "25/12/2024");
    }

    #[test]
    fn test_format_date_invalid() {
        assert_eq!(format_date("mañana"), "");
        assert_eq!(format_date("2024-13-01"), "");
        assert_eq!(format_date(""), "");
    }
}
