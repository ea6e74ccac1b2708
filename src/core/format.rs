/// Rounds to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 兩位小數，去掉多餘的零；-0 一律印成 0
fn display_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let rounded = round2(value);
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

/// `0.8234` → `"82.34%"`; a missing fraction renders `"NaN%"`.
pub fn percentage(fraction: Option<f64>) -> String {
    let value = fraction.map(|f| f * 100.0).unwrap_or(f64::NAN);
    format!("{}%", display_number(value))
}

pub fn currency(amount: f64) -> String {
    format!("{} EUR", display_number(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_keeps_decimals() {
        assert_eq!(percentage(Some(0.8234)), "82.34%");
        assert_eq!(percentage(Some(0.8)), "80%");
        assert_eq!(percentage(Some(0.07)), "7%");
        assert_eq!(percentage(Some(1.0)), "100%");
        assert_eq!(percentage(Some(0.123456)), "12.35%");
    }

    #[test]
    fn test_missing_percentage_is_nan() {
        assert_eq!(percentage(None), "NaN%");
    }

    #[test]
    fn test_currency() {
        assert_eq!(currency(600.0), "600 EUR");
        assert_eq!(currency(-1234.5), "-1234.5 EUR");
        assert_eq!(currency(-0.0), "0 EUR");
        assert_eq!(currency(f64::NAN), "NaN EUR");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(599.996), 600.0);
        assert_eq!(round2(-3999.999), -4000.0);
        assert_eq!(round2(12.344), 12.34);
    }
}
