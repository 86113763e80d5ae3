// src/utils/money.rs

/// Round a currency amount to 2 decimal places for storage and display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Ride price from distance and tariff, never negative.
pub fn ride_price(distance_km: f64, tariff_per_km: f64) -> f64 {
    round2((distance_km * tariff_per_km).max(0.0))
}

/// Plain "123.45 CUP" rendering for log lines and receipts.
pub fn format_currency(value: f64) -> String {
    format!("{:.2} CUP", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round2(432.156), 432.16);
        assert_eq!(round2(960.004), 960.0);
        assert_eq!(round2(0.1 + 0.2), 0.3);
    }

    #[test]
    fn price_clamps_at_zero() {
        assert_eq!(ride_price(-3.0, 60.0), 0.0);
        assert_eq!(ride_price(16.0, 60.0), 960.0);
    }

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency(960.0), "960.00 CUP");
        assert_eq!(format_currency(0.5), "0.50 CUP");
    }
}
