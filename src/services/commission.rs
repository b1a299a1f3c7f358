//! Per-platform commission rates
//!
//! Used when a webhook reports an order value without an explicit
//! commission amount.

use rust_decimal::Decimal;

/// Commission rate for a platform. Unknown platforms get the 5% default.
pub fn rate_for(platform: &str) -> Decimal {
    match platform.to_lowercase().as_str() {
        "amazon" => Decimal::new(4, 2),
        "ebay" => Decimal::new(6, 2),
        "aliexpress" => Decimal::new(7, 2),
        "temu" => Decimal::new(8, 2),
        "shein" => Decimal::new(5, 2),
        "alibaba" => Decimal::new(6, 2),
        _ => Decimal::new(5, 2),
    }
}

/// Commission owed for an order value, rounded to cents
pub fn calculate(order_value: Decimal, platform: &str) -> Decimal {
    (order_value * rate_for(platform)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn platform_rates() {
        assert_eq!(rate_for("amazon"), Decimal::from_str("0.04").unwrap());
        assert_eq!(rate_for("temu"), Decimal::from_str("0.08").unwrap());
        assert_eq!(rate_for("Amazon"), Decimal::from_str("0.04").unwrap());
        assert_eq!(rate_for("unknown-shop"), Decimal::from_str("0.05").unwrap());
    }

    #[test]
    fn commission_is_rounded_to_cents() {
        let value = Decimal::from_str("33.33").unwrap();
        assert_eq!(
            calculate(value, "aliexpress"),
            Decimal::from_str("2.33").unwrap()
        );
        assert_eq!(
            calculate(Decimal::from(100), "temu"),
            Decimal::from_str("8.00").unwrap()
        );
    }
}
