pub mod resolver;
pub mod valuation;

pub use resolver::RecommendationResolver;
pub use valuation::{ValuationError, ValuationService};

/// Format a price the way listing surfaces display it: crores from one
/// crore up, lakhs from one lakh up, plain rupees with thousands
/// separators below that.
pub fn format_price(price: f64) -> String {
    if price >= 10_000_000.0 {
        format!("₹{:.2} Cr", price / 10_000_000.0)
    } else if price >= 100_000.0 {
        format!("₹{:.2} L", price / 100_000.0)
    } else {
        format!("₹{}", group_thousands(price.round() as i64))
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crores_from_one_crore_up() {
        assert_eq!(format_price(12_500_000.0), "₹1.25 Cr");
        assert_eq!(format_price(10_000_000.0), "₹1.00 Cr");
    }

    #[test]
    fn lakhs_from_one_lakh_up() {
        assert_eq!(format_price(450_000.0), "₹4.50 L");
        assert_eq!(format_price(100_000.0), "₹1.00 L");
        assert_eq!(format_price(9_999_999.0), "₹100.00 L");
    }

    #[test]
    fn plain_rupees_below_one_lakh() {
        assert_eq!(format_price(45_000.0), "₹45,000");
        assert_eq!(format_price(999.0), "₹999");
        assert_eq!(format_price(0.0), "₹0");
    }
}
