//! Conversion of the raw span texts on the ticket page into typed values.
//!
//! Prices use a decimal comma (`€ 12,50 per stuk`). Thousands separators
//! (`€1.000,00`) are not handled and come back as a parse error.

use crate::error::{AppError, Result};

const AVAILABILITY_UNIT: &str = "beschikbaar";
const CURRENCY_SYMBOL: &str = "€";
const PRICE_UNIT: &str = "per stuk";

/// `"5 beschikbaar"` → 5. The unit word is matched case-insensitively.
pub fn parse_availability(text: &str) -> Result<u32> {
    let cleaned = text.to_lowercase().replace(AVAILABILITY_UNIT, "");
    cleaned.trim().parse::<u32>().map_err(|_| AppError::Parse {
        field: "availability",
        input: text.to_string(),
    })
}

/// `"€ 12,50 per stuk"` → 12.5
pub fn parse_price(text: &str) -> Result<f64> {
    let cleaned = text
        .replace(CURRENCY_SYMBOL, "")
        .replace(PRICE_UNIT, "")
        .replace(',', ".");
    match cleaned.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(AppError::Parse {
            field: "price",
            input: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_strips_unit_word() {
        assert_eq!(parse_availability("5 beschikbaar").unwrap(), 5);
        assert_eq!(parse_availability("  12 Beschikbaar ").unwrap(), 12);
        assert_eq!(parse_availability("0").unwrap(), 0);
    }

    #[test]
    fn availability_rejects_garbage() {
        assert!(matches!(
            parse_availability("abc"),
            Err(AppError::Parse { field: "availability", .. })
        ));
        assert!(parse_availability("").is_err());
        assert!(parse_availability("-3 beschikbaar").is_err());
    }

    #[test]
    fn price_handles_decimal_comma_and_unit() {
        assert_eq!(parse_price("€ 12,50 per stuk").unwrap(), 12.50);
        assert_eq!(parse_price("€289,00").unwrap(), 289.0);
        assert_eq!(parse_price("40").unwrap(), 40.0);
    }

    #[test]
    fn price_rejects_malformed_input() {
        assert!(matches!(
            parse_price("gratis"),
            Err(AppError::Parse { field: "price", .. })
        ));
        assert!(parse_price("€ per stuk").is_err());
        assert!(parse_price("€ -5,00").is_err());
        assert!(parse_price("inf").is_err());
    }
}
