//! Decimal money representation and line-item pricing arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new monetary amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The three-letter code as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

/// The computed amounts for a single order line.
///
/// The discount percentage applies to the gross amount; tax applies to the
/// discounted subtotal. Amounts are kept at full Decimal precision; display
/// rounding is a presentation concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    /// `unit_price * quantity` before any adjustment.
    pub gross: Decimal,
    /// Amount removed by the percentage discount.
    pub discount: Decimal,
    /// Tax charged on the discounted subtotal.
    pub tax: Decimal,
    /// Final line total: `(gross - discount) + tax`.
    pub total: Decimal,
}

impl LineAmounts {
    /// Compute the amounts for one order line.
    ///
    /// `discount_percent` and `tax_percent` are expressed as 0-100 values;
    /// callers are expected to have range-validated them already. The
    /// formula is
    /// `(unit_price * quantity) * (1 - discount/100) * (1 + tax/100)`.
    #[must_use]
    pub fn compute(
        unit_price: Decimal,
        quantity: u32,
        discount_percent: Decimal,
        tax_percent: Decimal,
    ) -> Self {
        let hundred = Decimal::from(100);
        let gross = unit_price * Decimal::from(quantity);
        let discount = gross * discount_percent / hundred;
        let discounted = gross - discount;
        let tax = discounted * tax_percent / hundred;

        Self {
            gross,
            discount,
            tax,
            total: discounted + tax,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_amounts_plain() {
        // 2 x 19.99 with no discount and no tax
        let line = LineAmounts::compute(Decimal::new(1999, 2), 2, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(line.gross, Decimal::new(3998, 2));
        assert_eq!(line.discount, Decimal::ZERO);
        assert_eq!(line.tax, Decimal::ZERO);
        assert_eq!(line.total, Decimal::new(3998, 2));
    }

    #[test]
    fn test_line_amounts_discount_and_tax() {
        // 3 x 100 with 10% discount then 20% tax on the discounted subtotal
        let line = LineAmounts::compute(
            Decimal::from(100),
            3,
            Decimal::from(10),
            Decimal::from(20),
        );
        assert_eq!(line.gross, Decimal::from(300));
        assert_eq!(line.discount, Decimal::from(30));
        assert_eq!(line.tax, Decimal::from(54));
        assert_eq!(line.total, Decimal::from(324));
    }

    #[test]
    fn test_line_amounts_full_discount() {
        // 100% discount zeroes the line even when tax is nonzero
        let line = LineAmounts::compute(
            Decimal::new(4950, 2),
            4,
            Decimal::from(100),
            Decimal::from(25),
        );
        assert_eq!(line.discount, line.gross);
        assert_eq!(line.tax, Decimal::ZERO);
        assert_eq!(line.total, Decimal::ZERO);
    }

    #[test]
    fn test_line_amounts_zero_tax() {
        let line = LineAmounts::compute(
            Decimal::new(1250, 2),
            2,
            Decimal::from(50),
            Decimal::ZERO,
        );
        assert_eq!(line.total, Decimal::new(1250, 2));
    }

    #[test]
    fn test_line_amounts_zero_quantity() {
        let line = LineAmounts::compute(Decimal::from(10), 0, Decimal::from(15), Decimal::from(5));
        assert_eq!(line.gross, Decimal::ZERO);
        assert_eq!(line.total, Decimal::ZERO);
    }

    #[test]
    fn test_line_amounts_matches_closed_form() {
        // total == gross * (1 - d/100) * (1 + t/100)
        let unit = Decimal::new(777, 2);
        let line = LineAmounts::compute(unit, 5, Decimal::new(125, 1), Decimal::new(825, 2));
        let expected = unit
            * Decimal::from(5)
            * (Decimal::ONE - Decimal::new(125, 3))
            * (Decimal::ONE + Decimal::new(825, 4));
        assert_eq!(line.total, expected);
    }

    #[test]
    fn test_currency_code_as_str() {
        assert_eq!(CurrencyCode::USD.as_str(), "USD");
        assert_eq!(CurrencyCode::EUR.as_str(), "EUR");
    }
}
