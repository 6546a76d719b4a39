//! Promo code domain type and validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use mercata_core::{DiscountKind, PromoCodeId};

/// Why a promo code cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromoCodeRejection {
    #[error("promo code is not active")]
    Inactive,
    #[error("promo code is not yet valid")]
    NotStarted,
    #[error("promo code has expired")]
    Expired,
    #[error("promo code usage limit reached")]
    UsageExhausted,
    #[error("order subtotal below the minimum of {0}")]
    BelowMinimum(Decimal),
}

/// A promotional discount code (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct PromoCode {
    pub id: PromoCodeId,
    /// Stored uppercase; lookups uppercase their input.
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromoCode {
    /// Compute the discount this code grants on `subtotal` at `now`.
    ///
    /// # Errors
    ///
    /// Returns the first applicable [`PromoCodeRejection`] when the code is
    /// inactive, outside its validity window, exhausted, or the subtotal is
    /// below the minimum.
    pub fn discount_for(
        &self,
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Decimal, PromoCodeRejection> {
        if !self.active {
            return Err(PromoCodeRejection::Inactive);
        }
        if self.starts_at.is_some_and(|starts| starts > now) {
            return Err(PromoCodeRejection::NotStarted);
        }
        if self.expires_at.is_some_and(|expires| expires <= now) {
            return Err(PromoCodeRejection::Expired);
        }
        if self
            .usage_limit
            .is_some_and(|limit| self.used_count >= limit)
        {
            return Err(PromoCodeRejection::UsageExhausted);
        }
        if let Some(min) = self.min_order_amount
            && subtotal < min
        {
            return Err(PromoCodeRejection::BelowMinimum(min));
        }

        let discount = match self.kind {
            DiscountKind::Percentage => subtotal * self.value / Decimal::from(100),
            DiscountKind::Fixed => self.value,
        };

        // A fixed discount never exceeds the subtotal.
        Ok(discount.min(subtotal))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn code(kind: DiscountKind, value: Decimal) -> PromoCode {
        PromoCode {
            id: PromoCodeId::new(1),
            code: "WELCOME10".to_string(),
            kind,
            value,
            min_order_amount: None,
            usage_limit: None,
            used_count: 0,
            starts_at: None,
            expires_at: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_percentage_discount() {
        let promo = code(DiscountKind::Percentage, Decimal::from(10));
        let discount = promo.discount_for(Decimal::from(200), Utc::now()).unwrap();
        assert_eq!(discount, Decimal::from(20));
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let promo = code(DiscountKind::Fixed, Decimal::from(50));
        let discount = promo.discount_for(Decimal::from(30), Utc::now()).unwrap();
        assert_eq!(discount, Decimal::from(30));
    }

    #[test]
    fn test_inactive_rejected() {
        let mut promo = code(DiscountKind::Fixed, Decimal::from(5));
        promo.active = false;
        assert_eq!(
            promo.discount_for(Decimal::from(100), Utc::now()),
            Err(PromoCodeRejection::Inactive)
        );
    }

    #[test]
    fn test_not_started_rejected() {
        let now = Utc::now();
        let mut promo = code(DiscountKind::Fixed, Decimal::from(5));
        promo.starts_at = Some(now + Duration::days(1));
        assert_eq!(
            promo.discount_for(Decimal::from(100), now),
            Err(PromoCodeRejection::NotStarted)
        );
    }

    #[test]
    fn test_expired_rejected() {
        let now = Utc::now();
        let mut promo = code(DiscountKind::Fixed, Decimal::from(5));
        promo.expires_at = Some(now - Duration::seconds(1));
        assert_eq!(
            promo.discount_for(Decimal::from(100), now),
            Err(PromoCodeRejection::Expired)
        );
    }

    #[test]
    fn test_usage_exhausted_rejected() {
        let mut promo = code(DiscountKind::Fixed, Decimal::from(5));
        promo.usage_limit = Some(3);
        promo.used_count = 3;
        assert_eq!(
            promo.discount_for(Decimal::from(100), Utc::now()),
            Err(PromoCodeRejection::UsageExhausted)
        );
    }

    #[test]
    fn test_below_minimum_rejected() {
        let mut promo = code(DiscountKind::Percentage, Decimal::from(10));
        promo.min_order_amount = Some(Decimal::from(50));
        assert_eq!(
            promo.discount_for(Decimal::from(49), Utc::now()),
            Err(PromoCodeRejection::BelowMinimum(Decimal::from(50)))
        );
    }
}
