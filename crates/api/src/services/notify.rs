//! Fire-and-forget order and login notifications.
//!
//! Notification sends must never block or fail a request: every send is
//! spawned onto the runtime and failures are only logged. SMS silently
//! no-ops when the gateway is not configured or the user has no phone.

use rust_decimal::Decimal;

use mercata_core::{OrderStatus, Phone};

use super::sms::SmsService;

/// Dispatches best-effort notifications.
#[derive(Clone, Debug)]
pub struct NotificationService {
    sms: Option<SmsService>,
}

impl NotificationService {
    /// Create a notification service; `sms` is `None` when no gateway is
    /// configured.
    #[must_use]
    pub const fn new(sms: Option<SmsService>) -> Self {
        Self { sms }
    }

    /// Notify a customer that their order was placed.
    pub fn order_placed(&self, phone: Option<&Phone>, order_number: &str, total: Decimal) {
        let body = format!("Your order {order_number} for {total} has been received. Thank you!");
        self.send_sms(phone, body);
    }

    /// Notify a customer about an order status change.
    pub fn order_status_changed(
        &self,
        phone: Option<&Phone>,
        order_number: &str,
        status: OrderStatus,
    ) {
        let body = format!("Update on order {order_number}: status is now {status}.");
        self.send_sms(phone, body);
    }

    /// Notify a user about a login to their account.
    pub fn login_alert(&self, phone: Option<&Phone>, name: &str) {
        let body = format!("Hi {name}, a new login to your Mercata account just occurred.");
        self.send_sms(phone, body);
    }

    fn send_sms(&self, phone: Option<&Phone>, body: String) {
        let (Some(sms), Some(phone)) = (self.sms.clone(), phone.cloned()) else {
            return;
        };

        tokio::spawn(async move {
            if let Err(e) = sms.send(&phone, &body).await {
                tracing::warn!(error = %e, to = %phone, "SMS notification failed");
            }
        });
    }
}
