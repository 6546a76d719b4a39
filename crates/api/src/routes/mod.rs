//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /api/auth/register          - Start OTP registration
//! POST /api/auth/verify            - Confirm OTP, create account
//! POST /api/auth/resend-code       - Re-issue the OTP code
//! POST /api/auth/login             - Login (throttled), returns bearer token
//! POST /api/auth/forgot-password   - Email a reset code
//! POST /api/auth/reset-password    - Reset password with code
//! GET  /api/auth/me                - Current user
//! PATCH /api/auth/me               - Update profile
//!
//! # Users (admin)
//! GET    /api/users                - List users
//! GET    /api/users/{id}           - Get user
//! POST   /api/users/{id}/role      - Change role
//! POST   /api/users/{id}/activate  - Reactivate
//! POST   /api/users/{id}/deactivate - Soft-disable
//! DELETE /api/users/{id}           - Delete
//!
//! # Catalog
//! GET  /api/categories             - Category tree (public: active only)
//! GET  /api/categories/{id}        - By id or slug
//! POST /api/categories             - Create (admin)
//! PUT  /api/categories/{id}        - Update (admin)
//! POST /api/categories/{id}/activate|deactivate - Toggle (admin, cascade down)
//! DELETE /api/categories/{id}      - Delete (admin)
//! GET/POST/PUT/DELETE /api/brands...        - Same shape as categories
//! GET  /api/products               - List with filters
//! GET  /api/products/featured      - Featured window
//! GET  /api/products/{id}          - By id or slug
//! POST /api/products               - Create (admin)
//! PUT  /api/products/{id}          - Update (admin)
//! DELETE /api/products/{id}        - Soft delete (admin)
//! POST /api/products/{id}/stock    - Adjust stock (admin)
//! POST /api/products/{id}/feature  - Feature/unfeature (admin)
//!
//! # Addresses (authenticated)
//! GET/POST /api/addresses, PUT/DELETE /api/addresses/{id},
//! POST /api/addresses/{id}/default
//!
//! # Orders
//! POST /api/orders                 - Place order (authenticated)
//! GET  /api/orders                 - Own orders; admins see all
//! GET  /api/orders/{id}            - Owner or admin
//! GET  /api/orders/{id}/tracking   - Tracking history
//! POST /api/orders/{id}/status     - Transition status (admin)
//! POST /api/orders/{id}/cancel     - Cancel (owner while pending; admin)
//!
//! # Transactions (admin)
//! GET/POST /api/transactions, GET /api/transactions/{id},
//! POST /api/transactions/{id}/refund, POST /api/transactions/{id}/void
//!
//! # Promo codes
//! GET/POST /api/promo-codes (admin), PUT/DELETE /api/promo-codes/{id} (admin),
//! POST /api/promo-codes/validate (public)
//!
//! # Uploads (admin)
//! POST /api/uploads                - Multipart image upload to object storage
//! ```

pub mod addresses;
pub mod auth;
pub mod brands;
pub mod categories;
pub mod orders;
pub mod products;
pub mod promo_codes;
pub mod transactions;
pub mod uploads;
pub mod users;

use axum::Router;
use serde::Deserialize;

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Assemble all API routes with their rate limiter layers.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::routes().layer(auth_rate_limiter()))
        .nest(
            "/api",
            Router::new()
                .nest("/users", users::routes())
                .nest("/categories", categories::routes())
                .nest("/brands", brands::routes())
                .nest("/products", products::routes())
                .nest("/addresses", addresses::routes())
                .nest("/orders", orders::routes())
                .nest("/transactions", transactions::routes())
                .nest("/promo-codes", promo_codes::routes())
                .nest("/uploads", uploads::routes())
                .layer(api_rate_limiter()),
        )
}

/// Common pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl Pagination {
    const DEFAULT_PER_PAGE: u32 = 20;
    const MAX_PER_PAGE: u32 = 100;

    /// `(limit, offset)` for the repository layer.
    #[must_use]
    pub fn limit_offset(&self) -> (i64, i64) {
        let per_page = self
            .per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE);
        let page = self.page.unwrap_or(1).max(1);
        (
            i64::from(per_page),
            i64::from(per_page) * i64::from(page - 1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination {
            page: None,
            per_page: None,
        };
        assert_eq!(p.limit_offset(), (20, 0));
    }

    #[test]
    fn test_pagination_page_offset() {
        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.limit_offset(), (10, 20));
    }

    #[test]
    fn test_pagination_clamps_per_page() {
        let p = Pagination {
            page: Some(1),
            per_page: Some(10_000),
        };
        assert_eq!(p.limit_offset(), (100, 0));
    }

    #[test]
    fn test_pagination_zero_page_treated_as_first() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(10),
        };
        assert_eq!(p.limit_offset(), (10, 0));
    }
}
