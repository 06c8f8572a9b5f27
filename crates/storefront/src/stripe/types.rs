//! Stripe API types.

use serde::{Deserialize, Serialize};

/// One checkout line item: a Stripe price identifier and a unit count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// Stripe price identifier (the product's `stripe_price_id`).
    pub price: String,
    /// Units of the product.
    pub quantity: i64,
}

/// A created hosted checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Stripe session identifier (e.g. `cs_test_...`).
    pub id: String,
    /// Hosted checkout page URL the browser is redirected to.
    pub url: String,
}
