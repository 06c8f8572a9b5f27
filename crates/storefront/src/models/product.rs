//! Product model.

use pixel_den_core::{Price, ProductId};

/// A catalog product.
///
/// Products are seed data: created by `pd-cli seed`, never mutated by the
/// request flow.
#[derive(Debug, Clone)]
pub struct Product {
    /// Database ID.
    pub id: ProductId,
    /// Unique product name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URL for display.
    pub image_url: String,
    /// Stripe price identifier used for hosted checkout line items.
    pub stripe_price_id: String,
}
