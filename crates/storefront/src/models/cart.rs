//! Aggregated cart types.

use rust_decimal::Decimal;

use super::product::Product;

/// One aggregated cart line: a product and how many units of it.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// The product in the cart.
    pub product: Product,
    /// Units of the product (always >= 1).
    pub quantity: i64,
    /// price x quantity.
    pub line_total: Decimal,
}

/// The aggregated cart for one user.
#[derive(Debug, Clone)]
pub struct CartSummary {
    /// Aggregated lines, stable within one call (cart insertion order).
    pub lines: Vec<CartLine>,
    /// Sum of all line totals.
    pub total: Decimal,
}

impl CartSummary {
    /// True when the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}
