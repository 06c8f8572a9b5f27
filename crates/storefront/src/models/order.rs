//! Order history types.

use rust_decimal::Decimal;

use super::product::Product;

/// One historical checkout transaction, identified by its reference.
///
/// All order line items created by one successful checkout share a
/// `reference`; listing returns one group per reference in first-seen order.
#[derive(Debug, Clone)]
pub struct OrderGroup {
    /// Per-checkout grouping key (UUID).
    pub reference: String,
    /// Purchase timestamp (`YYYY-MM-DD HH:MM:SS`), shared by the group.
    pub placed_at: String,
}

/// One purchased line item paired with its product.
#[derive(Debug, Clone)]
pub struct PurchasedLine {
    /// The purchased product.
    pub product: Product,
    /// Units purchased.
    pub quantity: i64,
    /// price x quantity.
    pub line_total: Decimal,
}

/// The detail view of one checkout transaction.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    /// The group being displayed.
    pub group: OrderGroup,
    /// Line items of the purchase.
    pub lines: Vec<PurchasedLine>,
    /// Sum of all line totals.
    pub total: Decimal,
}
