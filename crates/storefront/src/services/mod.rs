//! Business-logic services composing the repositories.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;

pub use auth::AuthService;
pub use cart::CartService;
pub use checkout::{CheckoutError, CheckoutService, PurchaseOutcome};
pub use orders::OrderService;
