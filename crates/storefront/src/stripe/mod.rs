//! Stripe hosted-checkout integration.
//!
//! The storefront never processes card data: checkout is delegated entirely
//! to Stripe's hosted checkout page. This module exposes the one operation
//! the flow needs — create a checkout session from a line-item list — behind
//! the [`CheckoutProvider`] trait so tests can substitute a mock provider.

mod client;
mod error;
mod types;

pub use client::StripeClient;
pub use error::StripeError;
pub use types::{CheckoutSession, LineItem};

use async_trait::async_trait;

/// The payment-provider seam used by the checkout orchestrator.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Create a hosted checkout session for the given line items.
    ///
    /// `success_url` and `cancel_url` are the absolute callback URLs the
    /// provider redirects the browser to after payment or cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError`] if the provider call fails; the caller must
    /// treat any failure as a checkout-creation error, never as a session.
    async fn create_session(
        &self,
        line_items: &[LineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, StripeError>;
}
