//! Stripe API error types.

use thiserror::Error;

/// Errors from the Stripe checkout API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP transport error (including the bounded request timeout).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe rejected the request.
    #[error("stripe api error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by Stripe.
        status: u16,
        /// Error message from the response body, if any.
        message: String,
    },

    /// Response body could not be parsed.
    #[error("failed to parse stripe response: {0}")]
    Parse(#[from] serde_json::Error),
}
