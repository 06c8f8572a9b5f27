//! Stripe checkout API client.
//!
//! Talks to `POST /v1/checkout/sessions` with form-encoded parameters, the
//! wire format Stripe's API expects. Requests carry a bounded timeout; an
//! expired call surfaces as [`StripeError::Http`] and is reported to the
//! user as a checkout failure, never retried automatically.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{CheckoutProvider, CheckoutSession, LineItem, StripeError};
use crate::config::StripeConfig;

/// Request timeout for Stripe API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Stripe checkout API.
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
    secret_key: SecretString,
}

impl StripeClient {
    /// Create a new Stripe client from configuration.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized (startup-time only).
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build http client");

        Self {
            client,
            api_base: config.api_base.clone(),
            secret_key: config.secret_key.clone(),
        }
    }

    /// Flatten line items into Stripe's indexed form-parameter encoding.
    fn session_params(
        line_items: &[LineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_owned(), "payment".to_owned()),
            ("payment_method_types[0]".to_owned(), "card".to_owned()),
            ("success_url".to_owned(), success_url.to_owned()),
            ("cancel_url".to_owned(), cancel_url.to_owned()),
        ];

        for (i, item) in line_items.iter().enumerate() {
            params.push((format!("line_items[{i}][price]"), item.price.clone()));
            params.push((
                format!("line_items[{i}][quantity]"),
                item.quantity.to_string(),
            ));
        }

        params
    }
}

/// Error body returned by Stripe on non-success responses.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

#[async_trait]
impl CheckoutProvider for StripeClient {
    #[instrument(skip(self, line_items))]
    async fn create_session(
        &self,
        line_items: &[LineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let params = Self::session_params(line_items, success_url, cancel_url);

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| body.chars().take(200).collect());

            tracing::error!(status = %status, %message, "stripe session creation failed");
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = serde_json::from_str(&body)?;
        tracing::debug!(session_id = %session.id, "created stripe checkout session");

        Ok(session)
    }
}
