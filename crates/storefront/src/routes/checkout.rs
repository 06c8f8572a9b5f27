//! Checkout route handlers.
//!
//! Starting a checkout redirects the buyer to the hosted payment page. The
//! provider then redirects the browser back to the success or cancel
//! callback; those requests may arrive without a session cookie, so both
//! callbacks can recover the buyer from the single-use token in the URL.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pixel_den_core::UserId;

use crate::error::{AppError, Result, set_sentry_user};
use crate::middleware::{OptionalAuth, RequireAuth, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::{AuthService, CheckoutError, CheckoutService};
use crate::state::AppState;

/// Query parameters of the provider's callback redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub token: Option<String>,
}

/// Checkout success page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct SuccessTemplate {
    pub display_name: String,
    pub reference: String,
    pub line_count: usize,
}

/// Checkout cancel page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/cancel.html")]
pub struct CancelTemplate {}

/// Start a hosted checkout session for the current cart.
#[instrument(skip_all)]
pub async fn begin(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let service = CheckoutService::new(state.pool(), state.checkout(), &state.config().base_url);

    match service.begin(user.id).await {
        Ok(url) => Ok(Redirect::to(&url).into_response()),
        Err(CheckoutError::EmptyCart) => Ok(Redirect::to("/cart?notice=empty_cart").into_response()),
        Err(e @ CheckoutError::Provider(_)) => {
            sentry::capture_error(&e);
            tracing::error!(error = %e, "checkout session creation failed");
            Ok(Redirect::to("/cart?notice=checkout_failed").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolve the buyer behind a callback: session first, then the URL token.
///
/// A token that arrives alongside a live session is still consumed so it
/// cannot be replayed later.
async fn callback_identity(
    state: &AppState,
    user: Option<UserId>,
    token: Option<&str>,
) -> Result<Option<UserId>> {
    let service = CheckoutService::new(state.pool(), state.checkout(), &state.config().base_url);

    if let Some(user_id) = user {
        if let Some(token) = token
            && let Err(e @ CheckoutError::Repository(_)) = service.identity_for(token).await
        {
            return Err(e.into());
        }
        return Ok(Some(user_id));
    }

    let Some(token) = token else {
        return Ok(None);
    };

    match service.identity_for(token).await {
        Ok(user_id) => Ok(Some(user_id)),
        Err(CheckoutError::ExpiredSession) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Handle the provider's payment-completed redirect.
///
/// Converts the buyer's cart into order rows and shows the confirmation.
#[instrument(skip_all)]
pub async fn success(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    let session_user = user.map(|u| u.id);
    let Some(user_id) = callback_identity(&state, session_user, query.token.as_deref()).await?
    else {
        return Ok(Redirect::to("/auth/login?notice=checkout_expired").into_response());
    };

    let user = AuthService::new(state.pool()).get_user(user_id).await?;
    if session_user.is_none() {
        reestablish_session(&session, &user).await;
    }

    let service = CheckoutService::new(state.pool(), state.checkout(), &state.config().base_url);
    let outcome = service.complete_success(user_id).await.map_err(|e| {
        sentry::capture_error(&e);
        tracing::error!(error = %e, "failed to record purchase");
        AppError::from(e)
    })?;

    Ok(SuccessTemplate {
        display_name: user.display_name,
        reference: outcome.reference,
        line_count: outcome.line_count,
    }
    .into_response())
}

/// Handle the provider's payment-cancelled redirect.
///
/// The cart is left untouched; the token (if any) is consumed.
#[instrument(skip_all)]
pub async fn cancel(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    let session_user = user.map(|u| u.id);
    let Some(user_id) = callback_identity(&state, session_user, query.token.as_deref()).await?
    else {
        return Ok(Redirect::to("/auth/login?notice=checkout_expired").into_response());
    };

    if session_user.is_none() {
        let user = AuthService::new(state.pool()).get_user(user_id).await?;
        reestablish_session(&session, &user).await;
    }

    Ok(CancelTemplate {}.into_response())
}

/// Log the buyer back in after returning from the provider without a cookie.
///
/// A session-store failure here is logged but does not block the page: the
/// purchase outcome matters more than the cookie.
async fn reestablish_session(session: &Session, user: &User) {
    let current_user = CurrentUser::from(user);
    if let Err(e) = set_current_user(session, &current_user).await {
        tracing::warn!(error = %e, "failed to re-establish session after checkout");
        return;
    }
    set_sentry_user(&user.id, Some(user.email.as_ref()));
}
