//! Cart route handlers.
//!
//! All cart routes require a logged-in user; the cart lives in the database,
//! keyed by user, so it survives logout and new devices.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use pixel_den_core::ProductId;

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CartLine, CurrentUser};
use crate::services::CartService;
use crate::state::AppState;

/// Form data identifying one product.
#[derive(Debug, Deserialize)]
pub struct CartForm {
    pub product_id: i64,
}

/// Query parameters for notice display.
#[derive(Debug, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

/// One cart line prepared for rendering.
pub struct CartLineView {
    pub product_id: i64,
    pub name: String,
    pub image_url: String,
    pub unit_price: String,
    pub quantity: i64,
    pub line_total: String,
}

impl From<CartLine> for CartLineView {
    fn from(line: CartLine) -> Self {
        Self {
            product_id: line.product.id.as_i64(),
            name: line.product.name,
            image_url: line.product.image_url,
            unit_price: line.product.price.to_string(),
            quantity: line.quantity,
            line_total: format!("${:.2}", line.line_total),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub user: CurrentUser,
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub notice: Option<String>,
}

/// Translate a notice code from the query string into a display message.
fn notice_message(code: &str) -> Option<String> {
    let message = match code {
        "empty_cart" => "Your cart is empty. Add something first!",
        "checkout_failed" => "We couldn't start the checkout. Please try again.",
        "cancelled" => "Checkout cancelled. Your cart is untouched.",
        _ => return None,
    };
    Some(message.to_owned())
}

/// Display the cart page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<NoticeQuery>,
) -> Result<impl IntoResponse> {
    let summary = CartService::new(state.pool()).summary(user.id).await?;

    Ok(CartTemplate {
        user,
        lines: summary.lines.into_iter().map(CartLineView::from).collect(),
        total: format!("${:.2}", summary.total),
        notice: query.notice.as_deref().and_then(notice_message),
    })
}

/// Add one unit of a product to the cart.
#[instrument(skip_all, fields(product_id = form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CartForm>,
) -> Result<Response> {
    let result = CartService::new(state.pool())
        .add(user.id, ProductId::new(form.product_id))
        .await;

    match result {
        Ok(()) => Ok(Redirect::to("/cart").into_response()),
        Err(RepositoryError::NotFound) => Err(AppError::BadRequest(format!(
            "unknown product {}",
            form.product_id
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Remove one unit of a product from the cart.
#[instrument(skip_all, fields(product_id = form.product_id))]
pub async fn reduce(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CartForm>,
) -> Result<Response> {
    CartService::new(state.pool())
        .reduce(user.id, ProductId::new(form.product_id))
        .await?;

    Ok(Redirect::to("/cart").into_response())
}

/// Remove all units of a product from the cart.
#[instrument(skip_all, fields(product_id = form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CartForm>,
) -> Result<Response> {
    CartService::new(state.pool())
        .remove(user.id, ProductId::new(form.product_id))
        .await?;

    Ok(Redirect::to("/cart").into_response())
}
