//! Order history route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, OrderDetail, OrderGroup, PurchasedLine};
use crate::services::OrderService;
use crate::state::AppState;

/// One past purchase prepared for the listing.
pub struct OrderGroupView {
    pub reference: String,
    pub placed_at: String,
}

impl From<OrderGroup> for OrderGroupView {
    fn from(group: OrderGroup) -> Self {
        Self {
            reference: group.reference,
            placed_at: group.placed_at,
        }
    }
}

/// One purchased line prepared for rendering.
pub struct PurchasedLineView {
    pub name: String,
    pub image_url: String,
    pub unit_price: String,
    pub quantity: i64,
    pub line_total: String,
}

impl From<PurchasedLine> for PurchasedLineView {
    fn from(line: PurchasedLine) -> Self {
        Self {
            name: line.product.name,
            image_url: line.product.image_url,
            unit_price: line.product.price.to_string(),
            quantity: line.quantity,
            line_total: format!("${:.2}", line.line_total),
        }
    }
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub user: CurrentUser,
    pub groups: Vec<OrderGroupView>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/detail.html")]
pub struct OrderDetailTemplate {
    pub user: CurrentUser,
    pub reference: String,
    pub placed_at: String,
    pub lines: Vec<PurchasedLineView>,
    pub total: String,
}

impl OrderDetailTemplate {
    fn new(user: CurrentUser, detail: OrderDetail) -> Self {
        Self {
            user,
            reference: detail.group.reference,
            placed_at: detail.group.placed_at,
            lines: detail
                .lines
                .into_iter()
                .map(PurchasedLineView::from)
                .collect(),
            total: format!("${:.2}", detail.total),
        }
    }
}

/// Display the user's purchase history.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let groups = OrderService::new(state.pool()).list(user.id).await?;

    Ok(OrdersTemplate {
        user,
        groups: groups.into_iter().map(OrderGroupView::from).collect(),
    })
}

/// Display one past purchase in detail.
#[instrument(skip_all, fields(reference = %reference))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse> {
    let detail = OrderService::new(state.pool())
        .detail(user.id, &reference)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("order {reference}")),
            other => AppError::from(other),
        })?;

    Ok(OrderDetailTemplate::new(user, detail))
}
