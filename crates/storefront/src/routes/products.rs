//! Product catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::products::ProductRepository;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, Product};
use crate::state::AppState;

/// One catalog entry prepared for rendering.
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub image_url: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name,
            price: product.price.to_string(),
            image_url: product.image_url,
        }
    }
}

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub user: Option<CurrentUser>,
    pub products: Vec<ProductView>,
}

/// Display the product catalog.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool()).list().await?;

    Ok(ProductsTemplate {
        user,
        products: products.into_iter().map(ProductView::from).collect(),
    })
}
