//! Catalog seeding command.
//!
//! Inserts the console catalog. Safe to run repeatedly: products that
//! already exist are skipped.

use pixel_den_core::Price;
use pixel_den_storefront::db::RepositoryError;
use pixel_den_storefront::db::products::ProductRepository;

use super::CliError;

/// One catalog entry to seed.
struct SeedProduct {
    name: &'static str,
    price: &'static str,
    image_url: &'static str,
    stripe_price_id: &'static str,
}

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "ps4",
        price: "499",
        image_url: "https://m.media-amazon.com/images/I/61OL2zIliML._AC_UY327_FMwebp_QL65_.jpg",
        stripe_price_id: "price_1JMVnsCSW8vxpkyLICIPGyqC",
    },
    SeedProduct {
        name: "xbox one",
        price: "384",
        image_url: "https://m.media-amazon.com/images/I/612wQCy8x+L._AC_UY327_FMwebp_QL65_.jpg",
        stripe_price_id: "price_1JMVmyCSW8vxpkyLKTGBhXcq",
    },
    SeedProduct {
        name: "ps5",
        price: "1099",
        image_url: "https://m.media-amazon.com/images/I/31q4oLyLneL._AC_UY327_FMwebp_QL65_.jpg",
        stripe_price_id: "price_1JMVllCSW8vxpkyLowWDobdv",
    },
    SeedProduct {
        name: "switch",
        price: "119",
        image_url: "https://m.media-amazon.com/images/I/61CqIvtcrML._AC_UY327_FMwebp_QL65_.jpg",
        stripe_price_id: "price_1JMVjTCSW8vxpkyLbiZ8jgcN",
    },
];

/// Seed the product catalog.
pub async fn run() -> Result<(), CliError> {
    let pool = super::connect().await?;
    let products = ProductRepository::new(&pool);

    for entry in CATALOG {
        let price = Price::parse(entry.price)
            .map_err(|e| RepositoryError::DataCorruption(format!("bad seed price: {e}")))?;

        match products
            .create(entry.name, price, entry.image_url, entry.stripe_price_id)
            .await
        {
            Ok(product) => tracing::info!(name = %product.name, "seeded product"),
            Err(RepositoryError::Conflict(_)) => {
                tracing::info!(name = entry.name, "product already exists, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!("Catalog seeding complete");

    Ok(())
}
