//! Database migration command.

use pixel_den_storefront::db::MIGRATOR;

use super::CliError;

/// Run the storefront database migrations.
pub async fn run() -> Result<(), CliError> {
    let pool = super::connect().await?;

    tracing::info!("Running storefront migrations...");
    MIGRATOR.run(&pool).await?;
    tracing::info!("Storefront migrations complete");

    Ok(())
}
