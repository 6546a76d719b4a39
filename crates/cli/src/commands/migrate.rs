//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! mercata-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `MERCATA_DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migration files live in `crates/api/migrations/` and are embedded into
//! the binary at compile time via `sqlx::migrate!`.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::CommandError;

/// Run all pending database migrations.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
