//! PostgreSQL connection pool and schema bootstrap
//!
//! The pool is created once at startup and handed to `PgDocumentStore`.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::StoreConfig;

/// Create a PostgreSQL connection pool.
///
/// Fails if the first connection cannot be established, so a bad
/// `DATABASE_URL` stops the process at startup instead of on first request.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&StoreConfig::from_env()).await?;
/// ```
pub async fn create_pool(config: &StoreConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.op_timeout)
        .connect(&config.database_url)
        .await
}

/// Create the documents table if it does not exist.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Ensuring document store schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            seq BIGSERIAL PRIMARY KEY,
            collection TEXT NOT NULL,
            body JSONB NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_documents_body
        ON documents USING GIN (body jsonb_path_ops)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq)")
        .execute(pool)
        .await?;

    tracing::info!("Document store schema ready");
    Ok(())
}
