//! HTTP server command
//!
//! Picks a document store backend, then runs the API until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use sisuo_server::config::{SessionConfig, StoreConfig};
use sisuo_server::http::{run_server, AppState, ServerConfig};
use sisuo_server::store::{create_pool, ensure_schema, DocumentStore, MemoryDocumentStore, PgDocumentStore};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep all data in memory and ignore any database URL
    #[arg(long)]
    pub memory: bool,
}

async fn open_store(args: &ServeArgs) -> Result<Arc<dyn DocumentStore>> {
    if args.memory {
        tracing::warn!("Using in-memory store - data is lost on shutdown");
        return Ok(Arc::new(MemoryDocumentStore::new()));
    }

    let mut config = StoreConfig::from_env();
    if let Some(url) = &args.database_url {
        config = config.with_database_url(url.clone());
    }

    let pool = create_pool(&config)
        .await
        .context("Failed to create database pool")?;
    ensure_schema(&pool)
        .await
        .context("Failed to prepare document schema")?;

    Ok(Arc::new(PgDocumentStore::new(pool, config.retry_policy())))
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let store = open_store(&args).await?;

    tracing::info!("Starting sisuo server on {}", args.bind);

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };
    let state = AppState::new(store, SessionConfig::from_env());

    // Blocks until shutdown
    run_server(state, config).await.context("Server error")?;

    Ok(())
}
