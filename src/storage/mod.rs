//! PostgreSQL storage layer
//!
//! `Storage` owns the connection pool for the process lifetime: it is built
//! once at startup from config, bootstraps the schema, hands out repositories
//! and is closed explicitly on shutdown.

pub mod models;
pub mod query;
pub mod repository;

pub use models::{NewSubscription, Subscription};
pub use query::AmountFilter;
pub use repository::{PgSubscriptionRepo, SubscriptionStore};

use crate::config::PostgresConfig;
use crate::error::AppError;
use anyhow::Context;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::str::FromStr;
use tracing::info;

/// Process-wide database handle.
pub struct Storage {
    pool: PgPool,
}

impl Storage {
    /// Connect to PostgreSQL and ensure the schema exists.
    ///
    /// A failure here (unreachable store, bad credentials) is fatal to the
    /// process; the caller propagates it out of `main`.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, AppError> {
        let ssl_mode = PgSslMode::from_str(&config.ssl_mode)
            .with_context(|| format!("invalid ssl_mode `{}`", config.ssl_mode))?;

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database)
            .ssl_mode(ssl_mode);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(AppError::Database)?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "connected to PostgreSQL"
        );

        let storage = Self { pool };
        storage.subscriptions().ensure_table().await?;

        Ok(storage)
    }

    /// Repository over this storage's pool.
    pub fn subscriptions(&self) -> PgSubscriptionRepo {
        PgSubscriptionRepo::new(self.pool.clone())
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("database pool closed");
    }
}
