//! Subscription persistence
//!
//! `SubscriptionStore` is the capability contract handlers depend on;
//! `PgSubscriptionRepo` is its PostgreSQL implementation. The repo owns the
//! table lifecycle and maps "no rows" distinctly from other driver errors so
//! the API layer can answer 404 versus 500.

use crate::error::AppError;
use crate::storage::models::{NewSubscription, Subscription};
use crate::storage::query::{build_amount_query, AmountFilter, QueryParam};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, error};

/// Storage contract for subscription records.
///
/// Implemented by any backend; handlers hold it as `Arc<dyn SubscriptionStore>`.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert a record, returning the server-assigned id.
    async fn create(&self, sub: &NewSubscription) -> Result<i64, AppError>;

    /// Fetch exactly one record by id.
    async fn get(&self, id: i64) -> Result<Subscription, AppError>;

    /// Replace all writable fields of the record with the given id.
    async fn update(&self, id: i64, sub: &NewSubscription) -> Result<i64, AppError>;

    /// Remove the record with the given id. Deleting an absent id is not an
    /// error.
    async fn delete(&self, id: i64) -> Result<i64, AppError>;

    /// Fetch every record, ordered by id.
    async fn get_all(&self) -> Result<Vec<Subscription>, AppError>;

    /// Sum `price` over the records matching the filter. No matching rows
    /// yields 0.
    async fn get_amount(&self, filter: &AmountFilter) -> Result<i64, AppError>;
}

/// PostgreSQL-backed subscription store.
#[derive(Clone)]
pub struct PgSubscriptionRepo {
    pool: PgPool,
}

impl PgSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the subscriptions table if it does not exist yet.
    pub async fn ensure_table(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscriptions (
                id bigserial NOT NULL,
                service_name varchar NOT NULL,
                price bigint NOT NULL,
                user_id uuid NOT NULL,
                start_date date NOT NULL,
                end_date date,
                CONSTRAINT subscriptions_pk PRIMARY KEY (id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("subscriptions.create_table", e))?;

        debug!("subscriptions table ready");
        Ok(())
    }
}

/// Log a failed statement with its operation tag before propagating.
fn db_error(op: &str, err: sqlx::Error) -> AppError {
    error!(op, error = %err, "database operation failed");
    AppError::Database(err)
}

/// As `db_error`, but a zero-row result becomes `NotFound` for the given id.
fn fetch_error(op: &str, id: i64, err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::RowNotFound => {
            error!(op, id, "no matching row");
            AppError::NotFound(id)
        }
        other => db_error(op, other),
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionRepo {
    async fn create(&self, sub: &NewSubscription) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&sub.service_name)
        .bind(sub.price)
        .bind(sub.user_id)
        .bind(sub.start_date)
        .bind(sub.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("subscriptions.create", e))?;

        debug!(id, "created subscription");
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Subscription, AppError> {
        sqlx::query_as::<_, Subscription>(
            "SELECT id, service_name, price, user_id, start_date, end_date \
             FROM subscriptions WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| fetch_error("subscriptions.get", id, e))
    }

    async fn update(&self, id: i64, sub: &NewSubscription) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            "UPDATE subscriptions \
             SET service_name = $1, price = $2, user_id = $3, start_date = $4, end_date = $5 \
             WHERE id = $6 RETURNING id",
        )
        .bind(&sub.service_name)
        .bind(sub.price)
        .bind(sub.user_id)
        .bind(sub.start_date)
        .bind(sub.end_date)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| fetch_error("subscriptions.update", id, e))?;

        debug!(id, "updated subscription");
        Ok(id)
    }

    async fn delete(&self, id: i64) -> Result<i64, AppError> {
        // Affected-row count is deliberately ignored: delete is idempotent.
        sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("subscriptions.delete", e))?;

        debug!(id, "deleted subscription");
        Ok(id)
    }

    async fn get_all(&self) -> Result<Vec<Subscription>, AppError> {
        sqlx::query_as::<_, Subscription>(
            "SELECT id, service_name, price, user_id, start_date, end_date \
             FROM subscriptions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("subscriptions.get_all", e))
    }

    async fn get_amount(&self, filter: &AmountFilter) -> Result<i64, AppError> {
        let (stmt, params) = build_amount_query(filter);

        let mut query = sqlx::query_scalar::<_, Option<i64>>(&stmt);
        for param in params {
            query = match param {
                QueryParam::Text(v) => query.bind(v),
                QueryParam::Uuid(v) => query.bind(v),
                QueryParam::Date(v) => query.bind(v),
            };
        }

        // SUM over zero rows is NULL, not an error
        let sum = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("subscriptions.get_amount", e))?;

        Ok(sum.unwrap_or(0))
    }
}
