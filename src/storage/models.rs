//! Subscription record types shared between the storage and API layers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored subscription row.
///
/// `end_date` is `None` for open-ended subscriptions and serializes as
/// JSON `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    /// Server-generated primary key, stable for the record's lifetime
    pub id: i64,
    /// Name of the subscribed service
    pub service_name: String,
    /// Price in whole integer units
    pub price: i64,
    /// Owning user
    pub user_id: Uuid,
    /// First day the subscription is valid
    pub start_date: NaiveDate,
    /// Last day the subscription is valid, if bounded
    pub end_date: Option<NaiveDate>,
}

/// The writable fields of a subscription, used for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}
