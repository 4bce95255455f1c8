//! Subscription API handlers
//!
//! Contains HTTP request handlers for subscription CRUD operations and the
//! price aggregation endpoint. Handlers depend only on the
//! `SubscriptionStore` contract, never on the concrete PostgreSQL repo.

use crate::api::AppState;
use crate::error::AppError;
use crate::storage::models::{NewSubscription, Subscription};
use crate::storage::query::AmountFilter;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Create/update request body
#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    /// Name of the subscribed service
    pub service_name: String,
    /// Price in whole integer units
    pub price: i64,
    /// Owning user
    pub user_id: Uuid,
    /// Month the subscription starts, `MM-YYYY` or `YYYY-MM`
    pub start_date: String,
    /// Month the subscription ends; absent or empty means open-ended
    #[serde(default)]
    pub end_date: Option<String>,
}

/// `?id=` query parameter for get/update/delete
#[derive(Debug, Deserialize)]
pub struct IdParams {
    pub id: i64,
}

/// Optional filters for the amount endpoint; empty strings count as absent
#[derive(Debug, Default, Deserialize)]
pub struct AmountParams {
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Amount response; the field name is capitalized on the wire
#[derive(Debug, Serialize)]
pub struct AmountResponse {
    #[serde(rename = "Amount")]
    pub amount: i64,
}

impl SubscriptionRequest {
    /// Validate the request and normalize its month strings into dates.
    fn into_new_subscription(self) -> Result<NewSubscription, AppError> {
        if self.service_name.trim().is_empty() {
            return Err(AppError::Validation(
                "service_name must not be empty".to_string(),
            ));
        }

        let start_date = parse_month(&self.start_date)?;
        let end_date = match self.end_date.as_deref() {
            Some(s) if !s.is_empty() => Some(parse_month(s)?),
            _ => None,
        };

        Ok(NewSubscription {
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_date,
            end_date,
        })
    }
}

/// Parse a subscription month into the first day of that month.
///
/// Accepts both `MM-YYYY` (the original wire format, e.g. `07-2025`) and
/// `YYYY-MM`: a 4-digit first segment is taken as the year.
fn parse_month(input: &str) -> Result<NaiveDate, AppError> {
    let invalid = || AppError::InvalidDate(input.to_string());

    let parts: Vec<&str> = input.split('-').collect();
    let [first, second] = parts.as_slice() else {
        return Err(invalid());
    };

    let (year, month) = if first.len() == 4 {
        (*first, *second)
    } else {
        (*second, *first)
    };

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Parse an amount filter date: a full `YYYY-MM-DD`, or a month accepted by
/// [`parse_month`].
fn parse_filter_date(input: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").or_else(|_| parse_month(input))
}

impl AmountParams {
    fn into_filter(self) -> Result<AmountFilter, AppError> {
        let non_empty = |value: Option<String>| value.filter(|s| !s.is_empty());

        let user_id = match non_empty(self.user_id) {
            Some(s) => Some(
                Uuid::parse_str(&s)
                    .map_err(|_| AppError::Validation(format!("invalid user_id `{s}`")))?,
            ),
            None => None,
        };
        let start_date = match non_empty(self.start_date) {
            Some(s) => Some(parse_filter_date(&s)?),
            None => None,
        };
        let end_date = match non_empty(self.end_date) {
            Some(s) => Some(parse_filter_date(&s)?),
            None => None,
        };

        Ok(AmountFilter {
            service_name: non_empty(self.service_name),
            user_id,
            start_date,
            end_date,
        })
    }
}

/// POST /createsub - Record a new subscription
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(request): Json<SubscriptionRequest>,
) -> Result<StatusCode, AppError> {
    let sub = request.into_new_subscription()?;
    let id = state.store.create(&sub).await?;
    tracing::info!(id, "subscription created");
    Ok(StatusCode::CREATED)
}

/// GET /getsub?id= - Fetch a single subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
) -> Result<Json<Subscription>, AppError> {
    let subscription = state.store.get(params.id).await?;
    Ok(Json(subscription))
}

/// PUT /updatesub?id= - Replace all fields of a subscription
pub async fn update_subscription(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
    Json(request): Json<SubscriptionRequest>,
) -> Result<StatusCode, AppError> {
    let sub = request.into_new_subscription()?;
    state.store.update(params.id, &sub).await?;
    tracing::info!(id = params.id, "subscription updated");
    Ok(StatusCode::OK)
}

/// DELETE /deletesub?id= - Remove a subscription (idempotent)
pub async fn delete_subscription(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
) -> Result<StatusCode, AppError> {
    state.store.delete(params.id).await?;
    tracing::info!(id = params.id, "subscription deleted");
    Ok(StatusCode::OK)
}

/// GET /list - All subscriptions, ordered by id
pub async fn list_subscriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Subscription>>, AppError> {
    let subscriptions = state.store.get_all().await?;
    Ok(Json(subscriptions))
}

/// GET /amount - Sum of prices over the optionally filtered records
pub async fn amount(
    State(state): State<AppState>,
    Query(params): Query<AmountParams>,
) -> Result<Json<AmountResponse>, AppError> {
    let filter = params.into_filter()?;
    let amount = state.store.get_amount(&filter).await?;
    Ok(Json(AmountResponse { amount }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_month_mm_yyyy() {
        assert_eq!(parse_month("07-2025").unwrap(), date(2025, 7, 1));
        assert_eq!(parse_month("12-2024").unwrap(), date(2024, 12, 1));
    }

    #[test]
    fn test_parse_month_yyyy_mm() {
        assert_eq!(parse_month("2024-01").unwrap(), date(2024, 1, 1));
        assert_eq!(parse_month("2025-11").unwrap(), date(2025, 11, 1));
    }

    #[test]
    fn test_parse_month_rejects_garbage() {
        assert!(parse_month("").is_err());
        assert!(parse_month("2024").is_err());
        assert!(parse_month("13-2024").is_err());
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("2024-01-01").is_err());
        assert!(parse_month("jan-2024").is_err());
    }

    #[test]
    fn test_parse_filter_date_accepts_full_dates_and_months() {
        assert_eq!(parse_filter_date("2024-06-01").unwrap(), date(2024, 6, 1));
        assert_eq!(parse_filter_date("2024-06-15").unwrap(), date(2024, 6, 15));
        assert_eq!(parse_filter_date("06-2024").unwrap(), date(2024, 6, 1));
        assert!(parse_filter_date("not-a-date").is_err());
    }

    #[test]
    fn test_request_rejects_empty_service_name() {
        let request = SubscriptionRequest {
            service_name: "  ".to_string(),
            price: 500,
            user_id: Uuid::new_v4(),
            start_date: "07-2025".to_string(),
            end_date: None,
        };
        assert!(matches!(
            request.into_new_subscription(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_request_empty_end_date_means_open_ended() {
        let request = SubscriptionRequest {
            service_name: "netflix".to_string(),
            price: 500,
            user_id: Uuid::new_v4(),
            start_date: "07-2025".to_string(),
            end_date: Some(String::new()),
        };
        let sub = request.into_new_subscription().unwrap();
        assert_eq!(sub.start_date, date(2025, 7, 1));
        assert_eq!(sub.end_date, None);
    }

    #[test]
    fn test_amount_params_empty_strings_are_absent() {
        let params = AmountParams {
            service_name: Some(String::new()),
            user_id: Some(String::new()),
            start_date: None,
            end_date: Some(String::new()),
        };
        let filter = params.into_filter().unwrap();
        assert_eq!(filter, AmountFilter::default());
    }

    #[test]
    fn test_amount_params_malformed_user_id_rejected() {
        let params = AmountParams {
            user_id: Some("not-a-uuid".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            params.into_filter(),
            Err(AppError::Validation(_))
        ));
    }
}
