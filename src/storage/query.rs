//! Dynamic aggregation query construction
//!
//! Builds the `SELECT SUM(price)` statement for the amount endpoint from
//! whichever filters the caller supplied. Kept as a pure function so the
//! placeholder numbering can be tested without a database.

use chrono::NaiveDate;
use uuid::Uuid;

/// Optional filters for the price aggregation.
///
/// A `None` field means "do not filter on this column".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountFilter {
    pub service_name: Option<String>,
    pub user_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A positional query parameter, bound in the order the builder emitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
}

/// Builds the `SUM(price)` statement and its ordered parameter list.
///
/// Clauses are appended in a fixed order (service_name, user_id, start_date,
/// end_date), joined with `AND`, with placeholders numbered contiguously
/// from `$1` — the parameter list matches placeholder order exactly. With no
/// filters the statement has no WHERE clause and sums the whole table.
///
/// The end_date clause is `(end_date <= $n OR end_date IS NULL)`: open-ended
/// subscriptions always match an end_date filter.
///
/// The aggregate is cast back to bigint: `SUM` over a bigint column widens
/// to numeric, which would not decode as `Option<i64>`.
pub fn build_amount_query(filter: &AmountFilter) -> (String, Vec<QueryParam>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<QueryParam> = Vec::new();

    if let Some(service_name) = &filter.service_name {
        clauses.push(format!("service_name = ${}", params.len() + 1));
        params.push(QueryParam::Text(service_name.clone()));
    }
    if let Some(user_id) = filter.user_id {
        clauses.push(format!("user_id = ${}", params.len() + 1));
        params.push(QueryParam::Uuid(user_id));
    }
    if let Some(start_date) = filter.start_date {
        clauses.push(format!("start_date >= ${}", params.len() + 1));
        params.push(QueryParam::Date(start_date));
    }
    if let Some(end_date) = filter.end_date {
        clauses.push(format!(
            "(end_date <= ${} OR end_date IS NULL)",
            params.len() + 1
        ));
        params.push(QueryParam::Date(end_date));
    }

    let mut stmt = String::from("SELECT SUM(price)::bigint FROM subscriptions");
    if !clauses.is_empty() {
        stmt.push_str(" WHERE ");
        stmt.push_str(&clauses.join(" AND "));
    }

    (stmt, params)
}
