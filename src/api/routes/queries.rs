//! Query Routes
//!
//! The two read-only analytics endpoints:
//!
//! - GET /1/queries/count/:prefix - distinct queries in the span
//! - GET /1/queries/popular/:prefix?size=N - top-N queries by frequency

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CountResponse, PopularEntry, PopularParams, PopularResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /1/queries/count/:prefix
///
/// Resolve the date prefix and return the number of distinct queries in
/// the span it denotes.
pub async fn count(
    State(state): State<Arc<AppState>>,
    Path(prefix): Path<String>,
) -> ApiResult<Json<CountResponse>> {
    tracing::debug!(prefix = %prefix, "count request");

    let count = state.engine.count(&prefix)?;
    Ok(Json(CountResponse { count }))
}

/// GET /1/queries/popular/:prefix?size=N
///
/// Resolve the date prefix and return the `size` most frequent queries in
/// the span, descending by count. `size` defaults to the configured value;
/// a non-positive `size` yields an empty list.
pub async fn popular(
    State(state): State<Arc<AppState>>,
    Path(prefix): Path<String>,
    Query(params): Query<PopularParams>,
) -> ApiResult<Json<PopularResponse>> {
    let size = match params.size {
        Some(requested) => requested.max(0) as usize,
        None => state.config.default_popular_size,
    };

    tracing::debug!(prefix = %prefix, size = size, "popular request");

    let queries = state
        .engine
        .popular(&prefix, size)?
        .into_iter()
        .map(|qc| PopularEntry {
            query: qc.query,
            count: qc.count,
        })
        .collect();

    Ok(Json(PopularResponse { queries }))
}
