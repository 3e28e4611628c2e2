//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

/// Response of the distinct-count endpoint
#[derive(Debug, Serialize)]
pub struct CountResponse {
    /// Number of distinct queries in the requested span
    pub count: usize,
}

/// Query string parameters of the popular endpoint
#[derive(Debug, Deserialize)]
pub struct PopularParams {
    /// Number of entries requested; non-positive means none
    #[serde(default)]
    pub size: Option<i64>,
}

/// Response of the popular endpoint
#[derive(Debug, Serialize)]
pub struct PopularResponse {
    /// Queries ordered by descending count
    pub queries: Vec<PopularEntry>,
}

/// One ranked query
#[derive(Debug, Serialize)]
pub struct PopularEntry {
    pub query: String,
    pub count: u64,
}

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Number of records loaded into the index
    pub records: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
