//! Connectivity test endpoint
//!
//! Lets the companion page verify the deployment is reachable without a
//! key and without calling upstream.

use axum::{extract::Query, http::Method, Json};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::schemas::timestamp_now;

#[derive(Debug, Serialize)]
pub struct EchoResponse {
    pub message: String,
    pub timestamp: String,
    pub method: String,
    pub query: BTreeMap<String, String>,
}

/// Echo the request method and query
///
/// ANY /api/test
pub async fn echo(method: Method, Query(query): Query<BTreeMap<String, String>>) -> Json<EchoResponse> {
    Json(EchoResponse {
        message: "API is working!".to_string(),
        timestamp: timestamp_now(),
        method: method.to_string(),
        query,
    })
}
