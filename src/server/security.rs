//! Request checks run before any settings mutation

use axum::http::{header, HeaderMap};

use super::ApiError;
use crate::config::SecurityConfig;

/// Reject mutating requests that are not JSON or come from a foreign origin.
///
/// Requests without an `Origin` header (CLI tools, server-to-server) pass
/// the origin check.
pub fn validate_api_request(headers: &HeaderMap, config: &SecurityConfig) -> Result<(), ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(';')
                .next()
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case("application/json")
        })
        .unwrap_or(false);
    if !is_json {
        return Err(ApiError::UnsupportedMediaType);
    }

    let Some(origin) = headers.get(header::ORIGIN) else {
        return Ok(());
    };
    let origin = origin.to_str().map_err(|_| ApiError::Forbidden)?;

    if config
        .allowed_origins
        .iter()
        .any(|allowed| allowed.trim_end_matches('/') == origin)
    {
        return Ok(());
    }

    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let origin_host = origin.split_once("://").map(|(_, rest)| rest);
    match (host, origin_host) {
        (Some(host), Some(origin_host)) if host.eq_ignore_ascii_case(origin_host) => Ok(()),
        _ => {
            tracing::warn!("Rejected request from origin {}", origin);
            Err(ApiError::Forbidden)
        }
    }
}
