//! Shared-secret authentication for job submission.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the service credential.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Compare two secrets without an early exit on the first differing byte.
///
/// Both sides are hashed first, so the comparison length never depends on
/// the presented value.
pub fn keys_match(expected: &str, presented: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let presented = Sha256::digest(presented.as_bytes());
    expected
        .iter()
        .zip(presented.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Reject requests without a matching `X-API-Key`.
///
/// Installed as a route layer, so it runs before the body is read.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let verdict = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|key| keys_match(&state.config.api_key, key));

    match verdict {
        Some(true) => Ok(next.run(request).await),
        Some(false) => {
            warn!(path = %request.uri().path(), "Rejected request with invalid API key");
            Err(ApiError::unauthorized("Invalid API key"))
        }
        None => Err(ApiError::unauthorized("Missing X-API-Key header")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match() {
        assert!(keys_match("s3cret", "s3cret"));
        assert!(!keys_match("s3cret", "s3cre"));
        assert!(!keys_match("s3cret", "S3cret"));
        assert!(!keys_match("s3cret", ""));
    }
}
