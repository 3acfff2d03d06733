/**
 * Computation Handlers
 *
 * Both endpoints validate input, answer 202 Accepted immediately, and
 * hand the actual work to a spawned background job. Results arrive via
 * the `calculations` table and a WebSocket notification; there is no
 * polling endpoint.
 */
use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::compute::jobs::{run_factorial, run_sum, MAX_FACTORIAL_INPUT};
use crate::error::ApiError;
use crate::middleware::auth::CurrentUser;
use crate::server::state::AppState;

/// Body of `POST /compute/factorial`.
#[derive(Debug, Deserialize)]
pub struct FactorialRequest {
    pub n: i64,
}

/// Body of `POST /compute/sum`.
#[derive(Debug, Deserialize)]
pub struct SumRequest {
    pub start: i64,
    pub end: i64,
}

/// `POST /compute/factorial` - queue a factorial computation.
///
/// # Errors
///
/// * `400 Bad Request` - `n` outside `1..=20` (`21!` overflows the
///   64-bit result column)
/// * `401 Unauthorized` - missing/invalid bearer token
/// * `503 Service Unavailable` - database not configured
pub async fn start_factorial(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<FactorialRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if request.n < 1 || request.n > MAX_FACTORIAL_INPUT {
        return Err(ApiError::bad_request(format!(
            "n must be between 1 and {MAX_FACTORIAL_INPUT}"
        )));
    }

    let pool = state.require_db()?.clone();
    let hub = state.broadcaster.clone();
    let n = request.n;

    tokio::spawn(run_factorial(pool, hub, user.username, n));

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": format!("factorial of {n} accepted for processing")
        })),
    ))
}

/// `POST /compute/sum` - queue an inclusive range sum.
///
/// # Errors
///
/// * `400 Bad Request` - `start` greater than `end`
/// * `401 Unauthorized` - missing/invalid bearer token
/// * `503 Service Unavailable` - database not configured
pub async fn start_sum(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SumRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if request.start > request.end {
        return Err(ApiError::bad_request(
            "start of the range must not be greater than the end",
        ));
    }

    let pool = state.require_db()?.clone();
    let hub = state.broadcaster.clone();
    let (start, end) = (request.start, request.end);

    tokio::spawn(run_sum(pool, hub, user.username, start, end));

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": format!("sum from {start} to {end} accepted for processing")
        })),
    ))
}
