//! Response timing middleware.
//!
//! Adds an `X-Process-Time` header (seconds, fractional) to every
//! response, measured from when the middleware saw the request.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

pub const PROCESS_TIME_HEADER: &str = "x-process-time";

pub async fn process_time(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let mut response = next.run(request).await;

    let elapsed = start.elapsed().as_secs_f64();
    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed:.6}")) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(PROCESS_TIME_HEADER), value);
    }

    response
}
