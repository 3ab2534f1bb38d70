use axum::http::{HeaderMap, HeaderValue};
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The request id carried in `headers`, if it is non-empty text.
pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|id| !id.trim().is_empty())
}

/// Propagates `x-request-id` from the request to the response, generating one
/// when the caller sent none.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = request_id(req.headers())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let Ok(value) = HeaderValue::from_str(&id) else {
        return next.run(req).await;
    };

    req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    let mut response = next.run(req).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, value);
    response
}
