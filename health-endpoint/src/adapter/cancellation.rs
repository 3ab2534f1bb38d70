use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Cancellation signal scoped to one request.
///
/// The token is a child of the `CancellationToken` extension installed by the
/// host (typically its shutdown token), or a fresh root when there is none.
/// It is cancelled when the host token fires or when this value, or the
/// response body it was moved into, is dropped.
pub struct RequestCancellation {
    token: CancellationToken,
    guard: DropGuard,
}

impl RequestCancellation {
    pub fn new(token: CancellationToken) -> Self {
        let guard = token.clone().drop_guard();
        Self { token, guard }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn into_parts(self) -> (CancellationToken, DropGuard) {
        (self.token, self.guard)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestCancellation
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .extensions
            .get::<CancellationToken>()
            .map(CancellationToken::child_token)
            .unwrap_or_default();

        Ok(Self::new(token))
    }
}
