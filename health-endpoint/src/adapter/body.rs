use super::cancellation::RequestCancellation;
use axum::body::Bytes;
use futures::Stream;
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::sync::{CancellationToken, DropGuard};

pub(crate) const CHUNK_SIZE: usize = 8 * 1024;

/// Response body that yields its bytes in chunks and stops early once the
/// request is cancelled. Bytes already handed to the connection stay written.
pub struct CancellableBody {
    remaining: Bytes,
    token: CancellationToken,
    _guard: DropGuard,
}

impl CancellableBody {
    pub fn new(bytes: impl Into<Bytes>, cancellation: RequestCancellation) -> Self {
        let (token, guard) = cancellation.into_parts();
        Self {
            remaining: bytes.into(),
            token,
            _guard: guard,
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl Stream for CancellableBody {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.remaining.is_empty() {
            return Poll::Ready(None);
        }

        if self.token.is_cancelled() {
            tracing::debug!(
                unwritten = self.remaining.len(),
                "Request cancelled, abandoning health check body"
            );
            self.remaining.clear();
            return Poll::Ready(None);
        }

        let len = self.remaining.len().min(CHUNK_SIZE);
        let chunk = self.remaining.split_to(len);
        Poll::Ready(Some(Ok(chunk)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let chunks = self.remaining.len().div_ceil(CHUNK_SIZE);
        (0, Some(chunks))
    }
}
