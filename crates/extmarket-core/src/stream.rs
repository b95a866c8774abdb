// ── Reactive feed stream ──
//
// Subscription type for consuming feed views from a `FeedController`.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::feed::FeedView;

/// A subscription to a running feed.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct FeedStream {
    current: FeedView,
    receiver: watch::Receiver<FeedView>,
}

impl FeedStream {
    pub(crate) fn new(receiver: watch::Receiver<FeedView>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The view captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &FeedView {
        &self.current
    }

    /// The latest published view (may have changed since creation).
    pub fn latest(&self) -> FeedView {
        self.receiver.borrow().clone()
    }

    /// Wait for the next published view.
    /// Returns `None` once the feed has stopped.
    pub async fn changed(&mut self) -> Option<FeedView> {
        self.receiver.changed().await.ok()?;
        let view = self.receiver.borrow_and_update().clone();
        self.current = view.clone();
        Some(view)
    }

    /// Wait until a published view satisfies `predicate` (checking the
    /// latest view first). Returns `None` if the feed stops before that.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&FeedView) -> bool) -> Option<FeedView> {
        let view = self.receiver.wait_for(predicate).await.ok()?.clone();
        self.current = view.clone();
        Some(view)
    }

    /// Wait until no request is in flight.
    pub async fn settled(&mut self) -> Option<FeedView> {
        self.wait_for(|view| !view.is_loading && view.state != crate::feed::FeedState::Idle)
            .await
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> FeedWatchStream {
        FeedWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current view immediately, then each newly published one.
pub struct FeedWatchStream {
    inner: WatchStream<FeedView>,
}

impl Stream for FeedWatchStream {
    type Item = FeedView;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
