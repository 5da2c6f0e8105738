//! Teardown of built values.
//!
//! Values opt into teardown by implementing [`Closer`] and being registered with
//! [`Container::register_closeable`](crate::Container::register_closeable).
//! [`Container::close`](crate::Container::close) turns every closeable value into one
//! teardown future and returns them as a [`Teardown`] stream of failures.
//!
//! Teardown only makes progress while the stream is polled. Failures are buffered in
//! the stream, so a failing closer never blocks the others. Dropping the stream
//! cancels the teardowns which have not completed yet.

use std::{
    collections::BTreeMap,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::{
    future::{self, BoxFuture},
    stream::{self, BoxStream, FuturesUnordered},
    FutureExt, Stream, StreamExt,
};

use crate::{
    config::TeardownOrder,
    errors::TeardownError,
    types::{DynError, Injectable, TypeKey},
};

/// A built value which releases resources when the container is closed
pub trait Closer: Injectable {
    type Error: Into<DynError> + 'static;

    /// Tears the value down, called at most once per container
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Object safe wrapper of [`Closer`]
pub(crate) trait DynCloser: Send + Sync {
    fn close_boxed(self: Arc<Self>) -> BoxFuture<'static, Result<(), DynError>>;
}
impl<T: Closer> DynCloser for T {
    fn close_boxed(self: Arc<Self>) -> BoxFuture<'static, Result<(), DynError>> {
        async move {
            // Forward the call to the specific implementation
            self.close().await.map_err(Into::into)
        }
        .boxed()
    }
}

/// A built value with its teardown capability
pub(crate) struct Closeable {
    pub product: TypeKey,
    pub closer: Arc<dyn DynCloser>,
    /// Length of the longest chain of dependents on this value
    pub depth: usize,
}

/// Stream of teardown failures, ends once every closer has completed
#[must_use = "teardown only runs while the stream is polled"]
pub struct Teardown {
    inner: BoxStream<'static, TeardownError>,
    closers: usize,
}
impl Teardown {
    /// Groups the closeables into waves according to the teardown order
    ///
    /// `closeables` must be given in build order. `failures` are values which could
    /// not be closed at all, they are yielded before any closer runs.
    pub(crate) fn new(
        closeables: Vec<Closeable>,
        failures: Vec<TeardownError>,
        order: TeardownOrder,
    ) -> Self {
        let closers = closeables.len();
        let waves: Vec<Vec<Closeable>> = match order {
            TeardownOrder::Concurrent => vec![closeables],
            TeardownOrder::ReverseDependency => {
                // Values nothing depends on have depth 0 and are closed first
                let mut by_depth: BTreeMap<usize, Vec<Closeable>> = BTreeMap::new();
                for closeable in closeables {
                    by_depth.entry(closeable.depth).or_default().push(closeable);
                }
                by_depth.into_values().collect()
            }
        };

        tracing::debug!(
            "Tearing down {closers} closeable values in {} wave(s) ({order:?})",
            waves.len()
        );

        // The next wave is only started once the previous one is exhausted
        let inner = stream::iter(failures)
            .chain(
                stream::iter(waves)
                    .flat_map(|wave| {
                        wave.into_iter()
                            .map(close_one)
                            .collect::<FuturesUnordered<_>>()
                    })
                    .filter_map(future::ready),
            )
            .boxed();

        Teardown { inner, closers }
    }

    /// Number of values which will be closed
    pub fn closers(&self) -> usize {
        self.closers
    }

    /// Runs the whole teardown, returning every failure
    pub async fn errors(self) -> Vec<TeardownError> {
        self.collect().await
    }
}
impl Stream for Teardown {
    type Item = TeardownError;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}
impl std::fmt::Debug for Teardown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Teardown")
            .field("closers", &self.closers)
            .finish_non_exhaustive()
    }
}

async fn close_one(closeable: Closeable) -> Option<TeardownError> {
    let Closeable {
        product, closer, ..
    } = closeable;

    tracing::debug!("Closing {product}");
    match closer.close_boxed().await {
        Ok(()) => {
            tracing::debug!("Closed {product}");
            None
        }
        Err(error) => {
            tracing::warn!("Closing {product} failed: {error}");
            Some(TeardownError { product, error })
        }
    }
}
