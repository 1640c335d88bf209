//! Shared stream plumbing for the loader strategies.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use freshet_core::LoadResult;
use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

/// Aborts the driver task when the consumer lets go of the stream.
///
/// This is the teardown guarantee: release happens on every exit path,
/// whether the stream was drained to completion or dropped mid-flight.
struct DriverGuard(JoinHandle<()>);

impl Drop for DriverGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Output stream of a loader invocation.
///
/// Items are `Ok(value)` emissions; an `Err` is terminal by construction
/// (drivers send at most one, as their last message). The stream completes
/// when the driver finishes; dropping it cancels the invocation by aborting
/// the driver at its next suspension point.
pub struct LoadStream<V> {
    inner: ReceiverStream<LoadResult<V>>,
    _driver: DriverGuard,
}

impl<V: Send + 'static> LoadStream<V> {
    /// Spawn a driver task and hand its output channel back as a stream.
    pub(crate) fn spawn<F, Fut>(capacity: usize, driver: F) -> Self
    where
        F: FnOnce(mpsc::Sender<LoadResult<V>>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = tokio::spawn(driver(tx));
        Self {
            inner: ReceiverStream::new(rx),
            _driver: DriverGuard(handle),
        }
    }
}

impl<V> Stream for LoadStream<V> {
    type Item = LoadResult<V>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freshet_core::LoadError;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_stream_yields_driver_output_then_completes() {
        let mut stream = LoadStream::spawn(4, |tx| async move {
            tx.send(Ok(1)).await.unwrap();
            tx.send(Ok(2)).await.unwrap();
        });

        assert_eq!(stream.next().await.unwrap().unwrap(), 1);
        assert_eq!(stream.next().await.unwrap().unwrap(), 2);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_error_is_last_item() {
        let mut stream = LoadStream::spawn(4, |tx: mpsc::Sender<LoadResult<i32>>| async move {
            let _ = tx.send(Err(LoadError::RemoteEmpty)).await;
        });

        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_drop_aborts_driver() {
        let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();
        let stream = LoadStream::spawn(1, |tx: mpsc::Sender<LoadResult<i32>>| async move {
            // Parked forever; only an abort can end this driver.
            let _keep = tx;
            std::future::pending::<()>().await;
            drop(done_tx);
        });

        drop(stream);
        // The sender side is dropped when the aborted driver is torn down.
        assert!(done_rx.await.is_err());
    }
}
