//! Collaborator contracts consumed by the loader strategies.
//!
//! All four collaborators are owned by the caller; the engine never writes
//! to a local source except through its [`CacheWriter`], and holds no
//! long-lived locks on any of them.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::SourceError;

/// A reader of cached/local data.
///
/// Errors from `read` are caught by the engine, logged, and treated as
/// "value absent"; they are never propagated to a consumer.
#[async_trait]
pub trait LocalSource<T>: Send + Sync {
    /// Read the current local value, if any.
    async fn read(&self) -> Result<Option<T>, SourceError>;
}

/// A local source whose value can be observed as it changes.
///
/// The observed stream yields the current value first and then every
/// subsequent change. Erroring items are treated by the engine exactly like
/// a failed `read`: logged and counted as absent.
pub trait ObservableSource<T>: LocalSource<T> {
    /// Subscribe to the local value.
    fn observe(&self) -> BoxStream<'static, Result<Option<T>, SourceError>>;
}

/// A single asynchronous fetch from network/API.
///
/// Errors propagate into the engine's fallback logic; cancellation of the
/// surrounding task propagates as cancellation, never as a value. The
/// engine issues at most one in-flight fetch per loader invocation and
/// imposes no timeout; that is the implementation's concern.
#[async_trait]
pub trait RemoteSource<T>: Send + Sync {
    /// Fetch the current remote value, if any.
    async fn fetch(&self) -> Result<Option<T>, SourceError>;
}

/// Persists a fetched remote value back into the local source.
///
/// Write failures are logged by the engine and otherwise ignored: a
/// successfully fetched value is still reported to the consumer.
#[async_trait]
pub trait CacheWriter<T>: Send + Sync {
    /// Write a fetched value into the local store.
    async fn write(&self, value: &T) -> Result<(), SourceError>;
}

/// Synchronous "is the device online" check.
pub trait ConnectivityProbe: Send + Sync {
    /// Whether the device currently has connectivity.
    fn is_online(&self) -> bool;
}

impl<F> ConnectivityProbe for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_online(&self) -> bool {
        self()
    }
}
