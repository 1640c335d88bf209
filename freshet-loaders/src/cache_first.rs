//! One-shot cache-first loading.

use std::sync::Arc;

use freshet_core::{
    CacheWriter, ConnectivityProbe, EmitPolicy, FetchPolicy, LoadError, LocalSource,
    RemoteSource, RequestContext,
};
use tracing::{debug, warn};

use crate::config::LoaderConfig;
use crate::stream::LoadStream;

/// One-shot strategy that prefers already-available local data and
/// refreshes from remote opportunistically.
///
/// Each [`run`](Self::run) emits zero, one, or two values and then
/// completes, or fails with a [`LoadError`]. The local value, when present,
/// is always the first emission; a remote problem while a local fallback
/// exists is logged and swallowed, never surfaced.
pub struct CacheFirstLoader<T, L, R, W, C> {
    local: Arc<L>,
    remote: Arc<R>,
    cache: Arc<W>,
    probe: Arc<C>,
    fetch_policy: FetchPolicy<T>,
    emit_policy: EmitPolicy<T>,
    config: LoaderConfig,
}

impl<T, L, R, W, C> CacheFirstLoader<T, L, R, W, C>
where
    T: Clone + Send + Sync + 'static,
    L: LocalSource<T> + 'static,
    R: RemoteSource<T> + 'static,
    W: CacheWriter<T> + 'static,
    C: ConnectivityProbe + 'static,
{
    /// Create a loader over caller-owned collaborators with default policies.
    pub fn new(local: Arc<L>, remote: Arc<R>, cache: Arc<W>, probe: Arc<C>) -> Self {
        Self {
            local,
            remote,
            cache,
            probe,
            fetch_policy: FetchPolicy::default(),
            emit_policy: EmitPolicy::default(),
            config: LoaderConfig::default(),
        }
    }

    /// Set the fetch policy.
    pub fn with_fetch_policy(mut self, policy: FetchPolicy<T>) -> Self {
        self.fetch_policy = policy;
        self
    }

    /// Set the emit policy.
    pub fn with_emit_policy(mut self, policy: EmitPolicy<T>) -> Self {
        self.emit_policy = policy;
        self
    }

    /// Set the loader configuration.
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Start one invocation.
    ///
    /// Work runs on a spawned driver task, never on the caller's thread.
    /// Dropping the returned stream cancels the invocation; a fetch result
    /// arriving after cancellation is discarded without a cache write.
    pub fn run(&self) -> LoadStream<T> {
        let ctx = RequestContext::new();
        let local = Arc::clone(&self.local);
        let remote = Arc::clone(&self.remote);
        let cache = Arc::clone(&self.cache);
        let probe = Arc::clone(&self.probe);
        let fetch_policy = self.fetch_policy.clone();
        let emit_policy = self.emit_policy.clone();

        LoadStream::spawn(self.config.channel_capacity, move |tx| async move {
            let local_value = match local.read().await {
                Ok(value) => value,
                Err(e) => {
                    debug!(ctx = ctx.brief(), error = %e, "local read failed, treating as absent");
                    None
                }
            };

            if let Some(value) = &local_value {
                debug!(ctx = ctx.brief(), "emitting cached value");
                if tx.send(Ok(value.clone())).await.is_err() {
                    return;
                }
            }

            if !fetch_policy.should_fetch(local_value.as_ref()) {
                debug!(ctx = ctx.brief(), "fetch policy skipped remote refresh");
                return;
            }

            if !probe.is_online() {
                if local_value.is_none() {
                    let _ = tx.send(Err(LoadError::NetworkUnavailable)).await;
                } else {
                    debug!(ctx = ctx.brief(), "offline, keeping cached value");
                }
                return;
            }

            match remote.fetch().await {
                Ok(Some(fetched)) => {
                    // Commit point: a consumer that cancelled during the
                    // fetch gets neither a cache write nor an emission.
                    if tx.is_closed() {
                        debug!(ctx = ctx.brief(), "cancelled mid-fetch, discarding result");
                        return;
                    }
                    if let Err(e) = cache.write(&fetched).await {
                        warn!(ctx = ctx.brief(), error = %e, "cache write failed, value still served");
                    }
                    if emit_policy.should_emit(local_value.as_ref(), &fetched) {
                        let _ = tx.send(Ok(fetched)).await;
                    }
                }
                Ok(None) => {
                    if local_value.is_none() {
                        let _ = tx.send(Err(LoadError::RemoteEmpty)).await;
                    } else {
                        debug!(ctx = ctx.brief(), "remote empty, keeping stale cached value");
                    }
                }
                Err(e) => {
                    if local_value.is_none() {
                        let _ = tx.send(Err(LoadError::remote_failed(e))).await;
                    } else {
                        warn!(ctx = ctx.brief(), error = %e, "remote refresh failed, keeping stale cached value");
                    }
                }
            }
        })
    }
}
