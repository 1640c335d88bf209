//! One-shot network-first loading.

use std::sync::Arc;

use freshet_core::{
    CacheWriter, ConnectivityProbe, FallbackPolicy, LoadError, LocalSource, RemoteSource,
    RequestContext,
};
use tracing::{debug, warn};

use crate::config::LoaderConfig;
use crate::stream::LoadStream;

/// One-shot strategy that prefers a fresh remote result and degrades to the
/// local copy only on remote absence or failure.
///
/// Each [`run`](Self::run) emits exactly one item, `Some(value)` or `None`
/// for "no data", then completes, or fails. The offline path never fails:
/// absence of data while offline is a normal terminal value. A failed local
/// lookup and an empty local lookup are deliberately kept apart: the former
/// escalates a remote failure to [`LoadError::RemoteFailed`], the latter is
/// a legitimate "not found".
pub struct NetworkFirstLoader<T, L, R, W, C> {
    local: Arc<L>,
    remote: Arc<R>,
    cache: Arc<W>,
    probe: Arc<C>,
    fallback_policy: FallbackPolicy<T>,
    config: LoaderConfig,
}

impl<T, L, R, W, C> NetworkFirstLoader<T, L, R, W, C>
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
            fallback_policy: FallbackPolicy::default(),
            config: LoaderConfig::default(),
        }
    }

    /// Set the policy gating local fallback emissions.
    pub fn with_fallback_policy(mut self, policy: FallbackPolicy<T>) -> Self {
        self.fallback_policy = policy;
        self
    }

    /// Set the loader configuration.
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Start one invocation.
    ///
    /// Dropping the returned stream cancels it; no fallback read is
    /// attempted on behalf of a cancelled invocation.
    pub fn run(&self) -> LoadStream<Option<T>> {
        let ctx = RequestContext::new();
        let local = Arc::clone(&self.local);
        let remote = Arc::clone(&self.remote);
        let cache = Arc::clone(&self.cache);
        let probe = Arc::clone(&self.probe);
        let fallback_policy = self.fallback_policy.clone();

        LoadStream::spawn(self.config.channel_capacity, move |tx| async move {
            if !probe.is_online() {
                let local_value = match local.read().await {
                    Ok(value) => value,
                    Err(e) => {
                        debug!(ctx = ctx.brief(), error = %e, "offline local read failed, treating as absent");
                        None
                    }
                };
                debug!(ctx = ctx.brief(), found = local_value.is_some(), "offline, serving local value");
                let _ = tx.send(Ok(local_value)).await;
                return;
            }

            match remote.fetch().await {
                Ok(Some(fetched)) => {
                    // Commit point, as in the cache-first strategy.
                    if tx.is_closed() {
                        debug!(ctx = ctx.brief(), "cancelled mid-fetch, discarding result");
                        return;
                    }
                    if let Err(e) = cache.write(&fetched).await {
                        warn!(ctx = ctx.brief(), error = %e, "cache write failed, value still served");
                    }
                    let _ = tx.send(Ok(Some(fetched))).await;
                }
                Ok(None) => {
                    let fallback = match local.read().await {
                        Ok(value) => value,
                        Err(e) => {
                            debug!(ctx = ctx.brief(), error = %e, "fallback read failed, treating as absent");
                            None
                        }
                    };
                    let value = fallback.filter(|v| fallback_policy.allows(v));
                    debug!(ctx = ctx.brief(), found = value.is_some(), "remote empty, degrading to local");
                    let _ = tx.send(Ok(value)).await;
                }
                Err(fetch_err) => match local.read().await {
                    Ok(Some(value)) if fallback_policy.allows(&value) => {
                        warn!(ctx = ctx.brief(), error = %fetch_err, "remote failed, serving local fallback");
                        let _ = tx.send(Ok(Some(value))).await;
                    }
                    Ok(_) => {
                        // Empty (or policy-barred) local lookup is a valid
                        // "not found", not a technical fault.
                        warn!(ctx = ctx.brief(), error = %fetch_err, "remote failed, no local fallback");
                        let _ = tx.send(Ok(None)).await;
                    }
                    Err(read_err) => {
                        debug!(ctx = ctx.brief(), error = %read_err, "fallback read failed too");
                        let _ = tx.send(Err(LoadError::remote_failed(fetch_err))).await;
                    }
                },
            }
        })
    }
}
