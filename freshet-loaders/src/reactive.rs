//! Long-lived cache-first loading with persistent local observation.

use std::sync::Arc;

use freshet_core::{
    CacheWriter, ConnectivityProbe, FetchPolicy, LoadError, ObservableSource, RemoteSource,
    RequestContext,
};
use futures_util::StreamExt;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::config::LoaderConfig;
use crate::stream::LoadStream;

/// Long-lived strategy: emit the cached value, keep observing local changes
/// indefinitely, and run one background remote sync.
///
/// The returned stream never completes on its own; the consumer ends it by
/// dropping it. Observed local changes are the sole emission path: a
/// fetched remote value only ever reaches the consumer by being written to
/// the cache and re-observed, so every value seen downstream is also
/// durably stored ("single source of truth").
pub struct CacheFirstReactiveLoader<T, L, R, W, C> {
    local: Arc<L>,
    remote: Arc<R>,
    cache: Arc<W>,
    probe: Arc<C>,
    fetch_policy: FetchPolicy<T>,
    config: LoaderConfig,
}

impl<T, L, R, W, C> CacheFirstReactiveLoader<T, L, R, W, C>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    L: ObservableSource<T> + 'static,
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
            config: LoaderConfig::default(),
        }
    }

    /// Set the fetch policy consulted by the one-time remote sync.
    pub fn with_fetch_policy(mut self, policy: FetchPolicy<T>) -> Self {
        self.fetch_policy = policy;
        self
    }

    /// Set the loader configuration.
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Start one invocation.
    ///
    /// Dropping the returned stream releases the observation subscription
    /// exactly once and abandons the remote sync without cutting short a
    /// cache write already in flight.
    pub fn run(&self) -> LoadStream<T> {
        let ctx = RequestContext::new();
        let local = Arc::clone(&self.local);
        let remote = Arc::clone(&self.remote);
        let cache = Arc::clone(&self.cache);
        let probe = Arc::clone(&self.probe);
        let fetch_policy = self.fetch_policy.clone();

        LoadStream::spawn(self.config.channel_capacity, move |tx| async move {
            let mut observed = local.observe();

            // Initial snapshot: the subscription's first item. It decides
            // whether to sync; its emission happens through the same
            // forwarding path as every later change.
            let (snapshot, mut observe_done) = match observed.next().await {
                Some(Ok(value)) => (value, false),
                Some(Err(e)) => {
                    debug!(ctx = ctx.brief(), error = %e, "observation error, treating snapshot as absent");
                    (None, false)
                }
                None => (None, true),
            };

            // Detached on purpose: consumer cancellation abandons the sync
            // but must not cut short a cache write already in flight.
            let (sync_tx, mut sync_rx) = oneshot::channel();
            tokio::spawn(remote_sync(
                ctx.clone(),
                snapshot.clone(),
                remote,
                cache,
                probe,
                fetch_policy,
                sync_tx,
            ));

            let mut last: Option<T> = None;
            if let Some(value) = snapshot {
                last = Some(value.clone());
                if tx.send(Ok(value)).await.is_err() {
                    return;
                }
            }

            let mut sync_pending = true;
            loop {
                if observe_done && !sync_pending {
                    // Local stream dried up and the sync is settled; only
                    // consumer cancellation can end the invocation now.
                    futures_util::future::pending::<()>().await;
                }
                tokio::select! {
                    item = observed.next(), if !observe_done => match item {
                        Some(Ok(Some(value))) => {
                            if last.as_ref() != Some(&value) {
                                last = Some(value.clone());
                                if tx.send(Ok(value)).await.is_err() {
                                    return;
                                }
                            }
                        }
                        // Nulls are never forwarded; absence is silence.
                        Some(Ok(None)) => {}
                        Some(Err(e)) => {
                            debug!(ctx = ctx.brief(), error = %e, "observation error, item skipped");
                        }
                        None => observe_done = true,
                    },
                    result = &mut sync_rx, if sync_pending => {
                        sync_pending = false;
                        match result {
                            Ok(Err(load_err)) => {
                                let _ = tx.send(Err(load_err)).await;
                                return;
                            }
                            // Sync settled cleanly (or its task went away);
                            // observation simply continues.
                            Ok(Ok(())) | Err(_) => {}
                        }
                    }
                }
            }
        })
    }
}

/// One-time background sync: fetch once and persist through the cache
/// writer, so the refreshed value re-enters via local observation. Never
/// re-triggered by later local changes.
async fn remote_sync<T, R, W, C>(
    ctx: RequestContext,
    snapshot: Option<T>,
    remote: Arc<R>,
    cache: Arc<W>,
    probe: Arc<C>,
    fetch_policy: FetchPolicy<T>,
    out: oneshot::Sender<Result<(), LoadError>>,
) where
    T: Clone + Send + Sync + 'static,
    R: RemoteSource<T> + 'static,
    W: CacheWriter<T> + 'static,
    C: ConnectivityProbe + 'static,
{
    let had_snapshot = snapshot.is_some();

    if !fetch_policy.should_fetch(snapshot.as_ref()) {
        debug!(ctx = ctx.brief(), "fetch policy skipped remote sync");
        let _ = out.send(Ok(()));
        return;
    }

    if !probe.is_online() {
        let result = if had_snapshot {
            debug!(ctx = ctx.brief(), "offline, keeping observed value");
            Ok(())
        } else {
            Err(LoadError::NetworkUnavailable)
        };
        let _ = out.send(result);
        return;
    }

    let result = match remote.fetch().await {
        Ok(Some(fetched)) => {
            if let Err(e) = cache.write(&fetched).await {
                warn!(ctx = ctx.brief(), error = %e, "sync cache write failed");
            } else {
                debug!(ctx = ctx.brief(), "sync persisted remote value");
            }
            Ok(())
        }
        Ok(None) => {
            if had_snapshot {
                debug!(ctx = ctx.brief(), "remote empty, keeping observed value");
                Ok(())
            } else {
                Err(LoadError::RemoteEmpty)
            }
        }
        Err(e) => {
            if had_snapshot {
                warn!(ctx = ctx.brief(), error = %e, "remote sync failed, keeping observed value");
                Ok(())
            } else {
                Err(LoadError::remote_failed(e))
            }
        }
    };
    let _ = out.send(result);
}
