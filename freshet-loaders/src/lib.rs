//! Freshet Loaders - reconciliation strategies
//!
//! Three data-loading strategies over the collaborator contracts of
//! `freshet-core`, each producing a single asynchronous stream of results:
//!
//! - [`CacheFirstLoader`]: one-shot, prefer local, refresh opportunistically.
//! - [`CacheFirstReactiveLoader`]: long-lived, observe local changes, sync
//!   from remote once in the background.
//! - [`NetworkFirstLoader`]: one-shot, prefer remote, degrade to local.
//!
//! [`ResultStates`] adapts any of them to a [`ResultState`] stream for
//! consumers that render states instead of handling errors, and
//! [`ResultStateStreamExt::suppress_transient_errors`] hides errors that a
//! later emission supersedes.
//!
//! Cancellation is dropping a stream: the driver task is aborted at its
//! next suspension point and teardown runs exactly once.

mod cache_first;
mod config;
mod network_first;
mod reactive;
mod state;
mod stream;

pub use cache_first::CacheFirstLoader;
pub use config::LoaderConfig;
pub use network_first::NetworkFirstLoader;
pub use reactive::CacheFirstReactiveLoader;
pub use state::{ResultStateStreamExt, ResultStates, SuppressTransientErrors};
pub use stream::LoadStream;

pub use freshet_core::{
    CacheWriter, ConnectivityProbe, EmitPolicy, FallbackPolicy, FetchPolicy, LoadError,
    LoadResult, LocalSource, ObservableSource, RemoteSource, RequestContext, ResultState,
    SourceError,
};
