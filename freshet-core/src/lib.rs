//! Freshet Core - types and contracts
//!
//! Pure types with no loading logic: the error taxonomy, the consumer-facing
//! [`ResultState`], the policy injection points, the per-invocation request
//! context, and the collaborator contracts the loader strategies consume.
//! The strategies themselves live in `freshet-loaders`.

mod context;
mod error;
mod policy;
mod source;
mod state;

pub use context::RequestContext;
pub use error::{LoadError, LoadResult, SourceError};
pub use policy::{EmitPolicy, FallbackPolicy, FetchPolicy};
pub use source::{
    CacheWriter, ConnectivityProbe, LocalSource, ObservableSource, RemoteSource,
};
pub use state::ResultState;
