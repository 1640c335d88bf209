//! Error types for Freshet load operations.

use thiserror::Error;

/// Boxed error produced by caller-owned collaborators (local sources,
/// remote sources, cache writers).
///
/// The engine never inspects these beyond logging and cause-chain
/// preservation, so a type-erased box is all the contract needs.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Terminal load failures.
///
/// This taxonomy is reserved for one situation only: an invocation that
/// could not produce any usable data at all. Every variant is constructed
/// exclusively when no local value was available as a fallback; if local
/// data exists, any remote problem is downgraded to a logged, non-fatal
/// event and the local value is used instead.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Device is offline and no local value exists.
    #[error("network unavailable and no cached value to fall back on")]
    NetworkUnavailable,

    /// Remote call succeeded but returned no value, and no local value exists.
    #[error("remote source returned no value and no cached value exists")]
    RemoteEmpty,

    /// Remote call failed, and no local value exists. The underlying
    /// transport error stays inspectable through the source chain.
    #[error("remote fetch failed with no cached value to fall back on")]
    RemoteFailed {
        #[source]
        source: SourceError,
    },
}

impl LoadError {
    /// Wrap a collaborator error as a terminal remote failure.
    pub fn remote_failed(source: SourceError) -> Self {
        Self::RemoteFailed { source }
    }

    /// Returns true for [`LoadError::NetworkUnavailable`].
    pub fn is_network_unavailable(&self) -> bool {
        matches!(self, Self::NetworkUnavailable)
    }

    /// Returns true for [`LoadError::RemoteEmpty`].
    pub fn is_remote_empty(&self) -> bool {
        matches!(self, Self::RemoteEmpty)
    }

    /// Returns true for [`LoadError::RemoteFailed`].
    pub fn is_remote_failed(&self) -> bool {
        matches!(self, Self::RemoteFailed { .. })
    }
}

/// Result type alias for Freshet load operations.
pub type LoadResult<T> = Result<T, LoadError>;
