//! Policy injection points for the loader strategies.
//!
//! Policies are pure predicates supplied by the caller. Each is evaluated
//! exactly once per loader invocation and must not perform I/O.

use std::fmt;
use std::sync::Arc;

/// Decides whether a remote fetch should be attempted even though local
/// data exists.
///
/// The predicate only governs the "local value present" case: when the
/// local source has nothing, the loaders always fetch, regardless of
/// policy. Evaluated exactly once per invocation, before any remote call.
#[derive(Clone)]
pub enum FetchPolicy<T> {
    /// Always refresh from remote, even with a local value present.
    Always,
    /// Never refresh while a local value exists.
    Never,
    /// Caller-supplied predicate over the local value.
    Custom(Arc<dyn Fn(Option<&T>) -> bool + Send + Sync>),
}

impl<T> FetchPolicy<T> {
    /// Build a custom fetch policy from a predicate.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(Option<&T>) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    /// Evaluate the policy against the local value.
    ///
    /// An absent local value always yields `true`.
    pub fn should_fetch(&self, local: Option<&T>) -> bool {
        if local.is_none() {
            return true;
        }
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Custom(predicate) => predicate(local),
        }
    }
}

impl<T> Default for FetchPolicy<T> {
    fn default() -> Self {
        Self::Always
    }
}

impl<T> fmt::Debug for FetchPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("FetchPolicy::Always"),
            Self::Never => f.write_str("FetchPolicy::Never"),
            Self::Custom(_) => f.write_str("FetchPolicy::Custom(..)"),
        }
    }
}

/// Decides whether a successfully fetched remote value is surfaced to the
/// consumer of a cache-first one-shot load.
///
/// The fetched value is written to the cache regardless of what this policy
/// says; it only controls the second emission.
#[derive(Clone)]
pub enum EmitPolicy<T> {
    /// Surface every fetched value.
    Always,
    /// Caller-supplied predicate over `(local, remote)`.
    Custom(Arc<dyn Fn(Option<&T>, &T) -> bool + Send + Sync>),
}

impl<T> EmitPolicy<T> {
    /// Build a custom emit policy from a predicate.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(Option<&T>, &T) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    /// Surface the fetched value only when it differs from the local one.
    pub fn if_changed() -> Self
    where
        T: PartialEq + 'static,
    {
        Self::custom(|local, remote| local != Some(remote))
    }

    /// Evaluate the policy against the local and fetched values.
    pub fn should_emit(&self, local: Option<&T>, remote: &T) -> bool {
        match self {
            Self::Always => true,
            Self::Custom(predicate) => predicate(local, remote),
        }
    }
}

impl<T> Default for EmitPolicy<T> {
    fn default() -> Self {
        Self::Always
    }
}

impl<T> fmt::Debug for EmitPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("EmitPolicy::Always"),
            Self::Custom(_) => f.write_str("EmitPolicy::Custom(..)"),
        }
    }
}

/// Decides whether a local value may be surfaced as the fallback of a
/// network-first load whose remote leg produced nothing.
#[derive(Clone)]
pub enum FallbackPolicy<T> {
    /// Any local value is an acceptable fallback.
    Always,
    /// Never degrade to the local value.
    Never,
    /// Caller-supplied predicate over the local value.
    Custom(Arc<dyn Fn(&T) -> bool + Send + Sync>),
}

impl<T> FallbackPolicy<T> {
    /// Build a custom fallback policy from a predicate.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    /// Evaluate the policy against the local value.
    pub fn allows(&self, local: &T) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Custom(predicate) => predicate(local),
        }
    }
}

impl<T> Default for FallbackPolicy<T> {
    fn default() -> Self {
        Self::Always
    }
}

impl<T> fmt::Debug for FallbackPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("FallbackPolicy::Always"),
            Self::Never => f.write_str("FallbackPolicy::Never"),
            Self::Custom(_) => f.write_str("FallbackPolicy::Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_policy_absent_local_always_fetches() {
        assert!(FetchPolicy::<i32>::Always.should_fetch(None));
        assert!(FetchPolicy::<i32>::Never.should_fetch(None));
        assert!(FetchPolicy::<i32>::custom(|_| false).should_fetch(None));
    }

    #[test]
    fn test_fetch_policy_present_local() {
        assert!(FetchPolicy::Always.should_fetch(Some(&1)));
        assert!(!FetchPolicy::Never.should_fetch(Some(&1)));

        let stale_only = FetchPolicy::custom(|local: Option<&i32>| local == Some(&0));
        assert!(stale_only.should_fetch(Some(&0)));
        assert!(!stale_only.should_fetch(Some(&7)));
    }

    #[test]
    fn test_emit_policy_if_changed() {
        let policy = EmitPolicy::<i32>::if_changed();
        assert!(policy.should_emit(None, &1));
        assert!(policy.should_emit(Some(&1), &2));
        assert!(!policy.should_emit(Some(&2), &2));
    }

    #[test]
    fn test_emit_policy_always() {
        let policy = EmitPolicy::<i32>::Always;
        assert!(policy.should_emit(Some(&2), &2));
    }

    #[test]
    fn test_fallback_policy() {
        assert!(FallbackPolicy::Always.allows(&"x"));
        assert!(!FallbackPolicy::Never.allows(&"x"));

        let non_empty = FallbackPolicy::custom(|s: &&str| !s.is_empty());
        assert!(non_empty.allows(&"x"));
        assert!(!non_empty.allows(&""));
    }

    #[test]
    fn test_policies_are_debuggable() {
        assert_eq!(
            format!("{:?}", FetchPolicy::<i32>::Never),
            "FetchPolicy::Never"
        );
        assert_eq!(
            format!("{:?}", EmitPolicy::<i32>::custom(|_, _| true)),
            "EmitPolicy::Custom(..)"
        );
    }
}
