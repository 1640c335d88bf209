//! Freshet Test Utilities
//!
//! Centralized test infrastructure for the Freshet workspace:
//! - Mock collaborators for every contract in `freshet-core`
//! - Call recording for ordering and at-most-once assertions
//! - Subscriber counting for teardown assertions

// Re-export core types for convenience
pub use freshet_core::{
    CacheWriter, ConnectivityProbe, EmitPolicy, FallbackPolicy, FetchPolicy, LoadError,
    LoadResult, LocalSource, ObservableSource, RemoteSource, RequestContext, ResultState,
    SourceError,
};

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

fn boxed_error(message: &str) -> SourceError {
    Box::new(io::Error::other(message.to_string()))
}

// ============================================================================
// MOCK LOCAL SOURCE
// ============================================================================

/// Mock local source with a settable current value and a broadcast-backed
/// observation stream.
///
/// `observe()` yields the current value first, then every later `set`/
/// `push_error`, matching the contract in `freshet-core`.
pub struct MockLocal<T> {
    current: Mutex<Option<T>>,
    fail_reads: AtomicBool,
    read_calls: AtomicUsize,
    tx: broadcast::Sender<Result<Option<T>, String>>,
}

impl<T: Clone + Send + Sync + 'static> MockLocal<T> {
    /// Create a mock holding the given initial value.
    pub fn new(initial: Option<T>) -> Arc<Self> {
        let (tx, _) = broadcast::channel(32);
        Arc::new(Self {
            current: Mutex::new(initial),
            fail_reads: AtomicBool::new(false),
            read_calls: AtomicUsize::new(0),
            tx,
        })
    }

    /// Create an empty mock.
    pub fn empty() -> Arc<Self> {
        Self::new(None)
    }

    /// Replace the current value and notify observers.
    pub fn set(&self, value: Option<T>) {
        *self.current.lock().unwrap() = value.clone();
        // No receivers is fine; observers may come and go.
        let _ = self.tx.send(Ok(value));
    }

    /// Push an erroring item to observers without touching the value.
    pub fn push_error(&self, message: &str) {
        let _ = self.tx.send(Err(message.to_string()));
    }

    /// Make every subsequent `read` (and the head of new observations) fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// How many times `read` was called.
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Number of live observation subscriptions.
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> LocalSource<T> for MockLocal<T> {
    async fn read(&self) -> Result<Option<T>, SourceError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(boxed_error("local store unavailable"));
        }
        Ok(self.current.lock().unwrap().clone())
    }
}

impl<T: Clone + Send + Sync + 'static> ObservableSource<T> for MockLocal<T> {
    fn observe(&self) -> BoxStream<'static, Result<Option<T>, SourceError>> {
        let head: Result<Option<T>, SourceError> = if self.fail_reads.load(Ordering::SeqCst) {
            Err(boxed_error("local store unavailable"))
        } else {
            Ok(self.current.lock().unwrap().clone())
        };
        let rest = BroadcastStream::new(self.tx.subscribe()).filter_map(|item| async move {
            match item {
                Ok(Ok(value)) => Some(Ok(value)),
                Ok(Err(message)) => Some(Err(boxed_error(&message))),
                // Lagged receiver: skip, the next item carries fresher state.
                Err(_) => None,
            }
        });
        stream::iter([head]).chain(rest).boxed()
    }
}

// ============================================================================
// MOCK REMOTE SOURCE
// ============================================================================

enum FetchScript<T> {
    Value(T),
    Empty,
    Fail(String),
}

/// Mock remote source with scripted fetch outcomes and a call counter.
///
/// Outcomes are consumed front to back; the last one repeats once the
/// script is exhausted. An optional delay makes cancellation windows
/// reproducible.
pub struct MockRemote<T> {
    script: Mutex<VecDeque<FetchScript<T>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl<T: Clone + Send + Sync + 'static> MockRemote<T> {
    fn with_script(script: VecDeque<FetchScript<T>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    /// Remote that always returns the given value.
    pub fn value(value: T) -> Arc<Self> {
        Self::with_script(VecDeque::from([FetchScript::Value(value)]))
    }

    /// Remote that succeeds with no value.
    pub fn empty() -> Arc<Self> {
        Self::with_script(VecDeque::from([FetchScript::Empty]))
    }

    /// Remote that fails every fetch.
    pub fn failing(message: &str) -> Arc<Self> {
        Self::with_script(VecDeque::from([FetchScript::Fail(message.to_string())]))
    }

    /// Remote that returns the given value after a fixed delay.
    pub fn value_after(value: T, delay: Duration) -> Arc<Self> {
        let mut remote =
            Arc::into_inner(Self::value(value)).expect("freshly built mock is unshared");
        remote.delay = Some(delay);
        Arc::new(remote)
    }

    /// How many fetches were issued.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> RemoteSource<T> for MockRemote<T> {
    async fn fetch(&self) -> Result<Option<T>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut script = self.script.lock().unwrap();
        let outcome = if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            match script.front() {
                Some(FetchScript::Value(v)) => FetchScript::Value(v.clone()),
                Some(FetchScript::Empty) => FetchScript::Empty,
                Some(FetchScript::Fail(m)) => FetchScript::Fail(m.clone()),
                None => FetchScript::Empty,
            }
        };
        match outcome {
            FetchScript::Value(value) => Ok(Some(value)),
            FetchScript::Empty => Ok(None),
            FetchScript::Fail(message) => Err(boxed_error(&message)),
        }
    }
}

// ============================================================================
// RECORDING CACHE WRITER
// ============================================================================

/// Cache writer that records every write.
///
/// With a target attached it also writes through to a [`MockLocal`], which
/// is how tests model the durable round trip the reactive loader relies on.
pub struct RecordingCacheWriter<T> {
    writes: Mutex<Vec<T>>,
    fail: AtomicBool,
    target: Mutex<Option<Arc<MockLocal<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> RecordingCacheWriter<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            writes: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            target: Mutex::new(None),
        })
    }

    /// Writer that persists into the given local mock on every write.
    pub fn writing_through(target: Arc<MockLocal<T>>) -> Arc<Self> {
        let writer = Self::new();
        *writer.target.lock().unwrap() = Some(target);
        writer
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// All successfully recorded writes, oldest first.
    pub fn writes(&self) -> Vec<T> {
        self.writes.lock().unwrap().clone()
    }

    /// Number of write attempts that succeeded.
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> CacheWriter<T> for RecordingCacheWriter<T> {
    async fn write(&self, value: &T) -> Result<(), SourceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(boxed_error("cache write rejected"));
        }
        self.writes.lock().unwrap().push(value.clone());
        let target = self.target.lock().unwrap().clone();
        if let Some(target) = target {
            target.set(Some(value.clone()));
        }
        Ok(())
    }
}

// ============================================================================
// CONNECTIVITY PROBE
// ============================================================================

/// Probe with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe(pub bool);

impl StaticProbe {
    pub fn online() -> Arc<Self> {
        Arc::new(Self(true))
    }

    pub fn offline() -> Arc<Self> {
        Arc::new(Self(false))
    }
}

impl ConnectivityProbe for StaticProbe {
    fn is_online(&self) -> bool {
        self.0
    }
}
