//! Adapters from raw loader streams to [`ResultState`] streams.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_stream::stream;
use freshet_core::{LoadError, LoadResult, ResultState};
use futures_util::{Stream, StreamExt};

/// Builders turning raw loader output into state streams.
///
/// A state stream always begins with [`ResultState::Loading`], maps values
/// to `Success`, absence to `Empty`, and a taxonomy failure to a terminal
/// `Error`. It never fails itself.
pub struct ResultStates;

impl ResultStates {
    /// Adapt a stream of plain values (the cache-first strategies).
    pub fn from_values<T, S>(upstream: S) -> impl Stream<Item = ResultState<T>>
    where
        S: Stream<Item = LoadResult<T>>,
    {
        stream! {
            yield ResultState::Loading;
            futures_util::pin_mut!(upstream);
            while let Some(item) = upstream.next().await {
                match item {
                    Ok(value) => yield ResultState::Success(value),
                    Err(err) => {
                        yield ResultState::Error(err);
                        break;
                    }
                }
            }
        }
    }

    /// Adapt a stream of optional values (the network-first strategy),
    /// mapping `None` to [`ResultState::Empty`].
    pub fn from_optional<T, S>(upstream: S) -> impl Stream<Item = ResultState<T>>
    where
        S: Stream<Item = LoadResult<Option<T>>>,
    {
        stream! {
            yield ResultState::Loading;
            futures_util::pin_mut!(upstream);
            while let Some(item) = upstream.next().await {
                match item {
                    Ok(value) => yield ResultState::from(value),
                    Err(err) => {
                        yield ResultState::Error(err);
                        break;
                    }
                }
            }
        }
    }
}

/// Stream combinator that hides transient errors.
///
/// See [`ResultStateStreamExt::suppress_transient_errors`].
pub struct SuppressTransientErrors<S> {
    upstream: S,
    pending: Option<LoadError>,
    done: bool,
}

impl<S, T> Stream for SuppressTransientErrors<S>
where
    S: Stream<Item = ResultState<T>> + Unpin,
{
    type Item = ResultState<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        loop {
            match this.upstream.poll_next_unpin(cx) {
                Poll::Ready(Some(state)) => match state {
                    // Held, not emitted: the next event decides its fate.
                    ResultState::Error(err) => this.pending = Some(err),
                    // A fresh attempt invalidates a stale pending error.
                    ResultState::Loading => {
                        this.pending = None;
                        return Poll::Ready(Some(ResultState::Loading));
                    }
                    // The pending error was transient; it is superseded.
                    state => {
                        this.pending = None;
                        return Poll::Ready(Some(state));
                    }
                },
                Poll::Ready(None) => {
                    this.done = true;
                    // Never superseded: the error was the last word.
                    return match this.pending.take() {
                        Some(err) => Poll::Ready(Some(ResultState::Error(err))),
                        None => Poll::Ready(None),
                    };
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Extension methods for state streams.
pub trait ResultStateStreamExt<T>: Stream<Item = ResultState<T>> + Sized {
    /// Hold each `Error` state back instead of emitting it immediately.
    ///
    /// A following `Loading` clears it, a following `Success`/`Empty`
    /// clears and discards it, and only an error still pending when the
    /// upstream completes normally is emitted, as the final state. A
    /// dropped stream (the cancellation path) discards it silently.
    ///
    /// A loader may legitimately report an intermediate remote error and
    /// then recover through a later local observation; surfacing the error
    /// in that window would flicker in the UI.
    fn suppress_transient_errors(self) -> SuppressTransientErrors<Self> {
        SuppressTransientErrors {
            upstream: self,
            pending: None,
            done: false,
        }
    }
}

impl<S, T> ResultStateStreamExt<T> for S where S: Stream<Item = ResultState<T>> + Sized {}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    async fn collect<T: Clone, S: Stream<Item = ResultState<T>>>(s: S) -> Vec<ResultState<T>> {
        futures_util::pin_mut!(s);
        let mut out = Vec::new();
        while let Some(state) = s.next().await {
            out.push(state);
        }
        out
    }

    fn kinds<T>(states: &[ResultState<T>]) -> Vec<&'static str> {
        states
            .iter()
            .map(|s| match s {
                ResultState::Loading => "loading",
                ResultState::Success(_) => "success",
                ResultState::Empty => "empty",
                ResultState::Error(_) => "error",
            })
            .collect()
    }

    #[tokio::test]
    async fn test_from_values_starts_with_loading() {
        let upstream = stream::iter(vec![Ok(1), Ok(2)]);
        let states = collect(ResultStates::from_values(upstream)).await;
        assert_eq!(kinds(&states), vec!["loading", "success", "success"]);
    }

    #[tokio::test]
    async fn test_from_values_error_is_terminal() {
        let upstream = stream::iter(vec![Ok(1), Err(LoadError::RemoteEmpty)]);
        let states = collect(ResultStates::from_values(upstream)).await;
        assert_eq!(kinds(&states), vec!["loading", "success", "error"]);
    }

    #[tokio::test]
    async fn test_from_optional_maps_absence_to_empty() {
        let upstream = stream::iter(vec![Ok(Some(1)), Ok(None)]);
        let states = collect(ResultStates::from_optional(upstream)).await;
        assert_eq!(kinds(&states), vec!["loading", "success", "empty"]);
    }

    #[tokio::test]
    async fn test_suppression_hides_superseded_error() {
        let upstream = stream::iter(vec![
            ResultState::Loading,
            ResultState::Error(LoadError::RemoteEmpty),
            ResultState::Success(3),
        ]);
        let states = collect(upstream.suppress_transient_errors()).await;
        assert_eq!(kinds(&states), vec!["loading", "success"]);
    }

    #[tokio::test]
    async fn test_suppression_emits_unsuperseded_error_last() {
        let upstream = stream::iter(vec![
            ResultState::<i32>::Loading,
            ResultState::Error(LoadError::NetworkUnavailable),
        ]);
        let states = collect(upstream.suppress_transient_errors()).await;
        assert_eq!(kinds(&states), vec!["loading", "error"]);
    }

    #[tokio::test]
    async fn test_suppression_loading_clears_pending_error() {
        let upstream = stream::iter(vec![
            ResultState::<i32>::Loading,
            ResultState::Error(LoadError::RemoteEmpty),
            ResultState::Loading,
        ]);
        let states = collect(upstream.suppress_transient_errors()).await;
        assert_eq!(kinds(&states), vec!["loading", "loading"]);
    }

    #[tokio::test]
    async fn test_suppression_keeps_only_latest_error() {
        let upstream = stream::iter(vec![
            ResultState::<i32>::Error(LoadError::RemoteEmpty),
            ResultState::Error(LoadError::NetworkUnavailable),
        ]);
        let states = collect(upstream.suppress_transient_errors()).await;
        assert_eq!(kinds(&states), vec!["error"]);
        assert!(states[0].error().unwrap().is_network_unavailable());
    }

    #[tokio::test]
    async fn test_suppression_empty_clears_pending_error() {
        let upstream = stream::iter(vec![
            ResultState::<i32>::Error(LoadError::RemoteEmpty),
            ResultState::Empty,
        ]);
        let states = collect(upstream.suppress_transient_errors()).await;
        assert_eq!(kinds(&states), vec!["empty"]);
    }
}
