//! Consumer-facing result states for state-emitting loader streams.

use crate::error::LoadError;

/// State of a load as observed by a consumer.
///
/// State-adapted streams always begin with [`ResultState::Loading`]. After
/// that the stream may emit any number of `Success`/`Empty` states and at
/// most one terminal `Error` (or none).
#[derive(Debug)]
pub enum ResultState<T> {
    /// The load has started and nothing has been produced yet.
    Loading,
    /// A value was produced.
    Success(T),
    /// The load finished and legitimately found nothing.
    Empty,
    /// Terminal failure: no usable data could be produced at all.
    Error(LoadError),
}

impl<T> ResultState<T> {
    /// Returns true for [`ResultState::Loading`].
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true for [`ResultState::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true for [`ResultState::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns true for [`ResultState::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Get a reference to the success value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Consume the state and return the success value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Get a reference to the terminal error, if any.
    pub fn error(&self) -> Option<&LoadError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Map the success value to a new type, leaving other states untouched.
    pub fn map<U, F>(self, f: F) -> ResultState<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Loading => ResultState::Loading,
            Self::Success(value) => ResultState::Success(f(value)),
            Self::Empty => ResultState::Empty,
            Self::Error(err) => ResultState::Error(err),
        }
    }
}

impl<T> From<Option<T>> for ResultState<T> {
    /// `Some` becomes `Success`, `None` becomes `Empty`.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Success(value),
            None => Self::Empty,
        }
    }
}
