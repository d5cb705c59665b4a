//! Three-way result for anything fetched over the network.

use std::fmt::Display;

/// A value that is still loading, has loaded, or failed to load.
///
/// Replaces the usual pair of `loading`/`error` flags: exactly one of the
/// three states holds at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loadable<T> {
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T> Loadable<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loadable<U> {
        match self {
            Self::Pending => Loadable::Pending,
            Self::Ready(value) => Loadable::Ready(f(value)),
            Self::Failed(reason) => Loadable::Failed(reason),
        }
    }

    pub fn into_result(self) -> Result<Option<T>, String> {
        match self {
            Self::Pending => Ok(None),
            Self::Ready(value) => Ok(Some(value)),
            Self::Failed(reason) => Err(reason),
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for Loadable<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}
