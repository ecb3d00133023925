use thiserror::Error;

/// Returned when a cache is constructed with unusable settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("capacity must be greater than zero")]
    ZeroCapacity,
    #[error("invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Returned by [`CacheFront::fetch`](crate::CacheFront::fetch) when no value can be produced.
///
/// Neither variant leaves anything behind in the cache.
#[derive(Error, Debug)]
pub enum FetchError<E> {
    /// The key is neither cached nor known to the backing store.
    #[error("key not found in cache or backing store")]
    NotFound,
    /// The backing store failed to answer. The error is passed through untouched.
    #[error("backing store lookup failed")]
    Source(#[source] E),
}

impl<E> FetchError<E> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound)
    }
}
