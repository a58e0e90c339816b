use thiserror::Error;

/// Error variants for engine construction.
///
/// The hot paths (encoding, decoding, selection) are infallible by design;
/// everything that can be rejected is rejected up front.
#[derive(Debug, Error)]
pub enum Error
{
    /// The configuration cannot be honoured.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The dedicated worker pool could not be built.
    #[error("worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A specialized Result type for engine construction.
pub type Result<T> = std::result::Result<T, Error>;
