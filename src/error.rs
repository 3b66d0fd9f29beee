//! Library-wide error and result types.

use thiserror::Error;

/// Result alias used throughout aeskit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Every variant except `Mac` is reported before any output is written or
/// the IV register moves, so the call can be retried with corrected
/// arguments on the same context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Input is not block-aligned for ECB/CBC, a CCM buffer is shorter than
    /// the tag, or a message / associated-data length does not fit the
    /// configured CCM length fields.
    #[error("invalid data length")]
    Length,
    /// A mode other than ECB was initialized without an initialization
    /// vector.
    #[error("initialization vector required")]
    Iv,
    /// CCM or CMAC tag verification failed.
    #[error("authentication tag mismatch")]
    Mac,
    /// Key length is not 128, 192 or 256 bits, or does not match the
    /// requested key size.
    #[error("unsupported key size: {0} bytes")]
    KeySize(usize),
    /// An output buffer has the wrong size for the requested operation.
    #[error("output buffer is {actual} bytes, expected {expected}")]
    BufferSize {
        /// Size the operation needs.
        expected: usize,
        /// Size the caller supplied.
        actual: usize,
    },
    /// A mode parameter is out of range (message describes which one).
    #[error("invalid parameter: {0}")]
    Parameter(&'static str),
    /// Key text contained a non-hex digit or had an odd length.
    #[error("invalid hex string")]
    Hex,
}

impl From<hex::FromHexError> for Error {
    fn from(_: hex::FromHexError) -> Self {
        Error::Hex
    }
}
