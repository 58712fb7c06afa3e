//! Device-session error taxonomy.
//!
//! Session errors are fail-fast: a half-sent command stream can leave
//! the hardware in an inconsistent state, so the job stops rather than
//! limping onward. The exceptions are status-poll timeouts and malformed
//! status frames, which the polling loops retry themselves.

use thiserror::Error;

/// Errors raised by transports and the device session.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// No matching USB device was found at session construction.
    #[error("no supported device found ({candidates} candidate ports scanned)")]
    DeviceNotFound {
        /// Number of serial ports inspected.
        candidates: usize,
    },

    /// A chunk write stopped short and retries were exhausted.
    #[error("incomplete write: {written} of {len} bytes sent")]
    WriteIncomplete {
        /// Bytes actually accepted by the device.
        written: usize,
        /// Bytes that should have been sent.
        len: usize,
    },

    /// A write made no progress after bounded retries.
    #[error("write failed after {retries} retries")]
    WriteFailed {
        /// Retries attempted before giving up.
        retries: u32,
    },

    /// A read produced nothing within its timeout.
    ///
    /// Non-fatal for status polls (the polling loop retries); fatal when
    /// it happens during a required protocol handshake.
    #[error("read timed out after {timeout_ms}ms")]
    ReadTimeout {
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// A status frame was unterminated or unparseable.
    #[error("malformed status frame: {bytes:?}")]
    MalformedStatus {
        /// The raw bytes received.
        bytes: Vec<u8>,
    },

    /// The registration-mark search exceeded its timeout.
    ///
    /// Fatal to the current job; the device handle remains valid.
    #[error("registration marks not found within {timeout_ms}ms")]
    RegistrationNotFound {
        /// The search timeout, in milliseconds.
        timeout_ms: u64,
    },

    /// Degenerate input geometry (empty path list, single-point path).
    #[error("degenerate geometry: {reason}")]
    InvalidGeometry {
        /// What made the input degenerate.
        reason: String,
    },

    /// Low-level I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-layer failure (port enumeration, open, configuration).
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<serialport::Error> for DeviceError {
    fn from(e: serialport::Error) -> Self {
        DeviceError::Transport(e.to_string())
    }
}

/// Result alias for device operations.
pub type Result<T> = std::result::Result<T, DeviceError>;
