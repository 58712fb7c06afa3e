//! # CutKit Device
//!
//! The device side of CutKit: transport abstraction over USB-CDC serial,
//! the `0x03`-terminated ASCII wire protocol, coordinate transform and
//! clipping, and the synchronous plot session.
//!
//! All I/O is blocking with explicit timeouts; one session owns one
//! transport handle at a time and commands are delivered strictly in the
//! order the planner produced them.

pub mod error;
pub mod protocol;
pub mod session;
pub mod transform;
pub mod transport;

pub use error::{DeviceError, Result};
pub use protocol::{parse_status, DeviceCommand, SessionState, CMD_TERMINATOR, STATUS_REQUEST};
pub use session::{PlotOutcome, Session, SetupParams, TrailerMode};
pub use transform::{ClippedPoint, Transform};
pub use transport::{
    discover, open_first, DeviceTransport, DiscoveredDevice, RecordingTransport, SerialTransport,
    TransportParams, TransportWrite,
};
