//! # CutKit
//!
//! Driver stack for Graphtec-family knife/pen cutting plotters.
//!
//! An upstream document layer hands CutKit a list of already-flattened
//! polylines in millimeters; CutKit orders and shapes the cuts (mat-free
//! barrier sweep or minimal-travel), post-processes the paths (fusing,
//! multipass, overcut) and drives the device over its `0x03`-terminated
//! ASCII protocol, returning the realized bounding box and a trailer
//! command.
//!
//! The workspace members:
//! - `cutkit-core` — geometry kernel, point/path model, shared types
//! - `cutkit-planner` — planning strategies and post-processing
//! - `cutkit-devicedb` — hardware capability and media tables
//! - `cutkit-device` — transport, wire protocol, plot session
//!
//! This facade crate re-exports the public surface and provides the
//! one-call [`pipeline`].

pub mod pipeline;

pub use cutkit_core::{BoundingBox, MediaDescriptor, Point2, RegMarks};
pub use cutkit_device::{
    discover, open_first, DeviceError, PlotOutcome, RecordingTransport, SerialTransport, Session,
    SessionState, SetupParams, TrailerMode, TransportParams,
};
pub use cutkit_devicedb::{lookup, media_table, DeviceProfile};
pub use cutkit_planner::{Axis, MinTravelOptions, PlannerConfig};
pub use pipeline::{plan, plot_job, PlanOptions, Strategy};
