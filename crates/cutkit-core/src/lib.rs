//! # CutKit Core
//!
//! Core types and algorithms for CutKit: the geometry kernel (orientation,
//! sharp-turn and intersection predicates), the interning point/path model
//! used by the cut planners, device-unit conversions and the shared data
//! model (bounding box, media descriptor).
//!
//! Everything in this crate is pure and synchronous; device I/O lives in
//! `cutkit-device`, planning strategies in `cutkit-planner`.

pub mod error;
pub mod geom;
pub mod model;
pub mod types;
pub mod units;

pub use error::{CoreError, Result};
pub use geom::{ccw, collinear, intersect_lines, intersect_x, intersect_y, sharp_turn, EPSILON};
pub use model::{Link, Path, Point, PointArena, PointId};
pub use types::{BoundingBox, MediaDescriptor, Point2, RegMarks};
pub use units::{mm_to_units, units_to_mm, MM_PER_UNIT, UNITS_PER_MM};
