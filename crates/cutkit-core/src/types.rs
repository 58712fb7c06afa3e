//! Shared data model: plain 2D points in millimeters, the device-unit
//! bounding box and the media descriptor handed to the device session.

use serde::{Deserialize, Serialize};

use crate::units::MM_PER_UNIT;

/// A 2D coordinate in millimeters, plotting plane.
///
/// The y axis increases *downward* (towards the device feed direction),
/// matching the hardware; all planners and the device session share this
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    /// X position in mm
    pub x: f64,
    /// Y position in mm (increases downward)
    pub y: f64,
}

impl Point2 {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    ///
    /// Used wherever only comparisons matter, to avoid the square root.
    pub fn dist2(&self, other: Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to `other`.
    pub fn dist(&self, other: Point2) -> f64 {
        self.dist2(other).sqrt()
    }

    /// Linear interpolation: `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(&self, other: Point2, t: f64) -> Point2 {
        Point2::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    /// Midpoint between `self` and `other`.
    pub fn midpoint(&self, other: Point2) -> Point2 {
        self.lerp(other, 0.5)
    }
}

impl From<(f64, f64)> for Point2 {
    fn from(p: (f64, f64)) -> Self {
        Point2::new(p.0, p.1)
    }
}

/// Bounding box of everything the device head visited, in device units.
///
/// Accumulated monotonically while commands are emitted. Because the
/// device's y axis increases downward, `lly` is numerically *greater*
/// than `ury` in a non-empty box; that inversion is an invariant of the
/// wire coordinate system, not a bug.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Lower-left x (smallest x visited)
    pub llx: i32,
    /// Lower-left y (largest y visited; device y grows downward)
    pub lly: i32,
    /// Upper-right x (largest x visited)
    pub urx: i32,
    /// Upper-right y (smallest y visited)
    pub ury: i32,
    /// Number of points visited
    pub count: usize,
    /// Conversion factor back to mm (mm per device unit)
    pub unit: f64,
}

impl BoundingBox {
    /// An empty box; `visit` grows it.
    pub fn new() -> Self {
        Self {
            llx: i32::MAX,
            lly: i32::MIN,
            urx: i32::MIN,
            ury: i32::MAX,
            count: 0,
            unit: MM_PER_UNIT,
        }
    }

    /// Record a visited device-unit coordinate.
    pub fn visit(&mut self, x: i32, y: i32) {
        self.llx = self.llx.min(x);
        self.urx = self.urx.max(x);
        self.ury = self.ury.min(y);
        self.lly = self.lly.max(y);
        self.count += 1;
    }

    /// True if nothing was visited yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Width in device units (0 for an empty box).
    pub fn width(&self) -> i32 {
        if self.is_empty() {
            0
        } else {
            self.urx - self.llx
        }
    }

    /// Height in device units (0 for an empty box).
    pub fn height(&self) -> i32 {
        if self.is_empty() {
            0
        } else {
            self.lly - self.ury
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration-mark geometry for print-then-cut jobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegMarks {
    /// Position of the first (top-left) mark, mm from the media origin.
    pub origin: Point2,
    /// Distance between marks along x, mm.
    pub width_mm: f64,
    /// Distance between marks along y, mm.
    pub length_mm: f64,
    /// Ask the device to search for the marks before plotting.
    pub search: bool,
}

/// Describes the loaded media for one plot job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaDescriptor {
    /// Media width in mm.
    pub width_mm: f64,
    /// Media height (length along the feed direction) in mm.
    pub height_mm: f64,
    /// Unusable top margin in mm.
    pub margin_top_mm: f64,
    /// Unusable left margin in mm.
    pub margin_left_mm: f64,
    /// Media is loaded against the left guide rail; when false the media
    /// sits against the right rail and x coordinates are shifted by the
    /// width difference to the device's usable area.
    pub left_aligned: bool,
    /// Optional registration-mark geometry.
    pub regmarks: Option<RegMarks>,
}

impl Default for MediaDescriptor {
    fn default() -> Self {
        // A4 portrait, no margins, left aligned.
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_top_mm: 0.0,
            margin_left_mm: 0.0,
            left_aligned: true,
            regmarks: None,
        }
    }
}
