//! Coordinate transform and clipping: mm plotting plane to the device's
//! usable rectangle in integer device units.

use cutkit_core::{mm_to_units, MediaDescriptor, Point2};
use cutkit_devicedb::DeviceProfile;

/// A transformed vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClippedPoint {
    /// X in device units, clamped to the usable rectangle.
    pub x: i32,
    /// Y in device units, clamped to the usable rectangle.
    pub y: i32,
    /// The vertex fell outside the rectangle and was clamped. Used to
    /// decide Move-vs-Draw at clipped boundaries so the blade never cuts
    /// along a clamp edge.
    pub clipped: bool,
}

/// mm → device-unit transform for one plot job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    off_x_mm: f64,
    off_y_mm: f64,
    xmin: i32,
    xmax: i32,
    ymin: i32,
    ymax: i32,
}

impl Transform {
    /// Build the transform for `media` loaded into a device described by
    /// `profile`, with an additional job offset.
    ///
    /// Right-aligned media (the hardware's default loading position) is
    /// shifted by the width difference between device and media so x=0
    /// still lands on the media's left edge. The clip rectangle is the
    /// media's usable area intersected with the device's, when known.
    pub fn new(media: &MediaDescriptor, profile: &DeviceProfile, offset_mm: Point2) -> Self {
        let mut off_x_mm = media.margin_left_mm + offset_mm.x;
        let off_y_mm = media.margin_top_mm + offset_mm.y;
        if !media.left_aligned && profile.width_mm > media.width_mm {
            off_x_mm += profile.width_mm - media.width_mm;
        }

        let mut xmax_mm = off_x_mm + (media.width_mm - 2.0 * media.margin_left_mm).max(0.0);
        let mut ymax_mm = off_y_mm + (media.height_mm - 2.0 * media.margin_top_mm).max(0.0);
        if profile.width_mm > 0.0 {
            xmax_mm = xmax_mm.min(profile.width_mm);
        }
        if profile.length_mm > 0.0 {
            ymax_mm = ymax_mm.min(profile.length_mm);
        }

        Self {
            off_x_mm,
            off_y_mm,
            xmin: mm_to_units(off_x_mm.min(xmax_mm)),
            xmax: mm_to_units(xmax_mm),
            ymin: mm_to_units(off_y_mm.min(ymax_mm)),
            ymax: mm_to_units(ymax_mm),
        }
    }

    /// Transform and clip one vertex.
    pub fn apply(&self, p: Point2) -> ClippedPoint {
        let x = mm_to_units(p.x + self.off_x_mm);
        let y = mm_to_units(p.y + self.off_y_mm);
        let cx = x.clamp(self.xmin, self.xmax);
        let cy = y.clamp(self.ymin, self.ymax);
        ClippedPoint { x: cx, y: cy, clipped: cx != x || cy != y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutkit_devicedb::{lookup, VENDOR_GRAPHTEC};
    use proptest::prelude::*;

    fn cameo() -> DeviceProfile {
        lookup(VENDOR_GRAPHTEC, 0x1121).unwrap()
    }

    fn plain_media(w: f64, h: f64) -> MediaDescriptor {
        MediaDescriptor { width_mm: w, height_mm: h, ..Default::default() }
    }

    #[test]
    fn identity_for_zero_margins_and_offset() {
        let tf = Transform::new(&plain_media(210.0, 297.0), &cameo(), Point2::new(0.0, 0.0));
        let p = tf.apply(Point2::new(10.0, 10.0));
        assert_eq!((p.x, p.y, p.clipped), (200, 200, false));
    }

    #[test]
    fn margins_and_offset_shift_coordinates() {
        let media = MediaDescriptor {
            margin_left_mm: 5.0,
            margin_top_mm: 3.0,
            ..plain_media(210.0, 297.0)
        };
        let tf = Transform::new(&media, &cameo(), Point2::new(1.0, 2.0));
        let p = tf.apply(Point2::new(0.0, 0.0));
        assert_eq!((p.x, p.y), (mm_to_units(6.0), mm_to_units(5.0)));
        assert!(!p.clipped);
    }

    #[test]
    fn right_aligned_media_is_shifted_by_width_difference() {
        let media = MediaDescriptor { left_aligned: false, ..plain_media(210.0, 297.0) };
        let tf = Transform::new(&media, &cameo(), Point2::new(0.0, 0.0));
        let p = tf.apply(Point2::new(0.0, 0.0));
        assert_eq!(p.x, mm_to_units(304.8 - 210.0));
    }

    #[test]
    fn outside_points_are_clamped_and_flagged() {
        let tf = Transform::new(&plain_media(100.0, 100.0), &cameo(), Point2::new(0.0, 0.0));
        let p = tf.apply(Point2::new(150.0, -3.0));
        assert!(p.clipped);
        assert_eq!((p.x, p.y), (mm_to_units(100.0), 0));
    }

    proptest! {
        /// Clipping against an oversized rectangle is a no-op: the
        /// clipped stream is bit-identical to the unclipped transform.
        #[test]
        fn oversized_media_never_clips(
            x in 0.0f64..290.0,
            y in 0.0f64..990.0,
        ) {
            let tf = Transform::new(&plain_media(300.0, 1000.0), &cameo(), Point2::new(0.0, 0.0));
            let p = tf.apply(Point2::new(x, y));
            prop_assert!(!p.clipped);
            prop_assert_eq!(p.x, mm_to_units(x));
            prop_assert_eq!(p.y, mm_to_units(y));
        }
    }
}
