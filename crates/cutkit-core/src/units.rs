//! Device-unit conversion.
//!
//! The plotter's native step size is 0.05 mm, so 20 device units make one
//! millimeter. Wire commands carry integer device units; everything above
//! the device session works in mm.

/// Device units per millimeter.
pub const UNITS_PER_MM: f64 = 20.0;

/// Millimeters per device unit (the step size of the hardware).
pub const MM_PER_UNIT: f64 = 0.05;

/// Convert millimeters to integer device units, rounding to the nearest
/// step.
pub fn mm_to_units(mm: f64) -> i32 {
    (mm * UNITS_PER_MM).round() as i32
}

/// Convert integer device units back to millimeters.
pub fn units_to_mm(units: i32) -> f64 {
    units as f64 * MM_PER_UNIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_mm_is_200_units() {
        assert_eq!(mm_to_units(10.0), 200);
    }

    #[test]
    fn rounds_to_nearest_step() {
        assert_eq!(mm_to_units(0.024), 0);
        assert_eq!(mm_to_units(0.026), 1);
        assert_eq!(mm_to_units(-1.0), -20);
    }

    #[test]
    fn round_trip_is_exact_on_steps() {
        for u in [-400, -1, 0, 1, 200, 6000] {
            assert_eq!(mm_to_units(units_to_mm(u)), u);
        }
    }
}
