//! Media table: default cutting parameters per media kind.
//!
//! Ids follow the vendor's media numbering; 300 is the "custom" slot
//! whose parameters the caller always supplies explicitly.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

/// Valid speed range for the supported devices.
pub const SPEED_RANGE: (u8, u8) = (1, 10);

/// Valid pressure range for the supported devices.
pub const PRESSURE_RANGE: (u8, u8) = (1, 33);

/// One media kind and its recommended parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Vendor media id.
    pub id: u16,
    /// Human-readable description.
    pub name: String,
    /// Recommended speed (1..=10).
    pub speed: u8,
    /// Recommended pressure (1..=33).
    pub pressure: u8,
}

impl MediaRecord {
    fn new(id: u16, name: &str, speed: u8, pressure: u8) -> Self {
        Self { id, name: name.to_string(), speed, pressure }
    }
}

static MEDIA: OnceLock<Vec<MediaRecord>> = OnceLock::new();

/// The built-in media table.
pub fn media_table() -> &'static [MediaRecord] {
    MEDIA.get_or_init(|| {
        vec![
            MediaRecord::new(100, "Card, without craft paper backing", 10, 27),
            MediaRecord::new(101, "Card, with craft paper backing", 10, 27),
            MediaRecord::new(102, "Vinyl sticker", 10, 10),
            MediaRecord::new(106, "Film labels", 10, 14),
            MediaRecord::new(111, "Thick media", 10, 27),
            MediaRecord::new(112, "Thin media", 10, 2),
            MediaRecord::new(113, "Pen", 10, 10),
            MediaRecord::new(120, "Bond paper 13-28 lbs (105g)", 10, 5),
            MediaRecord::new(121, "Bristol paper 57-67 lbs (145g)", 10, 25),
            MediaRecord::new(122, "Cardstock 40-60 lbs (90g)", 10, 20),
            MediaRecord::new(123, "Cover 40-60 lbs (170g)", 1, 27),
            MediaRecord::new(124, "Film, double matte translucent", 10, 1),
            MediaRecord::new(125, "Film, vinyl with adhesive back", 10, 4),
            MediaRecord::new(126, "Film, window with kling adhesive", 10, 12),
            MediaRecord::new(127, "Index 90 lbs (165g)", 10, 25),
            MediaRecord::new(128, "Inkjet photo paper 28-44 lbs (70g)", 10, 25),
            MediaRecord::new(129, "Inkjet photo paper 45-75 lbs (110g)", 10, 27),
            MediaRecord::new(300, "Custom", 10, 30),
        ]
    })
}

/// Look up the default parameters for a media id.
pub fn media_default(id: u16) -> Result<&'static MediaRecord> {
    media_table()
        .iter()
        .find(|m| m.id == id)
        .ok_or(DbError::UnknownMedia { id })
}

/// Clamp a speed to the device range. Out-of-range values are clamped,
/// not rejected.
pub fn clamp_speed(speed: u8) -> u8 {
    speed.clamp(SPEED_RANGE.0, SPEED_RANGE.1)
}

/// Clamp a pressure to the device range.
pub fn clamp_pressure(pressure: u8) -> u8 {
    pressure.clamp(PRESSURE_RANGE.0, PRESSURE_RANGE.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_media_has_defaults() {
        let m = media_default(113).unwrap();
        assert_eq!(m.name, "Pen");
        assert_eq!(m.speed, 10);
    }

    #[test]
    fn unknown_media_is_an_error() {
        assert_eq!(media_default(999).unwrap_err(), DbError::UnknownMedia { id: 999 });
    }

    #[test]
    fn all_table_defaults_are_in_range() {
        for m in media_table() {
            assert_eq!(m.speed, clamp_speed(m.speed), "{}", m.name);
            assert_eq!(m.pressure, clamp_pressure(m.pressure), "{}", m.name);
        }
    }

    #[test]
    fn clamping_is_saturating() {
        assert_eq!(clamp_speed(0), 1);
        assert_eq!(clamp_speed(200), 10);
        assert_eq!(clamp_pressure(0), 1);
        assert_eq!(clamp_pressure(99), 33);
    }
}
