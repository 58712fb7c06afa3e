//! Hardware capability profiles.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// USB vendor id shared by the whole Graphtec/Silhouette family.
pub const VENDOR_GRAPHTEC: u16 = 0x0b4d;

/// Capabilities of one plotter model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// USB vendor id.
    pub vendor_id: u16,
    /// USB product id.
    pub product_id: u16,
    /// Marketing name.
    pub name: String,
    /// Usable cutting width in mm.
    pub width_mm: f64,
    /// Usable cutting length in mm.
    pub length_mm: f64,
    /// Unusable margin around the usable area in mm.
    pub margin_mm: f64,
    /// The optical sensor can search for registration marks.
    pub regmark: bool,
}

impl DeviceProfile {
    fn new(
        product_id: u16,
        name: &str,
        width_mm: f64,
        length_mm: f64,
        margin_mm: f64,
        regmark: bool,
    ) -> Self {
        Self {
            vendor_id: VENDOR_GRAPHTEC,
            product_id,
            name: name.to_string(),
            width_mm,
            length_mm,
            margin_mm,
            regmark,
        }
    }

    /// Fallback profile for an unrecognized same-vendor device: no known
    /// capabilities, conservative dimensions.
    pub fn unknown(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            name: format!("unknown device {vendor_id:04x}:{product_id:04x}"),
            width_mm: 0.0,
            length_mm: 0.0,
            margin_mm: 0.0,
            regmark: false,
        }
    }
}

static PROFILES: OnceLock<Vec<DeviceProfile>> = OnceLock::new();

/// The built-in hardware table.
pub fn profiles() -> &'static [DeviceProfile] {
    PROFILES.get_or_init(|| {
        vec![
            DeviceProfile::new(0x110a, "Craft Robo CC200-20", 200.0, 1000.0, 5.0, false),
            DeviceProfile::new(0x111a, "Craft Robo CC300-20", 200.0, 1000.0, 5.0, false),
            DeviceProfile::new(0x111c, "Silhouette SD 1", 200.0, 1000.0, 5.0, false),
            DeviceProfile::new(0x111d, "Silhouette SD 2", 200.0, 1000.0, 5.0, false),
            DeviceProfile::new(0x1121, "Silhouette Cameo", 304.8, 3000.0, 10.0, true),
            DeviceProfile::new(0x112b, "Silhouette Cameo 2", 304.8, 3000.0, 10.0, true),
            DeviceProfile::new(0x112f, "Silhouette Cameo 3", 304.8, 3000.0, 10.0, true),
            DeviceProfile::new(0x1123, "Silhouette Portrait", 203.2, 3000.0, 10.0, true),
            DeviceProfile::new(0x1132, "Silhouette Portrait 2", 203.2, 3000.0, 10.0, true),
        ]
    })
}

/// Look up a profile by USB id pair.
///
/// Exact matches come from the table; an unrecognized product from the
/// same vendor falls back to [`DeviceProfile::unknown`] so a session can
/// still be established against it. Foreign vendors yield `None`.
pub fn lookup(vendor_id: u16, product_id: u16) -> Option<DeviceProfile> {
    if let Some(p) = profiles()
        .iter()
        .find(|p| p.vendor_id == vendor_id && p.product_id == product_id)
    {
        return Some(p.clone());
    }
    if vendor_id == VENDOR_GRAPHTEC {
        tracing::warn!(
            vendor_id,
            product_id,
            "unrecognized device from a known vendor, using generic profile"
        );
        return Some(DeviceProfile::unknown(vendor_id, product_id));
    }
    None
}
