//! # CutKit Device Database
//!
//! Static capability tables for the supported cutting plotters: hardware
//! profiles keyed by USB (vendor id, product id) and the media table with
//! default speed/pressure per media kind.
//!
//! Both tables are read-only, process-wide and loaded once; nothing here
//! touches hardware.

pub mod error;
pub mod media;
pub mod model;

pub use error::{DbError, Result};
pub use media::{clamp_pressure, clamp_speed, media_default, media_table, MediaRecord};
pub use model::{lookup, profiles, DeviceProfile, VENDOR_GRAPHTEC};
