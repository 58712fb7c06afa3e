use thiserror::Error;

/// Device database error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// No media record with this id.
    #[error("unknown media id {id}")]
    UnknownMedia {
        /// The requested media id.
        id: u16,
    },

    /// No profile for this USB id pair.
    #[error("unknown device {vendor_id:04x}:{product_id:04x}")]
    UnknownDevice {
        /// USB vendor id.
        vendor_id: u16,
        /// USB product id.
        product_id: u16,
    },
}

/// Result alias for database lookups.
pub type Result<T> = std::result::Result<T, DbError>;
