use thiserror::Error;

/// Errors reported by the settings store. Record level errors (`UnsupportedVersion`,
/// `ChecksumMismatch`) are only returned by [`crate::record::decode`]; the store itself treats
/// such slots as unusable and falls back to the settings it already holds.
#[derive(Error, Debug, PartialEq, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The settings sector has to start on an erase block boundary of the flash
    #[error("invalid sector offset")]
    InvalidSectorOffset,

    /// The 64k settings sector has to be a multiple of the flash erase size
    #[error("unsupported erase size")]
    UnsupportedEraseSize,

    /// Read and write granularity of the flash has to evenly divide a 256 byte slot
    #[error("unsupported access size")]
    UnsupportedAccessSize,

    /// The settings sector does not fit into the flash
    #[error("sector out of bounds")]
    SectorOutOfBounds,

    /// The internal error value is returned from the provided flash driver. Once reported, the
    /// store refuses further flash access.
    #[error("internal flash error")]
    FlashError,

    /// The version byte matches none of the known record layouts
    #[error("unsupported record version: {0}")]
    UnsupportedVersion(u8),

    /// The stored checksum does not match the record contents
    #[error("checksum mismatch: stored {stored:#04x}, computed {computed:#04x}")]
    ChecksumMismatch { stored: u8, computed: u8 },
}
