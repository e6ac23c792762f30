//! Global constants for the RoomLens overlay core

/// Upload and resize limits.
pub mod limits {
    /// Largest accepted upload (10 MiB).
    pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

    /// Smallest accepted decoded width in pixels.
    pub const MIN_WIDTH: u32 = 400;

    /// Smallest accepted decoded height in pixels.
    pub const MIN_HEIGHT: u32 = 400;

    /// Longest side after downsampling.
    pub const DEFAULT_MAX_DIMENSION: u32 = 1920;

    /// JPEG quality used when re-encoding resized uploads.
    pub const DEFAULT_JPEG_QUALITY: u8 = 85;

    /// No preprocessed payload is ever returned above this size.
    pub const HARD_CEILING_BYTES: u64 = 10 * 1024 * 1024;
}

/// MIME types.
pub mod mime {
    /// Every accepted upload MIME type starts with this prefix.
    pub const IMAGE_PREFIX: &str = "image/";

    /// Resized uploads are always re-encoded to this type.
    pub const OUTPUT: &str = "image/jpeg";

    /// File extension matching [`OUTPUT`].
    pub const OUTPUT_EXTENSION: &str = "jpg";
}
