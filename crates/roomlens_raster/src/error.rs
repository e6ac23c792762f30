use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Failed to decode raster: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Raster buffer has {actual} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, RasterError>;
