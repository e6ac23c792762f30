//! Pixel buffers and mask outline extraction for RoomLens overlays.
//!
//! The types here are independent of any graphics API: a mask is
//! an [`AlphaRaster`] (one alpha byte per pixel) and an outline is an
//! [`RgbaRaster`] of the same size.

pub mod error;
pub mod outline;
pub mod raster;

pub use error::{RasterError, Result};
pub use outline::{
    extract_outline, OutlineSettings, DEFAULT_ALPHA_THRESHOLD, DEFAULT_HIGHLIGHT_COLOR,
};
pub use raster::{AlphaRaster, RgbaRaster};
