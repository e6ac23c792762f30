//! Data models for the overlay core.

mod geometry;
mod region;

pub use geometry::{BoundingBox, DisplayRect, ElementRect, ImageDimensions, Point};
pub use region::{Generation, MaskBlob, Region, RegionBatch, RegionId};
