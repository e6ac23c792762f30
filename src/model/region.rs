//! Detected regions and region batches.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::geometry::{BoundingBox, ImageDimensions};

/// Object identifier, unique within one detection batch.
pub type RegionId = u32;

/// Identity of a region batch. Bumped on every wholesale replacement.
pub type Generation = u64;

/// An encoded mask raster as delivered by the detection service.
///
/// The bytes are opaque to the overlay beyond being decodable to a
/// full-image-sized alpha raster. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MaskBlob(Arc<[u8]>);

impl MaskBlob {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for MaskBlob {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for MaskBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaskBlob({} bytes)", self.0.len())
    }
}

/// A detected object candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "object_id")]
    pub id: RegionId,
    pub category: String,
    /// Confidence in `[0, 1]`.
    pub score: f32,
    pub bbox: BoundingBox,
    /// Attached by the caller after the JSON payload is parsed.
    #[serde(skip)]
    pub mask: Option<MaskBlob>,
}

impl Region {
    pub fn new(id: RegionId, category: impl Into<String>, score: f32, bbox: BoundingBox) -> Self {
        Self {
            id,
            category: category.into(),
            score: score.clamp(0.0, 1.0),
            bbox: bbox.normalized(),
            mask: None,
        }
    }

    pub fn with_mask(mut self, mask: impl Into<MaskBlob>) -> Self {
        self.mask = Some(mask.into());
        self
    }
}

/// The current detection batch. Array index is z-order: the last region is
/// drawn last and therefore sits on top.
#[derive(Debug, Clone, Default)]
pub struct RegionBatch {
    generation: Generation,
    regions: Vec<Region>,
}

impl RegionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every region and return the new generation.
    pub fn replace(&mut self, regions: Vec<Region>) -> Generation {
        self.generation += 1;
        self.regions = regions;
        self.generation
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Clamp every box into the image bounds.
    pub fn clamp_to(&mut self, dimensions: ImageDimensions) {
        for region in &mut self.regions {
            region.bbox = region.bbox.clamp_to(dimensions);
        }
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
