//! Turning encoded region masks into drawable highlights.
//!
//! Extraction never fails: a mask that cannot be decoded is handed back as
//! is, and the overlay draws it as a filled highlight instead of an outline.

use std::sync::Arc;

use roomlens_raster::{AlphaRaster, OutlineSettings, RgbaRaster, extract_outline};
use web_time::Instant;

use crate::model::MaskBlob;

/// What the overlay draws for a hovered or selected region.
#[derive(Debug, Clone, PartialEq)]
pub enum Highlight {
    /// Boundary-only raster, same size as the mask.
    Outline(Arc<RgbaRaster>),
    /// The undecoded mask, drawn as a filled highlight.
    RawMask(MaskBlob),
}

impl Highlight {
    pub fn is_outline(&self) -> bool {
        matches!(self, Highlight::Outline(_))
    }

    pub fn outline(&self) -> Option<&RgbaRaster> {
        match self {
            Highlight::Outline(raster) => Some(raster),
            Highlight::RawMask(_) => None,
        }
    }
}

/// Decode `mask` and extract its outline, falling back to the raw mask.
pub fn extract_highlight(mask: &MaskBlob, settings: &OutlineSettings) -> Highlight {
    let started = Instant::now();
    match AlphaRaster::decode(mask.as_bytes()) {
        Ok(alpha) => {
            let outline = extract_outline(&alpha, settings);
            log::debug!(
                "Outline {}x{} extracted in {:.1}ms",
                outline.width(),
                outline.height(),
                started.elapsed().as_secs_f64() * 1000.0
            );
            Highlight::Outline(Arc::new(outline))
        }
        Err(e) => {
            log::warn!("Mask decode failed, keeping raw mask ({} bytes): {}", mask.len(), e);
            Highlight::RawMask(mask.clone())
        }
    }
}
