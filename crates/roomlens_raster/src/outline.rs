//! Boundary extraction from alpha masks.
//!
//! A pixel belongs to the outline when it is inside the mask and at least one
//! of its four axis-aligned neighbors is outside the mask or outside the
//! raster. Diagonal edges come out as pixel staircases.

use serde::{Deserialize, Serialize};

use crate::raster::{AlphaRaster, RgbaRaster};

/// Pixels with alpha strictly above this value are inside the mask.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 128;

/// Outline color used when none is configured (opaque sky blue).
pub const DEFAULT_HIGHLIGHT_COLOR: [u8; 4] = [56, 189, 248, 255];

/// Parameters for outline extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSettings {
    /// Alpha values above this are treated as mask membership.
    #[serde(default = "default_alpha_threshold")]
    pub alpha_threshold: u8,
    /// RGBA color painted on boundary pixels.
    #[serde(default = "default_highlight_color")]
    pub color: [u8; 4],
}

fn default_alpha_threshold() -> u8 {
    DEFAULT_ALPHA_THRESHOLD
}

fn default_highlight_color() -> [u8; 4] {
    DEFAULT_HIGHLIGHT_COLOR
}

impl Default for OutlineSettings {
    fn default() -> Self {
        Self {
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            color: DEFAULT_HIGHLIGHT_COLOR,
        }
    }
}

/// Derive a boundary-only raster from a mask in a single pass.
pub fn extract_outline(mask: &AlphaRaster, settings: &OutlineSettings) -> RgbaRaster {
    let width = mask.width();
    let height = mask.height();
    let mut outline = RgbaRaster::transparent(width, height);

    let threshold = settings.alpha_threshold;
    let inside = |x: i64, y: i64| mask.get_signed(x, y).is_some_and(|a| a > threshold);

    for y in 0..height {
        for x in 0..width {
            let (xi, yi) = (i64::from(x), i64::from(y));
            if !inside(xi, yi) {
                continue;
            }
            let on_boundary = !inside(xi - 1, yi)
                || !inside(xi + 1, yi)
                || !inside(xi, yi - 1)
                || !inside(xi, yi + 1);
            if on_boundary {
                outline.put(x, y, settings.color);
            }
        }
    }

    log::trace!(
        "Extracted outline for {}x{} mask: {} boundary pixels",
        width,
        height,
        outline.painted_count()
    );

    outline
}
