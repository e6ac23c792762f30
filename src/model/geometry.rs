//! Geometry types shared by the mapper, hit tester and box selector.

use serde::{Deserialize, Serialize};

// ============================================================================
// Points and Sizes
// ============================================================================

/// A 2D point. Which space it lives in depends on the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Decoded pixel size of the original image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn longest_side(&self) -> u32 {
        self.width.max(self.height)
    }
}

// ============================================================================
// Rectangles
// ============================================================================

/// A bounding rectangle as reported by the rendering environment
/// (page coordinates, top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A rectangle in display (or element-local) space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// An axis-aligned box in original pixel space, stored as corners.
///
/// `x1 <= x2` and `y1 <= y2` hold for boxes built through
/// [`from_corners`](Self::from_corners) and for every deserialized box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "BoxCorners")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    /// Create a normalized box from two arbitrary corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x1: a.x.min(b.x),
            y1: a.y.min(b.y),
            x2: a.x.max(b.x),
            y2: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Same box with corners swapped as needed so that `x1 <= x2`, `y1 <= y2`.
    pub fn normalized(&self) -> Self {
        Self::from_corners(Point::new(self.x1, self.y1), Point::new(self.x2, self.y2))
    }

    /// Normalize and clamp into `[0,width]×[0,height]`.
    pub fn clamp_to(&self, dimensions: ImageDimensions) -> Self {
        let w = dimensions.width as f32;
        let h = dimensions.height as f32;
        Self::from_corners(
            Point::new(self.x1.clamp(0.0, w), self.y1.clamp(0.0, h)),
            Point::new(self.x2.clamp(0.0, w), self.y2.clamp(0.0, h)),
        )
    }
}

/// Corners as they arrive on the wire, in any order.
#[derive(Deserialize)]
struct BoxCorners {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl From<BoxCorners> for BoundingBox {
    fn from(c: BoxCorners) -> Self {
        Self::from_corners(Point::new(c.x1, c.y1), Point::new(c.x2, c.y2))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_from_corners_any_direction() {
        let a = Point::new(300.0, 40.0);
        let b = Point::new(20.0, 500.0);
        let forward = BoundingBox::from_corners(a, b);
        let backward = BoundingBox::from_corners(b, a);
        assert_eq!(forward, backward);
        assert_eq!(forward.x1, 20.0);
        assert_eq!(forward.y1, 40.0);
        assert_eq!(forward.x2, 300.0);
        assert_eq!(forward.y2, 500.0);
    }

    #[test]
    fn test_bbox_deserialize_reversed_corners() {
        let bbox: BoundingBox =
            serde_json::from_str(r#"{"x1": 700, "y1": 750, "x2": 100, "y2": 400}"#).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x1: 100.0,
                y1: 400.0,
                x2: 700.0,
                y2: 750.0
            }
        );
        assert_eq!((bbox.width(), bbox.height()), (600.0, 350.0));
    }

    #[test]
    fn test_bbox_normalized() {
        let reversed = BoundingBox {
            x1: 20.0,
            y1: 30.0,
            x2: 10.0,
            y2: 10.0,
        };
        let bbox = reversed.normalized();
        assert_eq!((bbox.x1, bbox.y1, bbox.x2, bbox.y2), (10.0, 10.0, 20.0, 30.0));
    }

    #[test]
    fn test_bbox_clamp_to_image() {
        let bbox = BoundingBox {
            x1: 900.0,
            y1: -5.0,
            x2: -20.0,
            y2: 700.0,
        };
        let clamped = bbox.clamp_to(ImageDimensions::new(640, 480));
        assert_eq!(
            clamped,
            BoundingBox {
                x1: 0.0,
                y1: 0.0,
                x2: 640.0,
                y2: 480.0
            }
        );
    }

    #[test]
    fn test_display_rect_contains() {
        let rect = DisplayRect::new(5.0, 5.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(5.0, 15.0)));
        assert!(!rect.contains(Point::new(4.9, 10.0)));
    }

    #[test]
    fn test_dimensions_helpers() {
        assert!(ImageDimensions::new(0, 10).is_empty());
        assert_eq!(ImageDimensions::new(4000, 2000).longest_side(), 4000);
    }
}
