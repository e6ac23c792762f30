//! Original-image ↔ display coordinate mapping.
//!
//! The rendered image element may be scaled (independently per axis) and
//! offset inside its container. Three spaces are involved:
//!
//! - **original**: pixels of the decoded source image
//! - **element**: local to the rendered image element, `(0,0)` at its top-left
//! - **display**: local to the container, i.e. element space plus the offset
//!
//! A [`CoordinateMapper`] is a snapshot of the live geometry and must be
//! rebuilt when the image loads, the container resizes, or the region list
//! changes.

use crate::model::{BoundingBox, DisplayRect, ElementRect, ImageDimensions, Point};

/// Rendered size of the image and its offset inside the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub display_width: f32,
    pub display_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl DisplayGeometry {
    /// Measure from the image element's and container's bounding rects.
    ///
    /// Returns `None` while the image has not been laid out yet.
    pub fn measure(image: ElementRect, container: ElementRect) -> Option<Self> {
        let geometry = Self {
            display_width: image.width,
            display_height: image.height,
            offset_x: image.x - container.x,
            offset_y: image.y - container.y,
        };
        geometry.is_usable().then_some(geometry)
    }

    /// All values finite and a non-empty rendered size.
    pub fn is_usable(&self) -> bool {
        self.display_width.is_finite()
            && self.display_height.is_finite()
            && self.offset_x.is_finite()
            && self.offset_y.is_finite()
            && self.display_width > 0.0
            && self.display_height > 0.0
    }
}

/// Converts points and boxes between original and display space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    dimensions: ImageDimensions,
    geometry: DisplayGeometry,
    scale_x: f32,
    scale_y: f32,
}

impl CoordinateMapper {
    /// Build a mapper, or `None` if either side is zero-sized or the
    /// geometry is not finite.
    pub fn new(dimensions: ImageDimensions, geometry: DisplayGeometry) -> Option<Self> {
        if dimensions.is_empty() || !geometry.is_usable() {
            return None;
        }
        Some(Self {
            dimensions,
            geometry,
            scale_x: geometry.display_width / dimensions.width as f32,
            scale_y: geometry.display_height / dimensions.height as f32,
        })
    }

    /// Shorthand for [`DisplayGeometry::measure`] followed by [`new`](Self::new).
    pub fn measure(
        dimensions: ImageDimensions,
        image: ElementRect,
        container: ElementRect,
    ) -> Option<Self> {
        DisplayGeometry::measure(image, container).and_then(|g| Self::new(dimensions, g))
    }

    pub fn dimensions(&self) -> ImageDimensions {
        self.dimensions
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    /// Display pixels per original pixel, per axis.
    pub fn scale(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }

    pub fn to_display(&self, p: Point) -> Point {
        Point::new(
            self.geometry.offset_x + p.x * self.scale_x,
            self.geometry.offset_y + p.y * self.scale_y,
        )
    }

    pub fn to_original(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.geometry.offset_x) / self.scale_x,
            (p.y - self.geometry.offset_y) / self.scale_y,
        )
    }

    pub fn original_to_element(&self, p: Point) -> Point {
        Point::new(p.x * self.scale_x, p.y * self.scale_y)
    }

    pub fn element_to_original(&self, p: Point) -> Point {
        Point::new(p.x / self.scale_x, p.y / self.scale_y)
    }

    /// Clamp an original-space point into the image bounds.
    pub fn clamp_original(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(0.0, self.dimensions.width as f32),
            p.y.clamp(0.0, self.dimensions.height as f32),
        )
    }

    /// Is a display-space point over the rendered image?
    pub fn contains_display(&self, p: Point) -> bool {
        let g = &self.geometry;
        p.x >= g.offset_x
            && p.x <= g.offset_x + g.display_width
            && p.y >= g.offset_y
            && p.y <= g.offset_y + g.display_height
    }

    pub fn bbox_to_display(&self, bbox: &BoundingBox) -> DisplayRect {
        let origin = self.to_display(Point::new(bbox.x1, bbox.y1));
        DisplayRect::new(
            origin.x,
            origin.y,
            bbox.width() * self.scale_x,
            bbox.height() * self.scale_y,
        )
    }

    pub fn bbox_to_element(&self, bbox: &BoundingBox) -> DisplayRect {
        let origin = self.original_to_element(Point::new(bbox.x1, bbox.y1));
        DisplayRect::new(
            origin.x,
            origin.y,
            bbox.width() * self.scale_x,
            bbox.height() * self.scale_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    /// 2000x1000 image letterboxed to 1000x500 at (100, 50) inside its container.
    fn letterboxed() -> CoordinateMapper {
        CoordinateMapper::measure(
            ImageDimensions::new(2000, 1000),
            ElementRect::new(140.0, 80.0, 1000.0, 500.0),
            ElementRect::new(40.0, 30.0, 1200.0, 600.0),
        )
        .unwrap()
    }

    #[test]
    fn test_measure_offset_relative_to_container() {
        let g = letterboxed().geometry();
        assert_eq!(g.offset_x, 100.0);
        assert_eq!(g.offset_y, 50.0);
        assert_eq!(letterboxed().scale(), (0.5, 0.5));
    }

    #[test]
    fn test_unmeasured_geometry_is_none() {
        let dims = ImageDimensions::new(800, 600);
        let container = ElementRect::new(0.0, 0.0, 800.0, 600.0);
        assert!(CoordinateMapper::measure(dims, ElementRect::default(), container).is_none());
        assert!(
            CoordinateMapper::measure(dims, ElementRect::new(0.0, 0.0, f32::NAN, 10.0), container)
                .is_none()
        );
        assert!(
            CoordinateMapper::measure(
                ImageDimensions::new(0, 600),
                ElementRect::new(0.0, 0.0, 800.0, 600.0),
                container
            )
            .is_none()
        );
    }

    #[test]
    fn test_non_finite_geometry_is_rejected() {
        let dims = ImageDimensions::new(800, 600);
        let sized = |w: f32, h: f32, ox: f32, oy: f32| DisplayGeometry {
            display_width: w,
            display_height: h,
            offset_x: ox,
            offset_y: oy,
        };
        assert!(CoordinateMapper::new(dims, sized(400.0, 300.0, 0.0, 0.0)).is_some());
        assert!(CoordinateMapper::new(dims, sized(f32::NAN, 300.0, 0.0, 0.0)).is_none());
        assert!(CoordinateMapper::new(dims, sized(400.0, f32::INFINITY, 0.0, 0.0)).is_none());
        assert!(CoordinateMapper::new(dims, sized(400.0, 300.0, f32::NAN, 0.0)).is_none());
        assert!(CoordinateMapper::new(dims, sized(400.0, 300.0, 0.0, f32::NEG_INFINITY)).is_none());

        // Non-finite container position poisons the offset.
        assert!(
            CoordinateMapper::measure(
                dims,
                ElementRect::new(0.0, 0.0, 400.0, 300.0),
                ElementRect::new(f32::NAN, 0.0, 400.0, 300.0),
            )
            .is_none()
        );
    }

    #[test]
    fn test_to_display() {
        let m = letterboxed();
        let p = m.to_display(Point::new(400.0, 200.0));
        assert!(approx_eq(p.x, 300.0));
        assert!(approx_eq(p.y, 150.0));
    }

    #[test]
    fn test_round_trip_within_one_pixel() {
        // Non-uniform scale to exercise the per-axis path.
        let m = CoordinateMapper::measure(
            ImageDimensions::new(3024, 4032),
            ElementRect::new(13.5, 7.25, 611.0, 733.0),
            ElementRect::new(0.0, 0.0, 640.0, 760.0),
        )
        .unwrap();
        for x in (0..=3024).step_by(97) {
            for y in (0..=4032).step_by(131) {
                let p = Point::new(x as f32, y as f32);
                let back = m.to_original(m.to_display(p));
                assert!((back.x - p.x).abs() <= 1.0, "x drift at {:?}: {:?}", p, back);
                assert!((back.y - p.y).abs() <= 1.0, "y drift at {:?}: {:?}", p, back);
            }
        }
    }

    #[test]
    fn test_element_space_has_no_offset() {
        let m = letterboxed();
        let e = m.original_to_element(Point::new(400.0, 200.0));
        assert!(approx_eq(e.x, 200.0));
        assert!(approx_eq(e.y, 100.0));
        let back = m.element_to_original(e);
        assert!(approx_eq(back.x, 400.0));
    }

    #[test]
    fn test_contains_display() {
        let m = letterboxed();
        assert!(m.contains_display(Point::new(100.0, 50.0)));
        assert!(m.contains_display(Point::new(1100.0, 550.0)));
        assert!(!m.contains_display(Point::new(99.0, 300.0)));
        assert!(!m.contains_display(Point::new(600.0, 551.0)));
    }

    #[test]
    fn test_clamp_original() {
        let m = letterboxed();
        let p = m.clamp_original(Point::new(-12.0, 1500.0));
        assert_eq!(p, Point::new(0.0, 1000.0));
    }

    #[test]
    fn test_bbox_rects() {
        let m = letterboxed();
        let bbox = BoundingBox::from_corners(Point::new(200.0, 100.0), Point::new(600.0, 500.0));
        assert_eq!(m.bbox_to_display(&bbox), DisplayRect::new(200.0, 100.0, 200.0, 200.0));
        assert_eq!(m.bbox_to_element(&bbox), DisplayRect::new(100.0, 50.0, 200.0, 200.0));
    }
}
