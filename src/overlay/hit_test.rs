//! Pointer-to-region resolution with overlapping regions.
//!
//! Priority rule: array index is z-order. The last region in the list is
//! drawn last, sits visually on top, and therefore wins the hit test when
//! several regions contain the pointer (a pillow listed after the sofa it
//! rests on is the one that gets hovered).

use crate::coords::CoordinateMapper;
use crate::model::{Point, Region, RegionId};

/// Topmost region whose element-space rect contains `pointer`.
///
/// `pointer` is local to the rendered image element. Cost is linear in the
/// number of regions, cheap enough to run on every pointer move.
pub fn hit_test(pointer: Point, regions: &[Region], mapper: &CoordinateMapper) -> Option<RegionId> {
    regions
        .iter()
        .rev()
        .find(|region| mapper.bbox_to_element(&region.bbox).contains(pointer))
        .map(|region| region.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, ElementRect, ImageDimensions};

    fn region(id: RegionId, x1: f32, y1: f32, x2: f32, y2: f32) -> Region {
        Region::new(
            id,
            "furniture",
            0.9,
            BoundingBox::from_corners(Point::new(x1, y1), Point::new(x2, y2)),
        )
    }

    /// 1000x800 image rendered at half size with a container offset that the
    /// element-local pointer must ignore.
    fn mapper() -> CoordinateMapper {
        CoordinateMapper::measure(
            ImageDimensions::new(1000, 800),
            ElementRect::new(60.0, 20.0, 500.0, 400.0),
            ElementRect::new(0.0, 0.0, 620.0, 440.0),
        )
        .unwrap()
    }

    #[test]
    fn test_no_regions_no_hit() {
        assert_eq!(hit_test(Point::new(10.0, 10.0), &[], &mapper()), None);
    }

    #[test]
    fn test_single_region_hit_and_miss() {
        let regions = [region(1, 100.0, 100.0, 300.0, 300.0)];
        // Original (100..300) maps to element (50..150).
        assert_eq!(hit_test(Point::new(60.0, 60.0), &regions, &mapper()), Some(1));
        assert_eq!(hit_test(Point::new(160.0, 60.0), &regions, &mapper()), None);
    }

    #[test]
    fn test_overlap_resolves_to_last_in_list() {
        let regions = [
            region(10, 0.0, 0.0, 1000.0, 800.0),
            region(20, 100.0, 100.0, 600.0, 600.0),
            region(30, 200.0, 200.0, 400.0, 400.0),
        ];
        let pointer = Point::new(150.0, 150.0);
        assert_eq!(hit_test(pointer, &regions, &mapper()), Some(30));

        let mut reversed = regions.to_vec();
        reversed.reverse();
        assert_eq!(hit_test(pointer, &reversed, &mapper()), Some(10));
    }

    #[test]
    fn test_falls_through_to_lower_region_outside_top() {
        let sofa = region(1, 0.0, 400.0, 800.0, 800.0);
        let pillow = region(2, 100.0, 450.0, 250.0, 550.0);
        let regions = [sofa, pillow];
        // Inside the sofa but away from the pillow.
        assert_eq!(hit_test(Point::new(300.0, 300.0), &regions, &mapper()), Some(1));
        // On the pillow.
        assert_eq!(hit_test(Point::new(80.0, 240.0), &regions, &mapper()), Some(2));
    }
}
