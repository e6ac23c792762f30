//! Drag-to-box tool for manual region selection.
//!
//! The selector works on display-space pointer positions but only ever
//! hands out boxes in original pixel space, so consumers never see the
//! current display scale.

use crate::coords::CoordinateMapper;
use crate::model::{BoundingBox, ElementRect, ImageDimensions, Point};

/// Interaction state of the selector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectorState {
    /// Waiting for a pointer-down over the image.
    #[default]
    Idle,
    /// A drag is in progress from `start` (original pixel space).
    Drawing { start: Point },
}

type BoxCallback = Box<dyn FnMut(Option<BoundingBox>)>;

/// Interactive drag-to-box tool over a single image preview.
#[derive(Default)]
pub struct RegionSelector {
    mapper: Option<CoordinateMapper>,
    state: SelectorState,
    current_box: Option<BoundingBox>,
    on_box_change: Option<BoxCallback>,
}

impl RegionSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback receiving every box change (`None` when cleared).
    pub fn on_box_change<F>(mut self, f: F) -> Self
    where
        F: FnMut(Option<BoundingBox>) + 'static,
    {
        self.on_box_change = Some(Box::new(f));
        self
    }

    /// Re-measure after image load or container resize.
    pub fn set_layout(
        &mut self,
        dimensions: ImageDimensions,
        image_rect: ElementRect,
        container_rect: ElementRect,
    ) {
        self.set_mapper(CoordinateMapper::measure(
            dimensions,
            image_rect,
            container_rect,
        ));
    }

    pub fn set_mapper(&mut self, mapper: Option<CoordinateMapper>) {
        if mapper.is_none() {
            log::debug!("Box selector has no measurable geometry yet");
        }
        self.mapper = mapper;
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, SelectorState::Drawing { .. })
    }

    /// The last emitted box, if any.
    pub fn current_box(&self) -> Option<BoundingBox> {
        self.current_box
    }

    /// Start a drag. Returns `false` if the pointer is not over the image
    /// (or the image has not been measured), in which case nothing changes.
    pub fn pointer_down(&mut self, pos: Point) -> bool {
        let Some(mapper) = self.mapper else {
            return false;
        };
        if !mapper.contains_display(pos) {
            log::trace!("Pointer down outside image at ({:.1}, {:.1})", pos.x, pos.y);
            return false;
        }

        let start_original = mapper.clamp_original(mapper.to_original(pos));
        if self.current_box.take().is_some() {
            self.emit(None);
        }
        self.state = SelectorState::Drawing {
            start: start_original,
        };
        log::debug!(
            "Box drag started at ({:.1}, {:.1}) original",
            start_original.x,
            start_original.y
        );
        true
    }

    /// Update the live box while dragging and emit it.
    pub fn pointer_move(&mut self, pos: Point) -> Option<BoundingBox> {
        let SelectorState::Drawing { start } = self.state else {
            return None;
        };
        let mapper = self.mapper?;

        let current = mapper.clamp_original(mapper.to_original(pos));
        let bbox = BoundingBox::from_corners(start, current);
        self.current_box = Some(bbox);
        self.emit(Some(bbox));
        Some(bbox)
    }

    /// Finish the drag; the box stays until [`clear`](Self::clear) or the next drag.
    pub fn pointer_up(&mut self) -> Option<BoundingBox> {
        if self.is_drawing() {
            self.state = SelectorState::Idle;
            if let Some(b) = self.current_box {
                log::debug!(
                    "Box drag finished: ({:.0}, {:.0})-({:.0}, {:.0})",
                    b.x1,
                    b.y1,
                    b.x2,
                    b.y2
                );
            }
        }
        self.current_box
    }

    /// Drop the box (and any drag in progress) and notify the consumer.
    pub fn clear(&mut self) {
        self.state = SelectorState::Idle;
        self.current_box = None;
        self.emit(None);
        log::debug!("Box selection cleared");
    }

    fn emit(&mut self, bbox: Option<BoundingBox>) {
        if let Some(callback) = self.on_box_change.as_mut() {
            callback(bbox);
        }
    }
}
