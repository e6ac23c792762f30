//! Interactive overlay over detected regions.
//!
//! The [`Overlay`] owns the current [`RegionBatch`], the coordinate mapper
//! for the rendered image, hover/selection state, and the outline cache.
//! Pointer handling only touches resident geometry; outline extraction runs
//! on a background thread and results are applied by
//! [`Overlay::poll_outlines`] whenever the host loop gets around to it.

mod hit_test;
mod outline_cache;
mod selection;


pub use hit_test::hit_test;
pub use outline_cache::OutlineCache;
pub use selection::{SelectionEvent, SelectionState, SelectionStateMachine};

use roomlens_raster::OutlineSettings;

use crate::coords::CoordinateMapper;
use crate::mask_outline::Highlight;
use crate::model::{
    DisplayRect, ElementRect, Generation, ImageDimensions, Point, Region, RegionBatch, RegionId,
};
use crate::state::{OutlineResult, OutlineTasks};

type RegionCallback = Box<dyn FnMut(&Region)>;

/// Everything needed to draw one region this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionVisual<'a> {
    pub id: RegionId,
    pub category: &'a str,
    pub score: f32,
    /// Rectangle in display (container) space.
    pub rect: DisplayRect,
    /// Outline + label for a hovered, unselected region.
    pub hover_chrome: bool,
    /// Mask overlay + glow for the selected region.
    pub selection_chrome: bool,
    /// Present only when some chrome is shown and the region has a mask.
    pub highlight: Option<Highlight>,
}

/// Hover, click and highlight handling for one image's detections.
pub struct Overlay {
    batch: RegionBatch,
    dimensions: Option<ImageDimensions>,
    mapper: Option<CoordinateMapper>,
    layout_stale: bool,
    selection: SelectionStateMachine,
    outlines: OutlineCache,
    tasks: Option<OutlineTasks>,
    on_region_selected: Option<RegionCallback>,
}

impl Overlay {
    /// Create an overlay with its own outline worker.
    ///
    /// If the worker cannot be started the overlay still works, drawing raw
    /// masks instead of outlines.
    pub fn new(settings: OutlineSettings) -> Self {
        let tasks = match OutlineTasks::spawn(settings) {
            Ok(tasks) => Some(tasks),
            Err(e) => {
                log::warn!("Outline upgrades disabled: {}", e);
                None
            }
        };
        Self::with_tasks(tasks)
    }

    /// Create an overlay around an existing task group (or none).
    pub fn with_tasks(tasks: Option<OutlineTasks>) -> Self {
        Self {
            batch: RegionBatch::new(),
            dimensions: None,
            mapper: None,
            layout_stale: false,
            selection: SelectionStateMachine::new(),
            outlines: OutlineCache::new(),
            tasks,
            on_region_selected: None,
        }
    }

    /// Set the callback fired when a click selects a region.
    pub fn on_region_selected<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Region) + 'static,
    {
        self.on_region_selected = Some(Box::new(f));
        self
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// The image finished loading.
    pub fn image_loaded(
        &mut self,
        dimensions: ImageDimensions,
        image_rect: ElementRect,
        container_rect: ElementRect,
    ) {
        log::debug!("Overlay image loaded: {}x{}", dimensions.width, dimensions.height);
        self.dimensions = Some(dimensions);
        self.batch.clamp_to(dimensions);
        self.update_layout(image_rect, container_rect);
    }

    /// Re-measure after a container resize or a region list change.
    pub fn update_layout(&mut self, image_rect: ElementRect, container_rect: ElementRect) {
        self.mapper = self
            .dimensions
            .and_then(|dims| CoordinateMapper::measure(dims, image_rect, container_rect));
        self.layout_stale = false;
        if self.mapper.is_none() {
            log::debug!("Overlay geometry not measurable yet");
        }
    }

    /// True after a region list replacement until the next [`update_layout`](Self::update_layout).
    pub fn needs_layout(&self) -> bool {
        self.layout_stale
    }

    pub fn mapper(&self) -> Option<&CoordinateMapper> {
        self.mapper.as_ref()
    }

    // ========================================================================
    // Regions
    // ========================================================================

    /// Wholesale-replace the region list.
    ///
    /// Hover and selection are reset without events, the outline cache is
    /// cleared, and outline extraction is scheduled for every masked region.
    /// Boxes are clamped to the image once its dimensions are known.
    pub fn replace_regions(&mut self, regions: Vec<Region>) -> Generation {
        let generation = self.batch.replace(regions);
        if let Some(dimensions) = self.dimensions {
            self.batch.clamp_to(dimensions);
        }
        self.selection.reset();
        self.outlines.reset(generation);
        self.layout_stale = true;

        if let Some(tasks) = self.tasks.as_mut() {
            tasks.begin_generation(generation);
            let mut scheduled = 0;
            for region in self.batch.regions() {
                if let Some(mask) = &region.mask {
                    if tasks.request(generation, region.id, mask.clone()) {
                        scheduled += 1;
                    }
                }
            }
            log::debug!(
                "Region batch {}: {} regions, {} outlines scheduled",
                generation,
                self.batch.len(),
                scheduled
            );
        } else {
            log::debug!("Region batch {}: {} regions", generation, self.batch.len());
        }

        generation
    }

    pub fn regions(&self) -> &[Region] {
        self.batch.regions()
    }

    pub fn generation(&self) -> Generation {
        self.batch.generation()
    }

    // ========================================================================
    // Pointer Interaction
    // ========================================================================

    /// Pointer moved to `pointer` (image-element-local). Returns the hovered region.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<RegionId> {
        let hit = self.region_at(pointer);
        self.selection.hover(hit);
        self.selection.hovered()
    }

    /// Pointer left the image.
    pub fn pointer_leave(&mut self) {
        self.selection.hover(None);
    }

    /// Click at `pointer` (image-element-local). Clicks on empty space are ignored.
    ///
    /// Returns the selection after the click.
    pub fn click(&mut self, pointer: Point) -> Option<RegionId> {
        if let Some(id) = self.region_at(pointer) {
            self.click_region(id);
        }
        self.selection.selected()
    }

    /// Click a region directly (e.g. from a list next to the image).
    pub fn click_region(&mut self, id: RegionId) {
        if self.batch.get(id).is_none() {
            log::warn!("Click on unknown region {}", id);
            return;
        }
        if let Some(SelectionEvent::Selected(selected)) = self.selection.click(id) {
            // Selected regions never show hover chrome.
            self.selection.hover(self.selection.hovered());
            if let (Some(callback), Some(region)) =
                (self.on_region_selected.as_mut(), self.batch.get(selected))
            {
                callback(region);
            }
        }
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.state()
    }

    fn region_at(&self, pointer: Point) -> Option<RegionId> {
        let mapper = self.mapper.as_ref()?;
        hit_test(pointer, self.batch.regions(), mapper)
    }

    // ========================================================================
    // Highlights
    // ========================================================================

    /// Apply finished outline results. Late results from replaced batches
    /// are dropped. Returns how many results were applied.
    pub fn poll_outlines(&mut self) -> usize {
        let Some(tasks) = self.tasks.as_mut() else {
            return 0;
        };
        let mut finished = Vec::new();
        while let Some(result) = tasks.take_one_result() {
            finished.push(result);
        }
        let mut applied = 0;
        for result in finished {
            if self.apply_outline(result) {
                applied += 1;
            }
        }
        applied
    }

    /// Cache one result unless it belongs to a replaced batch or an unknown region.
    fn apply_outline(&mut self, result: OutlineResult) -> bool {
        let current = self.batch.generation();
        if result.generation != current || self.batch.get(result.region_id).is_none() {
            log::trace!(
                "Discarding late outline for region {} (generation {}, current {})",
                result.region_id,
                result.generation,
                current
            );
            return false;
        }
        self.outlines
            .insert(result.generation, result.region_id, result.highlight)
    }

    /// Outstanding outline computations.
    pub fn pending_outlines(&self) -> usize {
        self.tasks.as_ref().map_or(0, OutlineTasks::pending_count)
    }

    /// The cached extraction result for `id`, if it has arrived.
    pub fn cached_highlight(&self, id: RegionId) -> Option<&Highlight> {
        self.outlines.get(self.batch.generation(), id)
    }

    /// Best available highlight: the outline if ready, else the raw mask.
    pub fn highlight_for(&self, id: RegionId) -> Option<Highlight> {
        if let Some(cached) = self.cached_highlight(id) {
            return Some(cached.clone());
        }
        let mask = self.batch.get(id)?.mask.clone()?;
        Some(Highlight::RawMask(mask))
    }

    /// Per-region draw state in z-order, or `None` while no geometry is available.
    pub fn visuals(&self) -> Option<Vec<RegionVisual<'_>>> {
        let mapper = self.mapper.as_ref()?;
        let visuals = self
            .batch
            .regions()
            .iter()
            .map(|region| {
                let hover_chrome = self.selection.show_hover_chrome(region.id);
                let selection_chrome = self.selection.show_selection_chrome(region.id);
                let highlight = if hover_chrome || selection_chrome {
                    self.highlight_for(region.id)
                } else {
                    None
                };
                RegionVisual {
                    id: region.id,
                    category: &region.category,
                    score: region.score,
                    rect: mapper.bbox_to_display(&region.bbox),
                    hover_chrome,
                    selection_chrome,
                    highlight,
                }
            })
            .collect();
        Some(visuals)
    }
}
