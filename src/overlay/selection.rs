//! Hover and selection state for detected regions.

use crate::model::RegionId;

/// Which region is hovered and which is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub hovered: Option<RegionId>,
    pub selected: Option<RegionId>,
}

/// Emitted when a click moves the selection to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Selected(RegionId),
}

/// Owns [`SelectionState`] and applies the hover/click transitions.
#[derive(Debug, Default)]
pub struct SelectionStateMachine {
    state: SelectionState,
}

impl SelectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn hovered(&self) -> Option<RegionId> {
        self.state.hovered
    }

    pub fn selected(&self) -> Option<RegionId> {
        self.state.selected
    }

    /// Apply a hit-test result. The selected region is never marked hovered.
    ///
    /// Returns `true` if the hovered region changed.
    pub fn hover(&mut self, hit: Option<RegionId>) -> bool {
        let hovered = hit.filter(|id| self.state.selected != Some(*id));
        if self.state.hovered == hovered {
            return false;
        }
        log::trace!("Hover {:?} -> {:?}", self.state.hovered, hovered);
        self.state.hovered = hovered;
        true
    }

    /// Toggle selection of `id`.
    ///
    /// Clicking the selected region deselects it silently; clicking any other
    /// region selects it and yields exactly one event.
    pub fn click(&mut self, id: RegionId) -> Option<SelectionEvent> {
        if self.state.selected == Some(id) {
            self.state.selected = None;
            log::debug!("Region {} deselected", id);
            return None;
        }
        self.state.selected = Some(id);
        log::debug!("Region {} selected", id);
        Some(SelectionEvent::Selected(id))
    }

    /// Forget hover and selection without emitting anything.
    pub fn reset(&mut self) {
        self.state = SelectionState::default();
    }

    /// Hover outline and label are shown only for a hovered, unselected region.
    pub fn show_hover_chrome(&self, id: RegionId) -> bool {
        self.state.hovered == Some(id) && self.state.selected != Some(id)
    }

    /// Mask overlay and glow are shown only for the selected region.
    pub fn show_selection_chrome(&self, id: RegionId) -> bool {
        self.state.selected == Some(id)
    }
}
