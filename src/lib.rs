//! RoomLens - furniture detection overlay core
//!
//! Everything between "the user picked a photo" and "the user clicked a
//! piece of furniture", minus the detection itself:
//!
//! - [`preprocess`]: upload validation and downsampling
//! - [`coords`]: original-pixel <-> display-space mapping
//! - [`selector`]: drag-to-box region selection
//! - [`overlay`]: hit testing, hover/selection and outline highlights
//!
//! Mask outline extraction lives in the `roomlens_raster` member crate.

pub mod config;
pub mod constants;
pub mod coords;
pub mod mask_outline;
pub mod model;
pub mod overlay;
pub mod preprocess;
pub mod selector;
pub mod state;

#[cfg(test)]
mod test_image;

pub use config::{AppConfig, ConfigError, LogLevel};
pub use coords::{CoordinateMapper, DisplayGeometry};
pub use mask_outline::{Highlight, extract_highlight};
pub use model::{
    BoundingBox, DisplayRect, ElementRect, Generation, ImageDimensions, MaskBlob, Point, Region,
    RegionBatch, RegionId,
};
pub use overlay::{Overlay, RegionVisual, SelectionEvent, SelectionState, SelectionStateMachine};
pub use preprocess::{
    ImageFile, ImagePreprocessor, PreparedImage, PreprocessError, PreprocessLimits,
    PreprocessTask, ValidationErrorKind,
};
pub use roomlens_raster::OutlineSettings;
pub use selector::{RegionSelector, SelectorState};
pub use state::{OutlineTasks, TaskError};
