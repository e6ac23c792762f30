//! Upload validation and downsampling.
//!
//! Every photo passes through here before anything else sees it:
//!
//! 1. [`ImagePreprocessor::validate`] rejects non-images, oversized files and
//!    images below the minimum resolution (probing only the header).
//! 2. [`ImagePreprocessor::resize`] downsamples large images so the longer
//!    side fits, re-encoding to JPEG. Images already within bounds pass
//!    through byte-for-byte.
//!
//! Decoding and encoding are slow, so [`ImagePreprocessor::spawn_prepare`]
//! runs the whole pipeline on a background thread.

mod error;
mod task;

pub use error::{PreprocessError, ValidationErrorKind};
pub use task::PreprocessTask;

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageError, ImageReader};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::constants::{limits, mime};
use crate::model::ImageDimensions;
use crate::state::TaskError;

/// Size limits for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessLimits {
    /// Uploads above this many bytes are rejected outright.
    pub max_file_bytes: u64,
    /// Minimum decoded width.
    pub min_width: u32,
    /// Minimum decoded height.
    pub min_height: u32,
    /// Longest side after [`ImagePreprocessor::prepare`].
    pub max_dimension: u32,
    /// JPEG quality (1-100) for re-encoded images.
    pub jpeg_quality: u8,
    /// Nothing larger than this is ever returned.
    pub hard_ceiling_bytes: u64,
}

impl Default for PreprocessLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: limits::MAX_FILE_BYTES,
            min_width: limits::MIN_WIDTH,
            min_height: limits::MIN_HEIGHT,
            max_dimension: limits::DEFAULT_MAX_DIMENSION,
            jpeg_quality: limits::DEFAULT_JPEG_QUALITY,
            hard_ceiling_bytes: limits::HARD_CEILING_BYTES,
        }
    }
}

/// An uploaded file as handed over by the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_image_type(&self) -> bool {
        self.mime_type
            .trim()
            .to_ascii_lowercase()
            .starts_with(mime::IMAGE_PREFIX)
    }
}

/// Output of the preprocessing pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    pub file: ImageFile,
    /// Dimensions of the upload as received.
    pub original: ImageDimensions,
    /// Dimensions of `file`.
    pub dimensions: ImageDimensions,
    /// `false` when `file` is the untouched upload.
    pub resized: bool,
}

type ValidationCallback = Box<dyn FnMut(ValidationErrorKind)>;

/// Validates and downsamples uploads.
pub struct ImagePreprocessor {
    limits: PreprocessLimits,
    on_validation_error: Option<ValidationCallback>,
}

impl ImagePreprocessor {
    pub fn new(limits: PreprocessLimits) -> Self {
        Self {
            limits,
            on_validation_error: None,
        }
    }

    /// Set the callback told about every validation failure in
    /// [`prepare`](Self::prepare) and [`poll_task`](Self::poll_task).
    pub fn on_validation_error<F>(mut self, f: F) -> Self
    where
        F: FnMut(ValidationErrorKind) + 'static,
    {
        self.on_validation_error = Some(Box::new(f));
        self
    }

    pub fn limits(&self) -> &PreprocessLimits {
        &self.limits
    }

    /// Check type, byte size and pixel size. Returns the decoded dimensions.
    pub fn validate(&self, file: &ImageFile) -> Result<ImageDimensions, PreprocessError> {
        validate_with(&self.limits, file)
    }

    /// Downsample so the longer side is at most `max_dimension`.
    pub fn resize(
        &self,
        file: ImageFile,
        max_dimension: u32,
        quality: u8,
    ) -> Result<PreparedImage, PreprocessError> {
        resize_with(&self.limits, file, max_dimension, quality)
    }

    /// Validate, then resize with the configured limits.
    pub fn prepare(&mut self, file: ImageFile) -> Result<PreparedImage, PreprocessError> {
        let result = prepare_with(&self.limits, file);
        self.report(&result);
        result
    }

    /// Run [`prepare`](Self::prepare) on a background thread.
    pub fn spawn_prepare(&self, file: ImageFile) -> Result<PreprocessTask, TaskError> {
        PreprocessTask::spawn(self.limits, file)
    }

    /// Non-blocking check on a background task, reporting validation errors
    /// through the callback once the result is in.
    pub fn poll_task(
        &mut self,
        task: &mut PreprocessTask,
    ) -> Option<Result<PreparedImage, PreprocessError>> {
        let result = task.poll()?;
        self.report(&result);
        Some(result)
    }

    fn report(&mut self, result: &Result<PreparedImage, PreprocessError>) {
        let Err(err) = result else {
            return;
        };
        if let Some(kind) = err.validation_kind() {
            log::info!("Upload rejected: {}", kind);
            if let Some(callback) = self.on_validation_error.as_mut() {
                callback(kind);
            }
        } else {
            log::warn!("Upload preprocessing failed: {}", err);
        }
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(PreprocessLimits::default())
    }
}

/// Read the pixel size from the image header without decoding pixel data.
pub fn probe_dimensions(bytes: &[u8]) -> Result<ImageDimensions, PreprocessError> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PreprocessError::Decode(ImageError::IoError(e)))?
        .into_dimensions()
        .map_err(PreprocessError::Decode)?;
    Ok(ImageDimensions::new(width, height))
}

/// Target size with the longer side equal to `max_dimension`, aspect preserved.
pub fn scaled_dimensions(original: ImageDimensions, max_dimension: u32) -> ImageDimensions {
    let longest = original.longest_side();
    if longest <= max_dimension || longest == 0 {
        return original;
    }
    let ratio = f64::from(max_dimension) / f64::from(longest);
    let shorter = |side: u32| ((f64::from(side) * ratio).round() as u32).max(1);
    if original.width >= original.height {
        ImageDimensions::new(max_dimension, shorter(original.height))
    } else {
        ImageDimensions::new(shorter(original.width), max_dimension)
    }
}

fn validate_with(
    limits: &PreprocessLimits,
    file: &ImageFile,
) -> Result<ImageDimensions, PreprocessError> {
    if !file.is_image_type() {
        log::debug!("Rejecting {}: MIME type {:?}", file.name, file.mime_type);
        return Err(ValidationErrorKind::InvalidType.into());
    }
    if file.size() > limits.max_file_bytes {
        log::debug!("Rejecting {}: {} bytes", file.name, file.size());
        return Err(ValidationErrorKind::TooLarge.into());
    }
    let dimensions = probe_dimensions(&file.bytes)?;
    if dimensions.width < limits.min_width || dimensions.height < limits.min_height {
        log::debug!(
            "Rejecting {}: {}x{} is below {}x{}",
            file.name,
            dimensions.width,
            dimensions.height,
            limits.min_width,
            limits.min_height
        );
        return Err(ValidationErrorKind::TooSmall.into());
    }
    Ok(dimensions)
}

fn resize_with(
    limits: &PreprocessLimits,
    file: ImageFile,
    max_dimension: u32,
    quality: u8,
) -> Result<PreparedImage, PreprocessError> {
    let original = probe_dimensions(&file.bytes)?;

    if original.longest_side() <= max_dimension {
        ensure_within_ceiling(limits, file.size())?;
        log::debug!(
            "{} is {}x{}, no resize needed",
            file.name,
            original.width,
            original.height
        );
        return Ok(PreparedImage {
            file,
            original,
            dimensions: original,
            resized: false,
        });
    }

    let started = Instant::now();
    let target = scaled_dimensions(original, max_dimension);
    let decoded = image::load_from_memory(&file.bytes).map_err(PreprocessError::Decode)?;
    let rgb = decoded
        .resize_exact(target.width, target.height, FilterType::Triangle)
        .to_rgb8();

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(PreprocessError::Encode)?;
    ensure_within_ceiling(limits, bytes.len() as u64)?;

    log::info!(
        "Resized {} from {}x{} to {}x{} ({} -> {} bytes) in {:.0}ms",
        file.name,
        original.width,
        original.height,
        target.width,
        target.height,
        file.size(),
        bytes.len(),
        started.elapsed().as_secs_f64() * 1000.0
    );

    let name = Path::new(&file.name)
        .with_extension(mime::OUTPUT_EXTENSION)
        .to_string_lossy()
        .into_owned();
    Ok(PreparedImage {
        file: ImageFile::new(name, mime::OUTPUT, bytes),
        original,
        dimensions: target,
        resized: true,
    })
}

fn prepare_with(
    limits: &PreprocessLimits,
    file: ImageFile,
) -> Result<PreparedImage, PreprocessError> {
    validate_with(limits, &file)?;
    resize_with(limits, file, limits.max_dimension, limits.jpeg_quality)
}

fn ensure_within_ceiling(limits: &PreprocessLimits, size: u64) -> Result<(), PreprocessError> {
    if size > limits.hard_ceiling_bytes {
        return Err(PreprocessError::StillTooLarge {
            size,
            limit: limits.hard_ceiling_bytes,
        });
    }
    Ok(())
}
