//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process`] which runs the entire pipeline in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use resizer_pipeline::{Pipeline, ProcessOptions, PipelineError};
//! # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
//! let options = ProcessOptions {
//!     trim: true,
//!     width: 200,
//!     ..ProcessOptions::default()
//! };
//! let encoded = Pipeline::new(png, options)
//!     .decode()?
//!     .trim()
//!     .remove_background()
//!     .resize()?
//!     .encode()?;
//!
//! let output = encoded.into_output();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages). The order is fixed: trim, then
//! background removal, then resize. Trimming first both shrinks the
//! flood-fill area and leaves the background removal seeding from the
//! edges that survive.
//!
//! [`trim`](Decoded::trim) and
//! [`remove_background`](Trimmed::remove_background) always advance, but
//! only touch pixels when the corresponding option is enabled.

use crate::dimensions::resolve_target_size;
use crate::types::{Dimensions, PipelineError, ProcessOptions, ProcessOutput, Rgba64Image};

/// Fail if `dimensions` exceeds the optional pixel ceiling.
fn check_pixel_limit(dimensions: Dimensions, limit: Option<u64>) -> Result<(), PipelineError> {
    match limit {
        Some(limit) if dimensions.pixel_count() > limit => Err(PipelineError::TooLarge {
            width: dimensions.width,
            height: dimensions.height,
            limit,
        }),
        _ => Ok(()),
    }
}

/// Decode `source` and enforce the decoded-size ceiling.
pub(crate) fn decode_stage(source: &[u8], options: ProcessOptions) -> Result<Decoded, PipelineError> {
    let image = crate::codec::decode(source)?;
    let original = Dimensions::of(&image);
    check_pixel_limit(original, options.max_pixels)?;
    tracing::debug!(
        input_bytes = source.len(),
        width = original.width,
        height = original.height,
        "decoded image"
    );
    Ok(Decoded {
        options,
        image,
        original,
    })
}

/// Entry point for the incremental pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Create a pipeline over raw image bytes.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(source: Vec<u8>, options: ProcessOptions) -> Pending {
        Pending { options, source }
    }
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// Call [`decode`](Self::decode) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .decode() to continue"]
pub struct Pending {
    options: ProcessOptions,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Decode the source image and advance to the [`Decoded`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] if the source bytes are
    /// empty, [`PipelineError::ImageDecode`] if the image format is
    /// unrecognized or the data is corrupt, and
    /// [`PipelineError::TooLarge`] if the decoded image exceeds
    /// `max_pixels`.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        decode_stage(&self.source, self.options)
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding the source image.
#[must_use = "pipeline stages are consumed by advancing; call .trim() to continue"]
pub struct Decoded {
    options: ProcessOptions,
    image: Rgba64Image,
    original: Dimensions,
}

impl Decoded {
    /// The decoded 16-bit RGBA image.
    #[must_use]
    pub const fn image(&self) -> &Rgba64Image {
        &self.image
    }

    /// Advance to the trim stage, cropping borders if `options.trim` is set.
    pub fn trim(self) -> Trimmed {
        let image = if self.options.trim {
            let trimmed = crate::trim::trim(self.image);
            tracing::debug!(
                width = trimmed.width(),
                height = trimmed.height(),
                "trimmed borders"
            );
            trimmed
        } else {
            self.image
        };
        Trimmed {
            options: self.options,
            image,
            original: self.original,
        }
    }
}

// ───────────────────────── Stage 2: Trimmed ──────────────────────────

/// Pipeline state after optional border trimming.
#[must_use = "pipeline stages are consumed by advancing; call .remove_background() to continue"]
pub struct Trimmed {
    options: ProcessOptions,
    image: Rgba64Image,
    original: Dimensions,
}

impl Trimmed {
    /// The (possibly) trimmed image.
    #[must_use]
    pub const fn image(&self) -> &Rgba64Image {
        &self.image
    }

    /// Whether trimming changed the image size.
    #[must_use]
    pub fn was_trimmed(&self) -> bool {
        Dimensions::of(&self.image) != self.original
    }

    /// Advance to the background removal stage, clearing edge-connected
    /// background if `options.remove_background` is set.
    pub fn remove_background(self) -> Cleaned {
        let (image, cleared) = if self.options.remove_background {
            let mask = crate::background::background_mask(&self.image);
            let cleared = mask.count();
            tracing::debug!(cleared, "removed background");
            (crate::background::apply_mask(&self.image, &mask), cleared)
        } else {
            (self.image, 0)
        };
        Cleaned {
            options: self.options,
            image,
            original: self.original,
            cleared,
        }
    }
}

// ───────────────────────── Stage 3: Cleaned ──────────────────────────

/// Pipeline state after optional background removal.
#[must_use = "pipeline stages are consumed by advancing; call .resize() to continue"]
pub struct Cleaned {
    options: ProcessOptions,
    image: Rgba64Image,
    original: Dimensions,
    cleared: usize,
}

impl Cleaned {
    /// The image with its background (possibly) removed.
    #[must_use]
    pub const fn image(&self) -> &Rgba64Image {
        &self.image
    }

    /// Number of pixels made transparent by background removal.
    #[must_use]
    pub const fn cleared_pixels(&self) -> usize {
        self.cleared
    }

    /// Resolve the output size and resample to it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ZeroDimension`] if the image has no
    /// pixels, and [`PipelineError::TooLarge`] if the resolved size
    /// exceeds `max_pixels`.
    pub fn resize(self) -> Result<Resized, PipelineError> {
        let target = resolve_target_size(
            Dimensions::of(&self.image),
            self.options.width,
            self.options.height,
        )?;
        check_pixel_limit(target, self.options.max_pixels)?;
        let image = crate::resample::resize(&self.image, target, self.options.filter);
        tracing::debug!(
            width = target.width,
            height = target.height,
            filter = %self.options.filter,
            "resized image"
        );
        Ok(Resized {
            options: self.options,
            image,
            original: self.original,
        })
    }
}

// ───────────────────────── Stage 4: Resized ──────────────────────────

/// Pipeline state after resampling to the target size.
#[must_use = "pipeline stages are consumed by advancing; call .encode() to continue"]
pub struct Resized {
    options: ProcessOptions,
    image: Rgba64Image,
    original: Dimensions,
}

impl Resized {
    /// The resampled image.
    #[must_use]
    pub const fn image(&self) -> &Rgba64Image {
        &self.image
    }

    /// Encode the image in the requested output format.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ImageEncode`] if the encoder fails.
    pub fn encode(self) -> Result<Encoded, PipelineError> {
        let data = crate::codec::encode(
            &self.image,
            self.options.format,
            self.options.quality,
            self.options.png_compression,
        )?;
        let dimensions = Dimensions::of(&self.image);
        tracing::debug!(
            format = %self.options.format,
            bytes = data.len(),
            "encoded image"
        );
        Ok(Encoded {
            output: ProcessOutput {
                data,
                format: self.options.format,
                dimensions,
            },
            original: self.original,
        })
    }
}

// ───────────────────────── Stage 5: Encoded ──────────────────────────

/// Pipeline state after encoding, the final stage.
#[must_use = "call .into_output() to extract the ProcessOutput"]
pub struct Encoded {
    output: ProcessOutput,
    original: Dimensions,
}

impl Encoded {
    /// Dimensions of the decoded source, before any stage ran.
    #[must_use]
    pub const fn original_dimensions(&self) -> Dimensions {
        self.original
    }

    /// The encoded output.
    #[must_use]
    pub const fn output(&self) -> &ProcessOutput {
        &self.output
    }

    /// Consume the pipeline and return the encoded output.
    #[must_use]
    pub fn into_output(self) -> ProcessOutput {
        self.output
    }
}

// ──────────────────── PipelineStage trait + Stage enum ────────────────

/// Total number of stages in the pipeline.
pub const STAGE_COUNT: usize = 6;

/// Trait implemented by every pipeline stage, enabling uniform iteration.
pub trait PipelineStage: Sized {
    /// Human-readable name of this stage (e.g. `"source"`, `"trim"`).
    const NAME: &str;

    /// Zero-based index of this stage (`0` for Pending through `5` for
    /// Encoded).
    const INDEX: usize;

    /// Advance to the next stage.
    ///
    /// Returns `Ok(Some(stage))` on success, `Ok(None)` if already at
    /// the final stage, or `Err` if the stage transition fails.
    ///
    /// # Errors
    ///
    /// Returns whatever [`PipelineError`] the transition produces.
    fn next(self) -> Result<Option<Stage>, PipelineError>;

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any remaining fallible stage fails.
    fn complete(self) -> Result<ProcessOutput, PipelineError>;
}

impl PipelineStage for Pending {
    const NAME: &str = "source";
    const INDEX: usize = 0;

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Decoded(self.decode()?)))
    }

    fn complete(self) -> Result<ProcessOutput, PipelineError> {
        self.decode()?.complete()
    }
}

impl PipelineStage for Decoded {
    const NAME: &str = "decode";
    const INDEX: usize = 1;

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Trimmed(self.trim())))
    }

    fn complete(self) -> Result<ProcessOutput, PipelineError> {
        self.trim().complete()
    }
}

impl PipelineStage for Trimmed {
    const NAME: &str = "trim";
    const INDEX: usize = 2;

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Cleaned(self.remove_background())))
    }

    fn complete(self) -> Result<ProcessOutput, PipelineError> {
        self.remove_background().complete()
    }
}

impl PipelineStage for Cleaned {
    const NAME: &str = "background";
    const INDEX: usize = 3;

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Resized(self.resize()?)))
    }

    fn complete(self) -> Result<ProcessOutput, PipelineError> {
        self.resize()?.complete()
    }
}

impl PipelineStage for Resized {
    const NAME: &str = "resize";
    const INDEX: usize = 4;

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Encoded(self.encode()?)))
    }

    fn complete(self) -> Result<ProcessOutput, PipelineError> {
        Ok(self.encode()?.into_output())
    }
}

impl PipelineStage for Encoded {
    const NAME: &str = "encode";
    const INDEX: usize = 5;

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(None)
    }

    fn complete(self) -> Result<ProcessOutput, PipelineError> {
        Ok(self.into_output())
    }
}

/// Enum wrapping all pipeline stages for uniform, loopable access.
///
/// ```rust
/// # use resizer_pipeline::{Pipeline, ProcessOptions, PipelineError};
/// # use resizer_pipeline::pipeline::{Advance, Stage};
/// # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
/// let mut stage: Stage = Pipeline::new(png, ProcessOptions::default()).into();
/// loop {
///     match stage.advance()? {
///         Advance::Next(next) => stage = next,
///         Advance::Complete(done) => { stage = done; break; }
///     }
/// }
/// let output = stage.complete()?;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub enum Stage {
    /// See [`Pending`].
    Pending(Pending),
    /// See [`Decoded`].
    Decoded(Decoded),
    /// See [`Trimmed`].
    Trimmed(Trimmed),
    /// See [`Cleaned`].
    Cleaned(Cleaned),
    /// See [`Resized`].
    Resized(Resized),
    /// See [`Encoded`].
    Encoded(Encoded),
}

/// Result of [`Stage::advance`]: either the next stage or the
/// completed final stage returned unchanged.
#[must_use]
pub enum Advance {
    /// The pipeline advanced to this next stage.
    Next(Stage),
    /// The pipeline was already at the final stage and is returned unchanged.
    Complete(Stage),
}

/// Delegate a trait constant or method to whichever `Stage` variant is active.
macro_rules! delegate {
    ($self:ident, const $konst:ident) => {
        match $self {
            Self::Pending(_) => Pending::$konst,
            Self::Decoded(_) => Decoded::$konst,
            Self::Trimmed(_) => Trimmed::$konst,
            Self::Cleaned(_) => Cleaned::$konst,
            Self::Resized(_) => Resized::$konst,
            Self::Encoded(_) => Encoded::$konst,
        }
    };
    ($self:ident, $method:ident) => {
        match $self {
            Self::Pending(s) => s.$method(),
            Self::Decoded(s) => s.$method(),
            Self::Trimmed(s) => s.$method(),
            Self::Cleaned(s) => s.$method(),
            Self::Resized(s) => s.$method(),
            Self::Encoded(s) => s.$method(),
        }
    };
}

impl Stage {
    /// Human-readable name of the current stage.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        delegate!(self, const NAME)
    }

    /// Zero-based index of the current stage.
    #[must_use]
    pub const fn index(&self) -> usize {
        delegate!(self, const INDEX)
    }

    /// Whether this is the final stage.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Encoded(_))
    }

    /// Advance one stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the stage transition fails.
    pub fn advance(self) -> Result<Advance, PipelineError> {
        if self.is_complete() {
            return Ok(Advance::Complete(self));
        }
        let name = self.name();
        // Only Encoded returns `None`, and it was handled above.
        #[allow(clippy::unreachable)]
        let next = delegate!(self, next)?
            .unwrap_or_else(|| unreachable!("stage {name} has no successor"));
        Ok(Advance::Next(next))
    }

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any remaining fallible stage fails.
    pub fn complete(self) -> Result<ProcessOutput, PipelineError> {
        delegate!(self, complete)
    }
}

macro_rules! impl_from_stage {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Stage {
                fn from(stage: $variant) -> Self {
                    Self::$variant(stage)
                }
            }
        )*
    };
}

impl_from_stage!(Pending, Decoded, Trimmed, Cleaned, Resized, Encoded);
