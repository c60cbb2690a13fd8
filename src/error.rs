use crate::format::ImgFormat;

/// Plane buffers handed to [`ImageRef::new`](crate::ImageRef::new) or
/// [`ImageMut::new`](crate::ImageMut::new) don't describe a usable image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SizeError {
    /// Width or height is zero.
    #[error("image dimensions must be non-zero")]
    ZeroSize,
    /// The plane count doesn't match the format, or a stride is shorter than a row.
    #[error("plane {plane}: missing or stride shorter than one row")]
    InvalidStride { plane: usize },
    /// The plane slice ends before the last (aligned) row does.
    #[error("plane {plane}: {len} bytes, need at least {needed}")]
    PlaneTooSmall {
        plane: usize,
        needed: usize,
        len: usize,
    },
    /// Palette formats need a palette.
    #[error("palette format without a palette")]
    MissingPalette,
}

/// Diagnostic from a [`Resampler`](crate::resample::Resampler) that refused a
/// format pair.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct GraphError(pub String);

/// Which side of a conversion a format was rejected on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// User format is the source and gets unpacked.
    Unpack,
    /// User format is the destination and gets packed.
    Pack,
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Direction::Unpack => "input",
            Direction::Pack => "output",
        })
    }
}

/// Configuration-time failures of the conversion pipeline.
///
/// Nothing here is produced mid-frame: once a context is configured,
/// [`convert`](crate::ParallelConversionContext::convert) only fails when the
/// images don't match the configured parameters.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    #[error("unsupported {direction} format {format}")]
    UnsupportedFormat {
        format: ImgFormat,
        direction: Direction,
    },
    #[error("scratch buffer allocation failed")]
    Allocation,
    #[error("scaler initialization failed: {0}")]
    Engine(String),
    #[error("thread pool creation failed: {0}")]
    ThreadPool(String),
    #[error("image is {actual}, expected {expected}")]
    FormatMismatch {
        expected: ImgFormat,
        actual: ImgFormat,
    },
    #[error(transparent)]
    Size(#[from] SizeError),
}

impl From<GraphError> for ConvertError {
    fn from(e: GraphError) -> Self {
        ConvertError::Engine(e.0)
    }
}
