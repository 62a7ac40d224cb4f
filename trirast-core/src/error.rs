/// Error taxonomy for the rasterizer core.
///
/// Configuration errors come from bad matrices, bad builder parameters or
/// mismatched buffers. Lookup errors come from unknown handles or indices that
/// point past the end of a position list. Degenerate triangles and non-finite
/// pixels are not errors at all; `draw` skips them and counts them instead.
use std::fmt;

/// Broad class of a [`RasterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Lookup,
}

/// Which geometry list a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Positions,
    Indices,
    Colors,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Positions => write!(f, "position"),
            HandleKind::Indices => write!(f, "index"),
            HandleKind::Colors => write!(f, "color"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RasterError {
    /// A matrix handed to the rasterizer contains NaN or infinite entries.
    NonFiniteMatrix { which: &'static str },
    /// A builder received an argument outside its domain.
    Domain { parameter: &'static str, reason: &'static str },
    /// Zero-sized render target.
    InvalidDimensions { width: u32, height: u32 },
    /// Color list length differs from the position list it accompanies.
    ColorCountMismatch { colors: usize, positions: usize },
    /// Handle was never issued by the geometry store.
    UnknownHandle { kind: HandleKind, id: usize },
    /// A triangle references a position slot that does not exist.
    IndexOutOfRange { triangle: usize, index: usize, positions: usize },
}

impl RasterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RasterError::NonFiniteMatrix { .. }
            | RasterError::Domain { .. }
            | RasterError::InvalidDimensions { .. }
            | RasterError::ColorCountMismatch { .. } => ErrorKind::Configuration,
            RasterError::UnknownHandle { .. } | RasterError::IndexOutOfRange { .. } => {
                ErrorKind::Lookup
            }
        }
    }

    pub(crate) fn domain(parameter: &'static str, reason: &'static str) -> Self {
        RasterError::Domain { parameter, reason }
    }
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::NonFiniteMatrix { which } => {
                write!(f, "{} matrix contains non-finite entries", which)
            }
            RasterError::Domain { parameter, reason } => {
                write!(f, "invalid {}: {}", parameter, reason)
            }
            RasterError::InvalidDimensions { width, height } => {
                write!(f, "invalid render target size {}x{}", width, height)
            }
            RasterError::ColorCountMismatch { colors, positions } => write!(
                f,
                "color count {} does not match position count {}",
                colors, positions
            ),
            RasterError::UnknownHandle { kind, id } => {
                write!(f, "unknown {} handle #{}", kind, id)
            }
            RasterError::IndexOutOfRange { triangle, index, positions } => write!(
                f,
                "triangle {} references vertex {} but only {} positions are registered",
                triangle, index, positions
            ),
        }
    }
}

impl std::error::Error for RasterError {}

pub type Result<T> = std::result::Result<T, RasterError>;
