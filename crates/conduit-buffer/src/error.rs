//! Error types for conduit buffering.

use thiserror::Error;

/// Fatal errors that abort a run before any output is produced.
///
/// Per-feature problems (null width, bad geometry) and export failures are
/// not errors at this level: they are reported through
/// [`Feedback`](crate::Feedback) and the run carries on.
#[derive(Error, Debug)]
pub enum ConduitError {
    /// No input feature collection was supplied.
    #[error("input conduit layer is missing")]
    MissingSource,

    /// The configured width field is not in the input schema.
    #[error("width field '{0}' not found in input layer")]
    MissingField(String),

    /// A setting is out of range or inconsistent.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for conduit buffer operations.
pub type Result<T> = std::result::Result<T, ConduitError>;

/// Recoverable per-feature problems. The feature is skipped and the run
/// continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// The width attribute is null.
    #[error("Feature {id}: null width, skipping...")]
    NullWidth {
        /// Conduit identifier.
        id: String,
    },

    /// The width attribute holds something that is not a number.
    #[error("Feature {id}: non-numeric width '{value}', skipping...")]
    NonNumericWidth {
        /// Conduit identifier.
        id: String,
        /// Raw attribute text.
        value: String,
    },

    /// The width is zero, negative or not finite.
    #[error("Feature {id}: invalid width {width}, skipping...")]
    NonPositiveWidth {
        /// Conduit identifier.
        id: String,
        /// Raw width value.
        width: f64,
    },

    /// The geometry is not a polyline of at least two vertices.
    #[error("Feature {id}: geometry has {vertices} vertices, skipping...")]
    InvalidGeometry {
        /// Conduit identifier.
        id: String,
        /// Vertex count.
        vertices: usize,
    },
}
