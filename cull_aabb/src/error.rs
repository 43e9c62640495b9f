//! Error types for the culling subsystem
//!
//! Geometry inconsistencies found while linking cull regions are fatal for
//! a build and carry enough detail for the level author to find the
//! offending boxes. Everything else (query misses, empty levels, repeated
//! teardown) is handled locally and never becomes an Error.

use std::fmt;
use crate::geometry::{Axis, BoundingVolume};

/// Result type for culling operations
pub type Result<T> = std::result::Result<T, Error>;

/// Authoring errors in the cull-region layout.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Two regions meet with only part of a face inside the other face
    /// (corner or edge overlap). The visible set would be ambiguous.
    PartialInterception {
        /// Sweep axis on which the contact was found
        axis: Axis,
        /// Per-axis count of the smaller face's bounds inside the other box
        within: [u8; 3],
        /// Region whose face was being tested
        volume: BoundingVolume,
        /// Region it was tested against
        other: BoundingVolume,
    },

    /// One face is fully contained by the faces of two different regions.
    DoubleInterception {
        /// Sweep axis on which the contact was found
        axis: Axis,
        /// Region whose face matched twice
        volume: BoundingVolume,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::PartialInterception { axis, within, volume, other } => write!(
                f,
                "Partial interception - culling aabbs can not intercept at corners/edges, \
                 one face must be fully contained within another. dimension = {}; \
                 within = {:?}; {} against {}",
                axis, within, volume, other
            ),
            GeometryError::DoubleInterception { axis, volume } => write!(
                f,
                "Double interception - each culling aabb face can only intercept one other \
                 box as a fully contained face. dimension = {}; {}",
                axis, volume
            ),
        }
    }
}

/// Culling subsystem errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Cull-region geometry violates the face-containment rules
    GeometryInconsistency(GeometryError),

    /// Operation not valid in the current lifecycle state
    InvalidState(String),

    /// A scene-graph operation failed (unknown or removed node)
    SceneGraph(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::GeometryInconsistency(err) => write!(f, "Geometry inconsistency: {}", err),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::SceneGraph(msg) => write!(f, "Scene graph error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<GeometryError> for Error {
    fn from(err: GeometryError) -> Self {
        Error::GeometryInconsistency(err)
    }
}

/// Log an ERROR and build an `Error` of the given variant.
///
/// # Example
///
/// ```ignore
/// return Err(cull_err!(InvalidState, "cullaabb::CellManager", "not built"));
/// ```
#[macro_export]
macro_rules! cull_err {
    ($variant:ident, $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::cull_error!($source, "{}", message);
        $crate::error::Error::$variant(message)
    }};
}

/// Log an ERROR and return early with an `Error` of the given variant.
#[macro_export]
macro_rules! cull_bail {
    ($variant:ident, $source:expr, $($arg:tt)*) => {
        return Err($crate::cull_err!($variant, $source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
