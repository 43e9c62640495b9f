//! Unit tests for error.rs
//!
//! Tests the Error / GeometryError variants, Display, conversions and the
//! error-raising macros.

use crate::error::{Error, GeometryError, Result};
use crate::geometry::{Axis, BoundingVolume};

fn cube(lo: f32, hi: f32) -> BoundingVolume {
    BoundingVolume::from_intervals((lo, hi), (lo, hi), (lo, hi))
}

// ============================================================================
// DISPLAY
// ============================================================================

#[test]
fn test_partial_interception_display() {
    let err = GeometryError::PartialInterception {
        axis: Axis::X,
        within: [0, 1, 2],
        volume: cube(0.0, 2.0),
        other: cube(1.0, 3.0),
    };
    let display = format!("{}", err);
    assert!(display.starts_with("Partial interception"));
    assert!(display.contains("dimension = x"));
    assert!(display.contains("within = [0, 1, 2]"));
    assert!(display.contains("{(0, 2), (0, 2), (0, 2)} against {(1, 3), (1, 3), (1, 3)}"));
}

#[test]
fn test_double_interception_display() {
    let err = GeometryError::DoubleInterception { axis: Axis::Z, volume: cube(0.0, 1.0) };
    let display = format!("{}", err);
    assert!(display.starts_with("Double interception"));
    assert!(display.contains("dimension = z"));
}

#[test]
fn test_error_display() {
    let err = Error::InvalidState("not built".to_string());
    assert_eq!(format!("{}", err), "Invalid state: not built");

    let err = Error::SceneGraph("unknown node".to_string());
    assert_eq!(format!("{}", err), "Scene graph error: unknown node");

    let err = Error::from(GeometryError::DoubleInterception { axis: Axis::Y, volume: cube(0.0, 1.0) });
    assert!(format!("{}", err).starts_with("Geometry inconsistency: Double interception"));
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::InvalidState("x".to_string());
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_from_geometry_error_keeps_kind() {
    let geometry = GeometryError::DoubleInterception { axis: Axis::X, volume: cube(0.0, 1.0) };
    let err: Error = geometry.clone().into();
    assert_eq!(err, Error::GeometryInconsistency(geometry));
}

#[test]
fn test_error_clone_and_debug() {
    let err = Error::SceneGraph("gone".to_string());
    let copy = err.clone();
    assert_eq!(err, copy);
    assert!(format!("{:?}", copy).contains("SceneGraph"));
}

// ============================================================================
// MACROS
// ============================================================================

#[test]
fn test_cull_err_builds_variant() {
    let err = crate::cull_err!(InvalidState, "cullaabb::Test", "state {}", 3);
    assert_eq!(err, Error::InvalidState("state 3".to_string()));
}

#[test]
fn test_cull_bail_returns_early() {
    fn fails() -> Result<u32> {
        crate::cull_bail!(SceneGraph, "cullaabb::Test", "node {} missing", 7);
    }

    assert_eq!(fails(), Err(Error::SceneGraph("node 7 missing".to_string())));
}
