// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rigid frames built from IfcAxis2Placement3D-style placements
//!
//! A placement carries a location, an `Axis` (local Z) and a `RefDirection`
//! (local X). Neither direction is trusted to be unit length or exactly
//! orthogonal: both are normalized, the reference direction is projected onto
//! the plane perpendicular to the axis, and the third axis is derived by cross
//! product. Zero-length or parallel inputs are reported as
//! [`Error::DegenerateFrame`] instead of being patched with a default.

use crate::error::{Error, Result};
use crate::transform::{self, DEFAULT_TOLERANCE};
use nalgebra::{Matrix4, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw placement attributes of a part relative to the global system
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// Location of the local origin
    pub origin: Point3<f64>,
    /// Primary axis (local Z)
    pub axis: Vector3<f64>,
    /// Reference direction (local X)
    pub ref_direction: Vector3<f64>,
}

impl Placement {
    pub fn new(origin: Point3<f64>, axis: Vector3<f64>, ref_direction: Vector3<f64>) -> Self {
        Self {
            origin,
            axis,
            ref_direction,
        }
    }

    /// Placement at `origin` with the default axes: axis (0, 0, 1), ref direction (1, 0, 0)
    pub fn at(origin: Point3<f64>) -> Self {
        Self::new(origin, Vector3::z(), Vector3::x())
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::at(Point3::origin())
    }
}

/// Order in which the orthonormal axes are laid out as rotation columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColumnOrder {
    /// `(ref_direction, axis × ref_direction, axis)`: local X, Y, Z.
    #[default]
    Placement,
    /// `(axis, ref_direction, axis × ref_direction)`.
    ///
    /// Compatibility shim for reproducing results that built the reference
    /// part's frame with this ordering. Local X follows the axis instead of
    /// the reference direction.
    AxisFirst,
}

impl ColumnOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnOrder::Placement => "placement",
            ColumnOrder::AxisFirst => "axis-first",
        }
    }
}

impl std::fmt::Display for ColumnOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ColumnOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placement" | "xyz" => Ok(ColumnOrder::Placement),
            "axis-first" | "axis_first" | "legacy" => Ok(ColumnOrder::AxisFirst),
            other => Err(format!("unknown column order '{other}'")),
        }
    }
}

/// Rigid local-to-parent transform
///
/// Can only be constructed through [`build_frame`] (or [`Frame::identity`]),
/// so the rotation block is always orthonormal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Frame {
    matrix: Matrix4<f64>,
}

impl Frame {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Build a frame from a placement using the given column order
    pub fn from_placement(placement: &Placement, order: ColumnOrder, tolerance: f64) -> Result<Self> {
        build_frame_with(
            placement.origin,
            placement.axis,
            placement.ref_direction,
            order,
            tolerance,
        )
    }

    /// Homogeneous local-to-parent matrix
    #[inline]
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Frame origin in parent coordinates
    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        Point3::from(transform::translation(&self.matrix))
    }

    /// Rotation columns in parent coordinates
    pub fn axes(&self) -> [Vector3<f64>; 3] {
        [
            self.matrix.fixed_view::<3, 1>(0, 0).into_owned(),
            self.matrix.fixed_view::<3, 1>(0, 1).into_owned(),
            self.matrix.fixed_view::<3, 1>(0, 2).into_owned(),
        ]
    }

    /// Parent-to-local transform
    pub fn inverse(&self) -> Result<Matrix4<f64>> {
        transform::invert(&self.matrix)
    }

    /// Transform taking this frame's local coordinates into `reference`'s local coordinates
    ///
    /// Equivalent to `reference⁻¹ · self`.
    pub fn relative_to(&self, reference: &Frame) -> Result<Matrix4<f64>> {
        let reference_inv = reference.inverse()?;
        Ok(transform::multiply(&reference_inv, &self.matrix))
    }

    /// Map a local point into parent coordinates
    #[inline]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        transform::transform_point(&self.matrix, p)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}

/// Build a frame with the default column order and tolerance
pub fn build_frame(
    origin: Point3<f64>,
    primary_axis: Vector3<f64>,
    ref_direction: Vector3<f64>,
) -> Result<Frame> {
    build_frame_with(
        origin,
        primary_axis,
        ref_direction,
        ColumnOrder::Placement,
        DEFAULT_TOLERANCE,
    )
}

/// Build a rigid frame from an origin, a primary axis and a reference direction
pub fn build_frame_with(
    origin: Point3<f64>,
    primary_axis: Vector3<f64>,
    ref_direction: Vector3<f64>,
    order: ColumnOrder,
    tolerance: f64,
) -> Result<Frame> {
    if !origin.coords.iter().all(|c| c.is_finite()) {
        return Err(Error::degenerate(format!(
            "origin {:?} is not finite",
            origin.coords.as_slice()
        )));
    }
    let z_axis = transform::normalize(&primary_axis, tolerance).ok_or_else(|| {
        Error::degenerate(format!("primary axis {:?} has zero length", primary_axis.as_slice()))
    })?;
    let ref_normalized = transform::normalize(&ref_direction, tolerance).ok_or_else(|| {
        Error::degenerate(format!(
            "reference direction {:?} has zero length",
            ref_direction.as_slice()
        ))
    })?;

    // Project ref direction onto the plane perpendicular to the axis
    let projected = ref_normalized - z_axis * transform::dot(&ref_normalized, &z_axis);
    let x_axis = transform::normalize(&projected, tolerance).ok_or_else(|| {
        Error::degenerate(format!(
            "primary axis {:?} and reference direction {:?} are parallel",
            primary_axis.as_slice(),
            ref_direction.as_slice()
        ))
    })?;

    let y_axis = transform::cross(&z_axis, &x_axis);

    let columns = match order {
        ColumnOrder::Placement => [x_axis, y_axis, z_axis],
        ColumnOrder::AxisFirst => [z_axis, x_axis, y_axis],
    };

    // Columns represent parent-space directions of the local axes
    let mut matrix = Matrix4::identity();
    for (col, axis) in columns.iter().enumerate() {
        matrix[(0, col)] = axis.x;
        matrix[(1, col)] = axis.y;
        matrix[(2, col)] = axis.z;
    }
    matrix[(0, 3)] = origin.x;
    matrix[(1, 3)] = origin.y;
    matrix[(2, 3)] = origin.z;

    Ok(Frame { matrix })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_placement_is_identity() {
        let frame = Frame::from_placement(&Placement::default(), ColumnOrder::Placement, DEFAULT_TOLERANCE)
            .unwrap();
        assert_relative_eq!(*frame.matrix(), Matrix4::identity());
    }

    #[test]
    fn columns_follow_placement_order() {
        let frame = build_frame(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        let [x, y, z] = frame.axes();
        assert_relative_eq!(x, Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(y, Vector3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(z, Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(frame.origin(), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn axis_first_order_permutes_columns() {
        let frame = build_frame_with(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            ColumnOrder::AxisFirst,
            DEFAULT_TOLERANCE,
        )
        .unwrap();
        let [c0, c1, c2] = frame.axes();
        assert_relative_eq!(c0, Vector3::z());
        assert_relative_eq!(c1, Vector3::x());
        assert_relative_eq!(c2, Vector3::y());
        assert!(transform::is_rigid(frame.matrix(), DEFAULT_TOLERANCE));
    }

    #[test]
    fn unnormalized_inputs_give_orthonormal_basis() {
        let frame = build_frame(
            Point3::origin(),
            Vector3::new(0.0, 0.0, 5.0),
            Vector3::new(3.0, 0.0, 2.0),
        )
        .unwrap();
        assert!(transform::is_rigid(frame.matrix(), DEFAULT_TOLERANCE));
        let [x, _, _] = frame.axes();
        assert_relative_eq!(x, Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn parallel_directions_are_degenerate() {
        let err = build_frame(
            Point3::origin(),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DegenerateFrame(_)));
    }

    #[test]
    fn zero_axis_is_degenerate() {
        let err = build_frame(Point3::origin(), Vector3::zeros(), Vector3::x()).unwrap_err();
        assert!(matches!(err, Error::DegenerateFrame(_)));
    }

    #[test]
    fn non_finite_origin_is_degenerate() {
        let err = build_frame(Point3::new(f64::NAN, 0.0, 0.0), Vector3::z(), Vector3::x()).unwrap_err();
        assert!(matches!(&err, Error::DegenerateFrame(msg) if msg.contains("origin")));

        let err = build_frame(Point3::new(0.0, f64::INFINITY, 0.0), Vector3::z(), Vector3::x()).unwrap_err();
        assert!(matches!(err, Error::DegenerateFrame(_)));
    }

    #[test]
    fn frame_round_trip_is_identity() {
        let frame = build_frame(
            Point3::new(-4.0, 7.5, 0.25),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(1.0, -1.0, 0.0),
        )
        .unwrap();
        let inv = frame.inverse().unwrap();
        assert_relative_eq!(inv * frame.matrix(), Matrix4::identity(), epsilon = 1e-12);
        assert_relative_eq!(frame.matrix() * inv, Matrix4::identity(), epsilon = 1e-12);
    }

    #[test]
    fn relative_to_self_is_identity() {
        let frame = build_frame(
            Point3::new(2.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 1.0),
            Vector3::x(),
        )
        .unwrap();
        let rel = frame.relative_to(&frame).unwrap();
        let p = Point3::new(0.3, -1.2, 4.0);
        assert_relative_eq!(transform::transform_point(&rel, &p), p, epsilon = 1e-12);
    }

    #[test]
    fn column_order_parses_from_str() {
        assert_eq!("axis-first".parse::<ColumnOrder>().unwrap(), ColumnOrder::AxisFirst);
        assert_eq!(" Placement ".parse::<ColumnOrder>().unwrap(), ColumnOrder::Placement);
        assert!("zyx".parse::<ColumnOrder>().is_err());
    }
}
