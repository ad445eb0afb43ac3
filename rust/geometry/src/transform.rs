// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vector and 4x4 homogeneous transform primitives
//!
//! Thin, stateless helpers over nalgebra used by the frame builder and the
//! candidate-frame search. Rigid transforms are inverted analytically
//! (`[Rᵀ | -Rᵀ·t]`) rather than by general elimination.

use crate::error::{Error, Result};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Default tolerance for length and orthonormality checks
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Dot product of two vectors
#[inline]
pub fn dot(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.dot(b)
}

/// Cross product of two vectors
///
/// Parallel inputs yield the zero vector; callers building a frame must treat
/// that as degenerate.
#[inline]
pub fn cross(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    a.cross(b)
}

/// Normalize a vector, returning `None` if its length is within `tolerance` of zero
#[inline]
pub fn normalize(v: &Vector3<f64>, tolerance: f64) -> Option<Vector3<f64>> {
    let norm = v.norm();
    if norm.is_finite() && norm > tolerance {
        Some(v / norm)
    } else {
        None
    }
}

/// Multiply two 4x4 matrices (`m · n`)
#[inline]
pub fn multiply(m: &Matrix4<f64>, n: &Matrix4<f64>) -> Matrix4<f64> {
    m * n
}

/// Apply a transform to a point treated as homogeneous `(x, y, z, 1)`
#[inline]
pub fn transform_point(m: &Matrix4<f64>, p: &Point3<f64>) -> Point3<f64> {
    let h = m * p.to_homogeneous();
    Point3::new(h.x, h.y, h.z)
}

/// Upper-left 3x3 rotation block of a homogeneous transform
#[inline]
pub fn rotation_block(m: &Matrix4<f64>) -> Matrix3<f64> {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Translation column of a homogeneous transform
#[inline]
pub fn translation(m: &Matrix4<f64>) -> Vector3<f64> {
    Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

/// Check whether `m` is a rigid transform: orthonormal rotation block and an
/// affine bottom row of `(0, 0, 0, 1)`.
pub fn is_rigid(m: &Matrix4<f64>, tolerance: f64) -> bool {
    let bottom_ok = m[(3, 0)].abs() <= tolerance
        && m[(3, 1)].abs() <= tolerance
        && m[(3, 2)].abs() <= tolerance
        && (m[(3, 3)] - 1.0).abs() <= tolerance;
    if !bottom_ok {
        return false;
    }

    let r = rotation_block(m);
    let gram = r.transpose() * r;
    (gram - Matrix3::identity()).iter().all(|v| v.abs() <= tolerance)
}

/// Invert a transform
///
/// Rigid transforms use the closed form `[Rᵀ | -Rᵀ·t]`. Anything else falls
/// back to a general 4x4 inverse; a singular matrix is an invariant violation.
pub fn invert(m: &Matrix4<f64>) -> Result<Matrix4<f64>> {
    if is_rigid(m, DEFAULT_TOLERANCE) {
        let rt = rotation_block(m).transpose();
        let t = -(rt * translation(m));

        let mut inv = Matrix4::identity();
        inv.fixed_view_mut::<3, 3>(0, 0).copy_from(&rt);
        inv[(0, 3)] = t.x;
        inv[(1, 3)] = t.y;
        inv[(2, 3)] = t.z;
        return Ok(inv);
    }

    m.try_inverse()
        .ok_or_else(|| Error::invariant("transform matrix is not invertible"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn rigid_sample() -> Matrix4<f64> {
        let rot = nalgebra::Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let mut m = rot.to_homogeneous();
        m[(0, 3)] = 5.0;
        m[(1, 3)] = -2.0;
        m[(2, 3)] = 1.5;
        m
    }

    #[test]
    fn cross_of_parallel_vectors_is_zero() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        let b = Vector3::new(3.0, 0.0, 0.0);
        assert_relative_eq!(cross(&a, &b).norm(), 0.0);
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        let z = cross(&Vector3::x(), &Vector3::y());
        assert_relative_eq!(z, Vector3::z());
    }

    #[test]
    fn normalize_rejects_zero_length() {
        assert!(normalize(&Vector3::zeros(), DEFAULT_TOLERANCE).is_none());
        let n = normalize(&Vector3::new(0.0, 3.0, 4.0), DEFAULT_TOLERANCE).unwrap();
        assert_relative_eq!(n.norm(), 1.0);
        assert_relative_eq!(n.y, 0.6);
    }

    #[test]
    fn transform_point_applies_translation() {
        let m = Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0));
        let p = transform_point(&m, &Point3::origin());
        assert_relative_eq!(p, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn rigid_inverse_round_trips() {
        let m = rigid_sample();
        assert!(is_rigid(&m, DEFAULT_TOLERANCE));
        let inv = invert(&m).unwrap();
        assert_relative_eq!(multiply(&inv, &m), Matrix4::identity(), epsilon = 1e-12);
        assert_relative_eq!(multiply(&m, &inv), Matrix4::identity(), epsilon = 1e-12);
    }

    #[test]
    fn non_rigid_inverse_falls_back_to_general() {
        let m = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 3.0, 4.0));
        assert!(!is_rigid(&m, DEFAULT_TOLERANCE));
        let inv = invert(&m).unwrap();
        assert_relative_eq!(inv * m, Matrix4::identity(), epsilon = 1e-12);
    }

    #[test]
    fn singular_matrix_is_invariant_violation() {
        let m = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 0.0, 1.0));
        assert!(matches!(invert(&m), Err(Error::InvariantViolation(_))));
    }
}
