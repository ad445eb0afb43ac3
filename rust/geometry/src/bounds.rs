// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounds accumulation in f64 precision

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in some reference frame
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Point3<f64>,
    /// Maximum corner
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Extent along each axis, clamped to be non-negative
    #[inline]
    pub fn dimensions(&self) -> Vector3<f64> {
        (self.max - self.min).map(|d| d.max(0.0))
    }

    /// Product of the three extents
    ///
    /// Flat boxes have zero volume.
    #[inline]
    pub fn volume(&self) -> f64 {
        let d = self.dimensions();
        d.x * d.y * d.z
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Check whether `p` lies inside the box, inflated by `tolerance`
    pub fn contains(&self, p: &Point3<f64>, tolerance: f64) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] - tolerance && p[i] <= self.max[i] + tolerance)
    }
}

/// Running per-axis min/max over a stream of points
#[derive(Debug, Clone)]
pub struct BoundsAccumulator {
    min: Point3<f64>,
    max: Point3<f64>,
    count: usize,
    non_finite: bool,
}

impl BoundsAccumulator {
    /// Create an accumulator with no observed points
    pub fn new() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            count: 0,
            non_finite: false,
        }
    }

    /// Expand bounds to include a point
    ///
    /// A NaN or infinite coordinate poisons the accumulator: `finalize` then
    /// returns `None`.
    #[inline]
    pub fn observe(&mut self, p: &Point3<f64>) {
        self.non_finite |= !is_finite(p);
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
        self.count += 1;
    }

    pub fn observe_all<'a>(&mut self, points: impl IntoIterator<Item = &'a Point3<f64>>) {
        for p in points {
            self.observe(p);
        }
    }

    /// Combine with another accumulator expressed in the same frame
    pub fn merge(&mut self, other: &BoundsAccumulator) {
        if other.is_empty() {
            return;
        }
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
        self.count += other.count;
        self.non_finite |= other.non_finite;
    }

    /// True until at least one point has been observed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True once a point with a NaN or infinite coordinate was observed
    #[inline]
    pub fn has_non_finite(&self) -> bool {
        self.non_finite
    }

    /// Number of observed points
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Current extents, or `None` if no geometry was observed or the
    /// extents are not finite
    pub fn finalize(&self) -> Option<BoundingBox> {
        if self.is_empty() || self.non_finite || !is_finite(&self.min) || !is_finite(&self.max) {
            None
        } else {
            Some(BoundingBox::new(self.min, self.max))
        }
    }

    pub fn volume(&self) -> Option<f64> {
        self.finalize().map(|b| b.volume())
    }
}

#[inline]
fn is_finite(p: &Point3<f64>) -> bool {
    p.coords.iter().all(|c| c.is_finite())
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_accumulator_has_no_box() {
        let acc = BoundsAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc.finalize().is_none());
        assert!(acc.volume().is_none());
    }

    #[test]
    fn observe_tracks_each_axis_independently() {
        let mut acc = BoundsAccumulator::new();
        acc.observe(&Point3::new(1.0, -2.0, 5.0));
        acc.observe(&Point3::new(-1.0, 4.0, 3.0));

        let bbox = acc.finalize().unwrap();
        assert_relative_eq!(bbox.min, Point3::new(-1.0, -2.0, 3.0));
        assert_relative_eq!(bbox.max, Point3::new(1.0, 4.0, 5.0));
        assert_relative_eq!(bbox.dimensions(), Vector3::new(2.0, 6.0, 2.0));
        assert_relative_eq!(bbox.volume(), 24.0);
        assert_eq!(acc.count(), 2);
    }

    #[test]
    fn single_point_has_zero_volume() {
        let mut acc = BoundsAccumulator::new();
        acc.observe(&Point3::new(3.0, 3.0, 3.0));
        assert_relative_eq!(acc.volume().unwrap(), 0.0);
    }

    #[test]
    fn flat_box_has_zero_volume() {
        let mut acc = BoundsAccumulator::new();
        acc.observe_all(&[Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 2.0, 0.0)]);
        let bbox = acc.finalize().unwrap();
        assert_relative_eq!(bbox.dimensions().z, 0.0);
        assert_relative_eq!(bbox.volume(), 0.0);
    }

    #[test]
    fn inverted_box_clamps_dimensions() {
        let bbox = BoundingBox::new(Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 1.0));
        assert_relative_eq!(bbox.dimensions(), Vector3::new(0.0, 1.0, 1.0));
        assert!(bbox.volume() >= 0.0);
    }

    #[test]
    fn nan_point_gives_no_box() {
        let mut acc = BoundsAccumulator::new();
        acc.observe(&Point3::new(f64::NAN, 0.0, 0.0));
        assert!(!acc.is_empty());
        assert!(acc.has_non_finite());
        assert!(acc.finalize().is_none());
        assert!(acc.volume().is_none());
    }

    #[test]
    fn non_finite_point_poisons_otherwise_valid_bounds() {
        let mut acc = BoundsAccumulator::new();
        acc.observe_all(&[Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)]);
        assert_relative_eq!(acc.volume().unwrap(), 1.0);

        let mut poisoned = BoundsAccumulator::new();
        poisoned.observe(&Point3::new(0.5, f64::INFINITY, 0.5));
        acc.merge(&poisoned);
        assert!(acc.finalize().is_none());
    }

    #[test]
    fn merge_ignores_empty_and_combines_extents() {
        let mut a = BoundsAccumulator::new();
        a.observe(&Point3::new(0.0, 0.0, 0.0));
        a.merge(&BoundsAccumulator::new());
        assert_eq!(a.count(), 1);

        let mut b = BoundsAccumulator::new();
        b.observe(&Point3::new(2.0, 1.0, 1.0));
        a.merge(&b);

        let bbox = a.finalize().unwrap();
        assert_relative_eq!(bbox.volume(), 2.0);
        assert!(bbox.contains(&Point3::new(1.0, 0.5, 0.5), 0.0));
        assert!(!bbox.contains(&Point3::new(3.0, 0.5, 0.5), 1e-9));
        assert_relative_eq!(bbox.center(), Point3::new(1.0, 0.5, 0.5));
    }
}
