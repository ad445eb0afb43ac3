// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-BBox Geometry
//!
//! Rigid frame construction from IFC-style placements, transform
//! composition/inversion and axis-aligned bounds accumulation, using
//! nalgebra for the linear algebra.

pub mod bounds;
pub mod error;
pub mod frame;
pub mod transform;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use bounds::{BoundingBox, BoundsAccumulator};
pub use error::{Error, Result};
pub use frame::{build_frame, build_frame_with, ColumnOrder, Frame, Placement};
pub use transform::DEFAULT_TOLERANCE;
