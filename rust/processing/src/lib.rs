// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-BBox Processing
//!
//! Finds, for an element assembly, the part placement whose local frame gives
//! the smallest axis-aligned bounding box around every part of the assembly.
//!
//! Model access goes through [`AssemblyProvider`]; [`InMemoryModel`] is a
//! ready-made id-keyed implementation. The search itself is
//! [`find_min_bbox`] (or [`find_assembly_bbox`] to load by id first), tuned by
//! [`SearchConfig`].

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod search;

pub use config::SearchConfig;
pub use error::{Error, Result};
pub use model::{box_faces, Assembly, Face, Part, PartGeometry};
pub use provider::{load_assembly, AssemblyProvider, InMemoryModel};
pub use search::{
    evaluate_candidates, find_assembly_bbox, find_min_bbox, CandidateReport, CandidateResult,
    MinBoundingBox, SkipReason, SkippedCandidate,
};

pub use ifc_bbox_geometry::{BoundingBox, ColumnOrder, Frame, Placement, Point3, Vector3};
