// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for assembly loading and the bounding box search.

use thiserror::Error;

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading an assembly or searching it.
#[derive(Debug, Error)]
pub enum Error {
    /// The assembly has no parts to use as candidate frames.
    #[error("assembly #{assembly_id} has no parts")]
    EmptyAssembly { assembly_id: u32 },

    /// No candidate frame observed a single vertex.
    #[error("assembly #{assembly_id} has no boundary geometry in any part")]
    NoGeometryObserved { assembly_id: u32 },

    /// A part with boundary geometry has an unusable placement.
    #[error("part #{part_id}: {source}")]
    DegenerateFrame {
        part_id: u32,
        #[source]
        source: ifc_bbox_geometry::Error,
    },

    /// A part's boundary vertex maps to a NaN or infinite coordinate.
    #[error("part #{part_id}: vertex {vertex:?} is not finite")]
    NonFiniteVertex { part_id: u32, vertex: [f64; 3] },

    /// A frame that should be rigid could not be inverted.
    #[error("part #{part_id}: {source}")]
    InvariantViolation {
        part_id: u32,
        #[source]
        source: ifc_bbox_geometry::Error,
    },

    #[error("assembly #{0} not found")]
    AssemblyNotFound(u32),

    #[error("part #{0} not found")]
    PartNotFound(u32),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Attach a part id to a geometry error, keeping its kind.
    pub fn for_part(part_id: u32, source: ifc_bbox_geometry::Error) -> Self {
        match source {
            ifc_bbox_geometry::Error::DegenerateFrame(_) => Error::DegenerateFrame { part_id, source },
            ifc_bbox_geometry::Error::InvariantViolation(_) => {
                Error::InvariantViolation { part_id, source }
            }
        }
    }

    /// Part the error is scoped to, if any.
    pub fn part_id(&self) -> Option<u32> {
        match self {
            Error::DegenerateFrame { part_id, .. }
            | Error::NonFiniteVertex { part_id, .. }
            | Error::InvariantViolation { part_id, .. } => Some(*part_id),
            Error::PartNotFound(id) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_errors_are_always_scoped_to_a_part() {
        let degenerate = Error::for_part(3, ifc_bbox_geometry::Error::degenerate("zero axis"));
        assert!(matches!(degenerate, Error::DegenerateFrame { part_id: 3, .. }));
        assert_eq!(degenerate.part_id(), Some(3));
        assert_eq!(degenerate.to_string(), "part #3: Degenerate frame: zero axis");

        let singular = Error::for_part(4, ifc_bbox_geometry::Error::invariant("singular"));
        assert!(matches!(singular, Error::InvariantViolation { part_id: 4, .. }));
        assert_eq!(singular.part_id(), Some(4));
    }

    #[test]
    fn non_finite_vertex_names_part_and_vertex() {
        let err = Error::NonFiniteVertex {
            part_id: 2,
            vertex: [f64::NAN, 0.0, 0.0],
        };
        assert_eq!(err.part_id(), Some(2));
        assert!(err.to_string().starts_with("part #2: vertex [NaN, 0.0, 0.0]"));
    }
}
