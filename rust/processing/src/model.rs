// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assembly and part types consumed by the bounding box search.

use ifc_bbox_geometry::{Placement, Point3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Ordered ring of vertices in the owning part's local coordinates.
///
/// Faceted breps are mostly triangles and quads, so four points stay inline.
pub type Face = SmallVec<[Point3<f64>; 4]>;

/// Boundary geometry of a part.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum PartGeometry {
    /// The part has no boundary representation.
    #[default]
    Absent,
    /// Faces of the part's outer shell.
    Faces(Vec<Face>),
}

impl PartGeometry {
    /// True when there is no vertex to contribute (absent or empty faces).
    pub fn is_empty(&self) -> bool {
        match self {
            PartGeometry::Absent => true,
            PartGeometry::Faces(faces) => faces.iter().all(|f| f.is_empty()),
        }
    }

    pub fn faces(&self) -> &[Face] {
        match self {
            PartGeometry::Absent => &[],
            PartGeometry::Faces(faces) => faces,
        }
    }

    /// All face vertices, face by face.
    pub fn vertices(&self) -> impl Iterator<Item = &Point3<f64>> + '_ {
        self.faces().iter().flat_map(|f| f.iter())
    }

    pub fn vertex_count(&self) -> usize {
        self.faces().iter().map(|f| f.len()).sum()
    }
}

impl From<Vec<Face>> for PartGeometry {
    fn from(faces: Vec<Face>) -> Self {
        PartGeometry::Faces(faces)
    }
}

/// A rigid part: entity id, placement and boundary geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: u32,
    pub name: Option<String>,
    pub placement: Placement,
    pub geometry: PartGeometry,
}

impl Part {
    pub fn new(id: u32, placement: Placement, geometry: PartGeometry) -> Self {
        Self {
            id,
            name: None,
            placement,
            geometry,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Part name if known, otherwise `#<id>`
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{}", self.id))
    }
}

/// Parts decomposing one element assembly. Order only matters for tie-breaks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Assembly {
    pub id: u32,
    pub name: Option<String>,
    pub parts: Vec<Part>,
}

impl Assembly {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: None,
            parts: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    pub fn push(&mut self, part: Part) {
        self.parts.push(part);
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.geometry.vertex_count()).sum()
    }
}

/// Six quad faces of the box spanning `min`..`max` in local coordinates.
pub fn box_faces(min: Point3<f64>, max: Point3<f64>) -> Vec<Face> {
    let c = |x: bool, y: bool, z: bool| {
        Point3::new(
            if x { max.x } else { min.x },
            if y { max.y } else { min.y },
            if z { max.z } else { min.z },
        )
    };
    let quad = |a: Point3<f64>, b: Point3<f64>, d: Point3<f64>, e: Point3<f64>| -> Face {
        SmallVec::from_buf([a, b, d, e])
    };

    vec![
        quad(c(false, false, false), c(false, true, false), c(true, true, false), c(true, false, false)),
        quad(c(false, false, true), c(true, false, true), c(true, true, true), c(false, true, true)),
        quad(c(false, false, false), c(true, false, false), c(true, false, true), c(false, false, true)),
        quad(c(false, true, false), c(false, true, true), c(true, true, true), c(true, true, false)),
        quad(c(false, false, false), c(false, false, true), c(false, true, true), c(false, true, false)),
        quad(c(true, false, false), c(true, true, false), c(true, true, true), c(true, false, true)),
    ]
}
