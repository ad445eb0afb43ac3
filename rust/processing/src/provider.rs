// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assembly provider seam.
//!
//! The search never reads a model file itself. Whatever decodes the model
//! (an IFC/STEP decoder, a database, a test fixture) implements
//! [`AssemblyProvider`] and hands over parts, placements and faces by entity id.

use crate::error::{Error, Result};
use crate::model::{Assembly, Part, PartGeometry};
use ifc_bbox_geometry::Placement;
use rustc_hash::FxHashMap;

/// Source of assemblies, part placements and part boundary geometry.
pub trait AssemblyProvider {
    /// Ids of the parts decomposing `assembly_id`, in model order.
    fn list_parts(&self, assembly_id: u32) -> Result<Vec<u32>>;

    /// Placement of a part relative to the global system.
    fn local_frame(&self, part_id: u32) -> Result<Placement>;

    /// Boundary faces of a part in its local coordinates.
    fn boundary_faces(&self, part_id: u32) -> Result<PartGeometry>;

    fn part_name(&self, _part_id: u32) -> Option<String> {
        None
    }

    fn assembly_name(&self, _assembly_id: u32) -> Option<String> {
        None
    }
}

/// Gather a full [`Assembly`] from a provider.
pub fn load_assembly<P: AssemblyProvider + ?Sized>(provider: &P, assembly_id: u32) -> Result<Assembly> {
    let part_ids = provider.list_parts(assembly_id)?;
    let mut assembly = Assembly::new(assembly_id);
    assembly.name = provider.assembly_name(assembly_id);
    assembly.parts.reserve(part_ids.len());

    for part_id in part_ids {
        let placement = provider.local_frame(part_id)?;
        let geometry = provider.boundary_faces(part_id)?;
        let mut part = Part::new(part_id, placement, geometry);
        part.name = provider.part_name(part_id);
        assembly.push(part);
    }

    Ok(assembly)
}

/// Id-keyed in-memory model of assemblies and parts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryModel {
    parts: FxHashMap<u32, Part>,
    /// Assembly id -> (name, ordered part ids)
    assemblies: FxHashMap<u32, (Option<String>, Vec<u32>)>,
}

impl InMemoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an assembly and all of its parts, replacing entries with the same ids.
    pub fn insert_assembly(&mut self, assembly: Assembly) {
        let part_ids = assembly.parts.iter().map(|p| p.id).collect();
        self.assemblies.insert(assembly.id, (assembly.name, part_ids));
        for part in assembly.parts {
            self.parts.insert(part.id, part);
        }
    }

    /// Insert a standalone part, not attached to any assembly.
    pub fn insert_part(&mut self, part: Part) {
        self.parts.insert(part.id, part);
    }

    pub fn part(&self, part_id: u32) -> Option<&Part> {
        self.parts.get(&part_id)
    }

    pub fn assembly_count(&self) -> usize {
        self.assemblies.len()
    }

    fn require_part(&self, part_id: u32) -> Result<&Part> {
        self.parts.get(&part_id).ok_or(Error::PartNotFound(part_id))
    }
}

impl AssemblyProvider for InMemoryModel {
    fn list_parts(&self, assembly_id: u32) -> Result<Vec<u32>> {
        self.assemblies
            .get(&assembly_id)
            .map(|(_, ids)| ids.clone())
            .ok_or(Error::AssemblyNotFound(assembly_id))
    }

    fn local_frame(&self, part_id: u32) -> Result<Placement> {
        Ok(self.require_part(part_id)?.placement)
    }

    fn boundary_faces(&self, part_id: u32) -> Result<PartGeometry> {
        Ok(self.require_part(part_id)?.geometry.clone())
    }

    fn part_name(&self, part_id: u32) -> Option<String> {
        self.parts.get(&part_id).and_then(|p| p.name.clone())
    }

    fn assembly_name(&self, assembly_id: u32) -> Option<String> {
        self.assemblies.get(&assembly_id).and_then(|(name, _)| name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::box_faces;
    use ifc_bbox_geometry::Point3;

    fn sample_assembly() -> Assembly {
        Assembly::new(10)
            .with_name("Truss")
            .with_part(
                Part::new(
                    11,
                    Placement::default(),
                    box_faces(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).into(),
                )
                .with_name("Chord"),
            )
            .with_part(Part::new(12, Placement::at(Point3::new(5.0, 0.0, 0.0)), PartGeometry::Absent))
    }

    #[test]
    fn load_assembly_preserves_order_and_names() {
        let mut model = InMemoryModel::new();
        model.insert_assembly(sample_assembly());

        let loaded = load_assembly(&model, 10).unwrap();
        assert_eq!(loaded, sample_assembly());
        assert_eq!(model.assembly_count(), 1);
    }

    #[test]
    fn unknown_assembly_is_not_found() {
        let model = InMemoryModel::new();
        assert!(matches!(load_assembly(&model, 99), Err(Error::AssemblyNotFound(99))));
    }

    #[test]
    fn missing_part_is_reported_with_its_id() {
        let mut model = InMemoryModel::new();
        model.insert_assembly(sample_assembly());
        model.parts.remove(&12);

        let err = load_assembly(&model, 10).unwrap_err();
        assert!(matches!(err, Error::PartNotFound(12)));
        assert_eq!(err.part_id(), Some(12));
    }
}
