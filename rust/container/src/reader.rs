// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reading containers back.
//!
//! A conformant reader recovers the volume-to-material assignment and the
//! volume adjacency (which surfaces bound which volumes, with sense) from
//! the artifact alone. The queries here do exactly that, working off the
//! decoded [`Container`] so they are backend-agnostic.

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::container::{Container, Handle, NULL_HANDLE};
use crate::encode::{encoder_for, Backend, BINARY_MAGIC};
use crate::error::{Error, Result};
use crate::tags::{self, Category, COMPLEMENT_NAME_SUFFIX, MATERIAL_NAME_PREFIX};

/// Which slot of a surface's sense pair a volume occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SenseSlot {
    Forward,
    Reverse,
}

/// Reads a container artifact, sniffing the backend from its leading bytes.
///
/// A binary artifact read by a build without the `binary` feature fails
/// with [`Error::BackendUnavailable`], not a generic parse error.
pub fn read_container(path: impl AsRef<Path>) -> Result<Container> {
    let bytes = std::fs::read(path)?;
    let backend = sniff_backend(&bytes)?;
    encoder_for(backend)?.decode(&bytes)
}

fn sniff_backend(bytes: &[u8]) -> Result<Backend> {
    if bytes.starts_with(BINARY_MAGIC) {
        return Ok(Backend::Binary);
    }
    if bytes
        .iter()
        .find(|byte| !byte.is_ascii_whitespace())
        .is_some_and(|&byte| byte == b'{')
    {
        return Ok(Backend::Json);
    }
    Err(Error::Malformed("unrecognized container header".into()))
}

impl Container {
    /// Maps each volume's user-facing id to its material tag.
    ///
    /// Walks the group sets: every `mat:<tag>` group assigns its tag to the
    /// volume sets it contains. The implicit complement (`_comp` suffix) is
    /// a pseudo-group and assigns nothing.
    pub fn volume_materials(&self) -> FxHashMap<i32, String> {
        let mut materials = FxHashMap::default();
        for group in self.sets_with_category(Category::Group) {
            let Some(material) = self.group_material(group.handle) else {
                continue;
            };
            for member in group.contents.handles() {
                if let Some(&volume_id) = self.tags.global_id.get(member) {
                    materials.insert(volume_id, material.clone());
                }
            }
        }
        materials
    }

    /// Maps each surface's user-facing id to the user-facing ids of the
    /// volumes it separates; the second slot is `None` on a free boundary.
    pub fn surface_senses(&self) -> FxHashMap<i32, (i32, Option<i32>)> {
        let mut senses = FxHashMap::default();
        for (surface, pair) in self.tags.sense.iter() {
            let Some(&face_id) = self.tags.global_id.get(surface) else {
                continue;
            };
            let Some(&forward) = self.tags.global_id.get(pair[0]) else {
                continue;
            };
            let reverse = if pair[1] == NULL_HANDLE {
                None
            } else {
                self.tags.global_id.get(pair[1]).copied()
            };
            senses.insert(face_id, (forward, reverse));
        }
        senses
    }

    /// Maps each volume's user-facing id to its bounding surfaces, each with
    /// the sense slot the volume occupies.
    pub fn volume_surfaces(&self) -> FxHashMap<i32, Vec<(i32, SenseSlot)>> {
        let mut adjacency: FxHashMap<i32, Vec<(i32, SenseSlot)>> = FxHashMap::default();
        for volume in self.sets_with_category(Category::Volume) {
            let Some(&volume_id) = self.tags.global_id.get(volume.handle) else {
                continue;
            };
            let surfaces = adjacency.entry(volume_id).or_default();
            for &surface in &volume.children {
                let Some(&face_id) = self.tags.global_id.get(surface) else {
                    continue;
                };
                let Some(pair) = self.tags.sense.get(surface) else {
                    continue;
                };
                let slot = if pair[0] == volume.handle {
                    SenseSlot::Forward
                } else {
                    SenseSlot::Reverse
                };
                surfaces.push((face_id, slot));
            }
        }
        adjacency
    }

    /// User-facing ids of the volumes carrying `tag`, in handle order.
    ///
    /// The query tag gets the same truncation as the writer applied, so a
    /// caller holding the original over-budget tag still finds its volumes.
    pub fn volumes_with_material(&self, tag: &str) -> Vec<i32> {
        let (name, _) = tags::material_group_name(tag);
        for group in self.sets_with_category(Category::Group) {
            if self.tags.name.get(group.handle).map(String::as_str) == Some(name.as_str()) {
                return group
                    .contents
                    .handles()
                    .filter_map(|member| self.tags.global_id.get(member).copied())
                    .collect();
            }
        }
        Vec::new()
    }

    /// The material tag a group assigns, or `None` for the implicit
    /// complement and for sets without a `mat:` name.
    fn group_material(&self, group: Handle) -> Option<String> {
        let name = self.tags.name.get(group)?;
        if name.ends_with(COMPLEMENT_NAME_SUFFIX) {
            return None;
        }
        name.strip_prefix(MATERIAL_NAME_PREFIX)
            .map(|material| material.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportConfig, ExportSession};
    use crate::hierarchy::SetHierarchyEncoder;
    use dagmc_lite_topology::{Triangle, TopologyBuilder};
    use nalgebra::Point3;

    fn two_volume_container(complement: Option<&str>) -> Container {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let mut builder = TopologyBuilder::new(vertices);
        let v1 = builder.add_volume(1, "steel");
        let v2 = builder.add_volume(2, "water");
        builder.add_face(v1, 1, &[Triangle::new(0, 1, 3)]).unwrap();
        builder.add_face(v1, 2, &[Triangle::new(1, 2, 3)]).unwrap();
        // face 3 is the shared boundary
        builder.add_face(v1, 3, &[Triangle::new(0, 1, 2)]).unwrap();
        builder.add_face(v2, 3, &[Triangle::new(0, 1, 2)]).unwrap();
        builder.add_face(v2, 4, &[Triangle::new(0, 1, 4)]).unwrap();
        let model = builder.finish().unwrap();

        let mut session = ExportSession::new(ExportConfig::default());
        SetHierarchyEncoder::new(&model, complement).encode(&mut session)
    }

    #[test]
    fn volume_materials_recovers_the_input_pairing() {
        let container = two_volume_container(None);
        let materials = container.volume_materials();
        assert_eq!(materials.len(), 2);
        assert_eq!(materials[&1], "steel");
        assert_eq!(materials[&2], "water");
    }

    #[test]
    fn complement_assigns_no_material() {
        let container = two_volume_container(Some("air"));
        let materials = container.volume_materials();
        assert_eq!(materials.len(), 2);
        assert_eq!(materials[&1], "steel");
        assert_eq!(materials[&2], "water");
    }

    #[test]
    fn surface_senses_resolve_to_user_ids() {
        let container = two_volume_container(None);
        let senses = container.surface_senses();
        assert_eq!(senses.len(), 4);
        assert_eq!(senses[&1], (1, None));
        assert_eq!(senses[&2], (1, None));
        assert_eq!(senses[&3], (1, Some(2)));
        assert_eq!(senses[&4], (2, None));
    }

    #[test]
    fn volume_surfaces_track_sense_slots() {
        let container = two_volume_container(None);
        let adjacency = container.volume_surfaces();

        let v1: Vec<_> = adjacency[&1].clone();
        assert_eq!(
            v1,
            vec![
                (1, SenseSlot::Forward),
                (2, SenseSlot::Forward),
                (3, SenseSlot::Forward),
            ]
        );
        let v2: Vec<_> = adjacency[&2].clone();
        assert_eq!(v2, vec![(3, SenseSlot::Reverse), (4, SenseSlot::Forward)]);
    }

    #[test]
    fn volumes_with_material_matches_truncated_queries() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let long_tag = "b".repeat(30);
        let mut builder = TopologyBuilder::new(vertices);
        let volume = builder.add_volume(9, long_tag.clone());
        builder.add_face(volume, 1, &[Triangle::new(0, 1, 2)]).unwrap();
        let model = builder.finish().unwrap();
        let mut session = ExportSession::new(ExportConfig::default());
        let container = SetHierarchyEncoder::new(&model, None).encode(&mut session);

        assert_eq!(container.volumes_with_material(&long_tag), vec![9]);
        assert_eq!(container.volumes_with_material(&"b".repeat(28)), vec![9]);
        assert!(container.volumes_with_material("carbon").is_empty());
    }

    #[test]
    fn sniffing_rejects_unknown_headers() {
        assert!(matches!(
            sniff_backend(b"STL whatever"),
            Err(Error::Malformed(_))
        ));
        assert_eq!(sniff_backend(b"  {\"format\"").unwrap(), Backend::Json);
        let mut binary = BINARY_MAGIC.to_vec();
        binary.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(sniff_backend(&binary).unwrap(), Backend::Binary);
    }
}
