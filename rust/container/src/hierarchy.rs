// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lays out the container's set hierarchy from a topological model.
//!
//! Handles are assigned once, monotonically from 1, in a fixed order:
//! vertices, triangles (concatenated per surface in discovery order),
//! surface sets (discovery order), volume sets (caller order), group sets
//! (one per distinct material tag, first-appearance order), the optional
//! implicit complement, and the file set. Identical models therefore
//! produce identical containers, whichever encoder writes the bytes.

use rustc_hash::FxHashMap;

use dagmc_lite_topology::{TopologyModel, VolumeKey};

use crate::container::{Container, EntitySet, Handle, SetContents, TagTables, NULL_HANDLE};
use crate::export::{ExportSession, Warning};
use crate::tags::{self, Category};

/// Walks a [`TopologyModel`] and emits the full set hierarchy with tags
/// attached, as one in-memory [`Container`]. No I/O happens here.
#[derive(Debug)]
pub struct SetHierarchyEncoder<'a> {
    model: &'a TopologyModel,
    implicit_complement_tag: Option<&'a str>,
}

impl<'a> SetHierarchyEncoder<'a> {
    pub fn new(model: &'a TopologyModel, implicit_complement_tag: Option<&'a str>) -> Self {
        Self {
            model,
            implicit_complement_tag,
        }
    }

    /// Builds the container. Tag truncations are reported through the
    /// session as warnings; nothing here fails.
    pub fn encode(&self, session: &mut ExportSession) -> Container {
        let model = self.model;

        let vertex_start: Handle = 1;
        let triangle_start: Handle = vertex_start + model.vertex_count() as Handle;
        let set_start: Handle = triangle_start + model.triangle_count() as Handle;

        // Triangles are laid out per surface in discovery order, so each
        // surface owns one contiguous triangle handle run.
        let mut triangles = Vec::with_capacity(model.triangle_count());
        let mut triangle_runs: Vec<(Handle, usize)> = Vec::with_capacity(model.surface_count());
        for (_, surface) in model.surfaces() {
            let run_start = triangle_start + triangles.len() as Handle;
            triangle_runs.push((run_start, surface.triangles.len()));
            triangles.extend_from_slice(&surface.triangles);
        }

        let mut next = set_start;
        let mut surface_handles: Vec<Handle> = Vec::with_capacity(model.surface_count());
        let mut surface_handle_by_key: FxHashMap<_, Handle> = FxHashMap::default();
        for (key, _) in model.surfaces() {
            surface_handles.push(next);
            surface_handle_by_key.insert(key, next);
            next += 1;
        }
        let mut volume_handles: FxHashMap<VolumeKey, Handle> = FxHashMap::default();
        for (key, _) in model.volumes() {
            volume_handles.insert(key, next);
            next += 1;
        }
        let groups = model.material_groups();
        let group_start = next;
        next += groups.len() as Handle;
        let complement_handle = self.implicit_complement_tag.map(|_| {
            let handle = next;
            next += 1;
            handle
        });
        let file_set = next;

        let mut sets = Vec::with_capacity((file_set - set_start + 1) as usize);
        let mut tag_tables = TagTables::default();

        // Surface sets own their vertices and triangles and point up at
        // their 1-2 owning volume sets.
        for (index, (_, surface)) in model.surfaces().enumerate() {
            let handle = surface_handles[index];
            let (run_start, run_len) = triangle_runs[index];

            let mut contents =
                Vec::with_capacity(surface.vertices.len() + surface.triangles.len());
            contents.extend(
                surface
                    .vertices
                    .iter()
                    .map(|&index| vertex_start + index as Handle),
            );
            contents.extend((0..run_len).map(|offset| run_start + offset as Handle));

            let parents = surface
                .sense
                .owners()
                .iter()
                .map(|owner| volume_handles[owner])
                .collect();

            sets.push(EntitySet {
                handle,
                contents: SetContents::Handles(contents),
                children: Vec::new(),
                parents,
            });

            tag_tables.category.push(handle, Category::Surface);
            if let Some(dimension) = Category::Surface.geom_dimension() {
                tag_tables.geom_dimension.push(handle, dimension);
            }
            tag_tables.global_id.push(handle, surface.face_id as i32);
            let reverse = surface
                .sense
                .reverse
                .map_or(NULL_HANDLE, |key| volume_handles[&key]);
            tag_tables
                .sense
                .push(handle, [volume_handles[&surface.sense.forward], reverse]);
        }

        // Volume sets carry no direct mesh content; their surfaces hang off
        // the child edges, in face registration order.
        for (key, volume) in model.volumes() {
            let handle = volume_handles[&key];
            let children = volume
                .surfaces
                .iter()
                .map(|surface| surface_handle_by_key[surface])
                .collect();

            sets.push(EntitySet {
                handle,
                contents: SetContents::Handles(Vec::new()),
                children,
                parents: Vec::new(),
            });

            tag_tables.category.push(handle, Category::Volume);
            if let Some(dimension) = Category::Volume.geom_dimension() {
                tag_tables.geom_dimension.push(handle, dimension);
            }
            tag_tables.global_id.push(handle, volume.volume_id as i32);
        }

        // One group per distinct material tag, containing every volume set
        // that shares the tag.
        for (index, group) in groups.iter().enumerate() {
            let handle = group_start + index as Handle;
            let members = group
                .volumes
                .iter()
                .map(|volume| volume_handles[volume])
                .collect();

            let (name, truncated) = tags::material_group_name(&group.tag);
            if truncated {
                session.warn(Warning::MaterialTagTruncated {
                    tag: group.tag.clone(),
                    stored_name: name.clone(),
                });
            }

            sets.push(EntitySet {
                handle,
                contents: SetContents::Handles(members),
                children: Vec::new(),
                parents: Vec::new(),
            });

            tag_tables.category.push(handle, Category::Group);
            tag_tables.global_id.push(handle, index as i32 + 1);
            tag_tables.name.push(handle, name);
        }

        // The implicit complement is a pseudo-group for unassigned exterior
        // space. Its sole member is a representative volume handle (the last
        // volume in caller order), kept only so readers find a live handle.
        if let (Some(tag), Some(handle)) = (self.implicit_complement_tag, complement_handle) {
            let representative: Vec<Handle> = model
                .volumes()
                .last()
                .map(|(key, _)| volume_handles[&key])
                .into_iter()
                .collect();

            let (name, truncated) = tags::complement_group_name(tag);
            if truncated {
                session.warn(Warning::MaterialTagTruncated {
                    tag: tag.to_string(),
                    stored_name: name.clone(),
                });
            }

            sets.push(EntitySet {
                handle,
                contents: SetContents::Handles(representative),
                children: Vec::new(),
                parents: Vec::new(),
            });

            tag_tables.category.push(handle, Category::Group);
            tag_tables.name.push(handle, name);
        }

        // The file set ranges over every handle produced before it.
        sets.push(EntitySet {
            handle: file_set,
            contents: SetContents::Range {
                start: 1,
                count: file_set - 1,
            },
            children: Vec::new(),
            parents: Vec::new(),
        });

        Container {
            producer: format!("dagmc-lite {}", env!("CARGO_PKG_VERSION")),
            vertices: model
                .vertices()
                .iter()
                .map(|point| [point.x, point.y, point.z])
                .collect(),
            triangles,
            sets,
            tags: tag_tables,
            vertex_start,
            triangle_start,
            set_start,
            file_set,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportConfig, ExportSession};
    use crate::tags::Category;
    use dagmc_lite_topology::{Triangle, TopologyBuilder};
    use nalgebra::Point3;

    fn tetrahedron_model() -> TopologyModel {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let mut builder = TopologyBuilder::new(vertices);
        let volume = builder.add_volume(1, "mat1");
        builder.add_face(volume, 1, &[Triangle::new(0, 2, 1)]).unwrap();
        builder.add_face(volume, 2, &[Triangle::new(0, 1, 3)]).unwrap();
        builder.add_face(volume, 3, &[Triangle::new(0, 3, 2)]).unwrap();
        builder.add_face(volume, 4, &[Triangle::new(1, 2, 3)]).unwrap();
        builder.finish().unwrap()
    }

    fn encode(model: &TopologyModel, complement: Option<&str>) -> (Container, ExportSession) {
        let mut session = ExportSession::new(ExportConfig::default());
        let container = SetHierarchyEncoder::new(model, complement).encode(&mut session);
        (container, session)
    }

    #[test]
    fn tetrahedron_handle_layout() {
        let model = tetrahedron_model();
        let (container, _) = encode(&model, None);

        // 4 vertices, 4 triangles, then 4 surface sets + 1 volume set +
        // 1 group set + 1 file set
        assert_eq!(container.vertex_start, 1);
        assert_eq!(container.triangle_start, 5);
        assert_eq!(container.set_start, 9);
        assert_eq!(container.file_set, 15);
        assert_eq!(container.set_count(), 7);

        let volume_set = container.set_by_handle(13).unwrap();
        assert_eq!(container.tags.category.get(13), Some(&Category::Volume));
        assert_eq!(container.tags.global_id.get(13), Some(&1));
        assert_eq!(container.tags.geom_dimension.get(13), Some(&3));
        assert_eq!(volume_set.children, vec![9, 10, 11, 12]);

        let group_set = container.set_by_handle(14).unwrap();
        assert_eq!(container.tags.name.get(14), Some(&"mat:mat1".to_string()));
        assert_eq!(container.tags.geom_dimension.get(14), None);
        assert!(group_set.contents.contains(13));

        let file_set = container.set_by_handle(15).unwrap();
        assert_eq!(file_set.contents.len(), 14);
    }

    #[test]
    fn free_surfaces_point_at_their_volume() {
        let model = tetrahedron_model();
        let (container, session) = encode(&model, None);
        assert!(session.warnings().is_empty());

        for handle in 9..=12 {
            let surface = container.set_by_handle(handle).unwrap();
            assert_eq!(surface.parents, vec![13]);
            assert_eq!(container.tags.sense.get(handle), Some(&[13, NULL_HANDLE]));
            assert_eq!(container.tags.geom_dimension.get(handle), Some(&2));
            // 3 vertex handles + 1 triangle handle
            assert_eq!(surface.contents.len(), 4);
        }
    }

    #[test]
    fn shared_tag_volumes_merge_into_one_group() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut builder = TopologyBuilder::new(vertices);
        let v1 = builder.add_volume(1, "steel");
        let v2 = builder.add_volume(2, "steel");
        builder.add_face(v1, 1, &[Triangle::new(0, 1, 2)]).unwrap();
        builder.add_face(v2, 2, &[Triangle::new(0, 2, 1)]).unwrap();
        let model = builder.finish().unwrap();

        let (container, _) = encode(&model, None);
        let groups: Vec<_> = container.sets_with_category(Category::Group).collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].contents.len(), 2);
    }

    #[test]
    fn complement_group_holds_last_volume() {
        let model = tetrahedron_model();
        let (container, _) = encode(&model, Some("air"));

        assert_eq!(container.set_count(), 8);
        let complement = container.set_by_handle(15).unwrap();
        assert_eq!(
            container.tags.name.get(15),
            Some(&"mat:air_comp".to_string())
        );
        assert_eq!(container.tags.category.get(15), Some(&Category::Group));
        assert_eq!(container.tags.geom_dimension.get(15), None);
        assert_eq!(container.tags.global_id.get(15), None);
        assert!(complement.contents.contains(13));
        assert_eq!(container.file_set, 16);
    }

    #[test]
    fn truncated_tag_warns_once() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let long_tag = "a".repeat(29);
        let mut builder = TopologyBuilder::new(vertices);
        let volume = builder.add_volume(1, long_tag.clone());
        builder.add_face(volume, 1, &[Triangle::new(0, 1, 2)]).unwrap();
        let model = builder.finish().unwrap();

        let (container, session) = encode(&model, None);
        assert_eq!(session.warnings().len(), 1);
        let expected = format!("mat:{}", "a".repeat(28));
        let group = container
            .sets_with_category(Category::Group)
            .next()
            .unwrap();
        assert_eq!(container.tags.name.get(group.handle), Some(&expected));
    }
}
