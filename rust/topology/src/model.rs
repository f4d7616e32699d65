// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The resolved topological model.
//!
//! The [`TopologyModel`] is the central owner of all topology data: the
//! shared vertex pool, the deduplicated surfaces, and the volumes that own
//! them. Entities live in slot maps; two explicit order lists record volume
//! keys in caller order and surface keys in ascending discovery order, and
//! every public iterator follows those lists rather than map order.

use nalgebra::Point3;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::keys::{SurfaceKey, VolumeKey};
use crate::mesh::Triangle;

/// The ordered pair of volumes a surface separates.
///
/// `forward` is the volume that first registered the surface. `reverse` is
/// filled when a second volume registers the same face id; it stays `None`
/// for a free (outer) boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sense {
    pub forward: VolumeKey,
    pub reverse: Option<VolumeKey>,
}

impl Sense {
    /// `true` if the surface separates two volumes.
    pub fn is_shared(&self) -> bool {
        self.reverse.is_some()
    }

    /// The owning volumes, forward slot first.
    pub fn owners(&self) -> SmallVec<[VolumeKey; 2]> {
        let mut owners = SmallVec::new();
        owners.push(self.forward);
        if let Some(reverse) = self.reverse {
            owners.push(reverse);
        }
        owners
    }
}

/// Data stored for a surface: one face's triangles, the vertex subset those
/// triangles reference, and the sense pair.
#[derive(Debug, Clone)]
pub struct SurfaceData {
    /// The stable, user-facing face id assigned upstream.
    pub face_id: u32,
    /// Triangles exactly as registered by the first owning volume.
    pub triangles: Vec<Triangle>,
    /// Sorted, deduplicated indices of the vertices the triangles reference.
    /// Only this subset travels with the surface, not the whole pool.
    pub vertices: Vec<u32>,
    pub sense: Sense,
}

/// Data stored for a volume: its stable id, material tag, and bounding
/// surfaces in registration order.
#[derive(Debug, Clone)]
pub struct VolumeData {
    pub volume_id: u32,
    pub material_tag: String,
    pub surfaces: Vec<SurfaceKey>,
}

/// A collection of volumes sharing one material tag, in the order the tag
/// first appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialGroup {
    pub tag: String,
    pub volumes: Vec<VolumeKey>,
}

/// The fully resolved topological model produced by
/// [`TopologyBuilder`](crate::builder::TopologyBuilder).
#[derive(Debug, Clone, Default)]
pub struct TopologyModel {
    pub(crate) vertices: Vec<Point3<f64>>,
    pub(crate) volumes: SlotMap<VolumeKey, VolumeData>,
    pub(crate) surfaces: SlotMap<SurfaceKey, SurfaceData>,
    /// Volume keys in caller order.
    pub(crate) volume_order: Vec<VolumeKey>,
    /// Surface keys in ascending order of first discovery.
    pub(crate) surface_order: Vec<SurfaceKey>,
    pub(crate) surface_by_face_id: FxHashMap<u32, SurfaceKey>,
}

impl TopologyModel {
    /// The shared vertex pool.
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn volume_count(&self) -> usize {
        self.volume_order.len()
    }

    pub fn surface_count(&self) -> usize {
        self.surface_order.len()
    }

    /// Total triangle count across all deduplicated surfaces.
    pub fn triangle_count(&self) -> usize {
        self.surface_order
            .iter()
            .map(|&key| self.surfaces[key].triangles.len())
            .sum()
    }

    /// Returns the volume data for the given key, or `None` if not found.
    pub fn volume(&self, key: VolumeKey) -> Option<&VolumeData> {
        self.volumes.get(key)
    }

    /// Returns the surface data for the given key, or `None` if not found.
    pub fn surface(&self, key: SurfaceKey) -> Option<&SurfaceData> {
        self.surfaces.get(key)
    }

    /// Volumes in caller order.
    pub fn volumes(&self) -> impl Iterator<Item = (VolumeKey, &VolumeData)> {
        self.volume_order.iter().map(|&key| (key, &self.volumes[key]))
    }

    /// Surfaces in ascending discovery order.
    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceKey, &SurfaceData)> {
        self.surface_order
            .iter()
            .map(|&key| (key, &self.surfaces[key]))
    }

    /// Looks up the surface registered under a face id.
    pub fn surface_for_face(&self, face_id: u32) -> Option<SurfaceKey> {
        self.surface_by_face_id.get(&face_id).copied()
    }

    /// Groups volumes by material tag, merging volumes that share a tag.
    /// Groups appear in the order their tag first appears in volume order.
    pub fn material_groups(&self) -> Vec<MaterialGroup> {
        let mut groups: Vec<MaterialGroup> = Vec::new();
        let mut index_by_tag: FxHashMap<&str, usize> = FxHashMap::default();

        for &key in &self.volume_order {
            let volume = &self.volumes[key];
            match index_by_tag.get(volume.material_tag.as_str()) {
                Some(&index) => groups[index].volumes.push(key),
                None => {
                    index_by_tag.insert(volume.material_tag.as_str(), groups.len());
                    groups.push(MaterialGroup {
                        tag: volume.material_tag.clone(),
                        volumes: vec![key],
                    });
                }
            }
        }

        groups
    }

    /// All volumes carrying the given material tag, in caller order.
    pub fn volumes_with_material(&self, tag: &str) -> Vec<VolumeKey> {
        self.volume_order
            .iter()
            .copied()
            .filter(|&key| self.volumes[key].material_tag == tag)
            .collect()
    }
}
