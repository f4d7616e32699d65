// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction of the topological model from per-volume face tessellations.
//!
//! Volumes are added in caller order, then each of their faces in turn. The
//! first sighting of a face id registers a new surface and fills sense slot
//! 0 with the owning volume; a second sighting from a different volume fills
//! sense slot 1 and stores nothing else, which is what deduplicates shared
//! faces. A third sighting means the input is not a closed manifold shell
//! and is rejected.

use nalgebra::Point3;

use crate::error::{Error, Result};
use crate::keys::{SurfaceKey, VolumeKey};
use crate::mesh::Triangle;
use crate::model::{Sense, SurfaceData, TopologyModel, VolumeData};

/// Incrementally builds a [`TopologyModel`].
///
/// # Example
///
/// ```
/// use dagmc_lite_topology::{Triangle, TopologyBuilder};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mut builder = TopologyBuilder::new(vertices);
/// let volume = builder.add_volume(1, "steel");
/// builder.add_face(volume, 1, &[Triangle::new(0, 1, 2)]).unwrap();
/// let model = builder.finish().unwrap();
///
/// assert_eq!(model.volume_count(), 1);
/// assert_eq!(model.surface_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    model: TopologyModel,
}

impl TopologyBuilder {
    /// Creates a builder owning the shared vertex pool.
    pub fn new(vertices: Vec<Point3<f64>>) -> Self {
        Self {
            model: TopologyModel {
                vertices,
                ..TopologyModel::default()
            },
        }
    }

    /// Registers a volume. Volumes keep the order of `add_volume` calls.
    pub fn add_volume(&mut self, volume_id: u32, material_tag: impl Into<String>) -> VolumeKey {
        let key = self.model.volumes.insert(VolumeData {
            volume_id,
            material_tag: material_tag.into(),
            surfaces: Vec::new(),
        });
        self.model.volume_order.push(key);
        key
    }

    /// Registers one face of `volume`.
    ///
    /// On the first sighting of `face_id` the triangles are stored verbatim
    /// along with the subset of vertices they reference, and `volume` becomes
    /// the forward sense owner. On a second sighting from a different volume
    /// the triangles are ignored and `volume` completes the sense pair.
    pub fn add_face(
        &mut self,
        volume: VolumeKey,
        face_id: u32,
        triangles: &[Triangle],
    ) -> Result<SurfaceKey> {
        if !self.model.volumes.contains_key(volume) {
            return Err(Error::VolumeNotFound(volume));
        }

        if let Some(&key) = self.model.surface_by_face_id.get(&face_id) {
            let surface = &mut self.model.surfaces[key];
            // A filled reverse slot, or the same volume claiming the face
            // again, would give the surface more than two sides.
            if surface.sense.reverse.is_some() || surface.sense.forward == volume {
                return Err(Error::NonManifoldSurface { face_id });
            }
            surface.sense.reverse = Some(volume);
            self.model.volumes[volume].surfaces.push(key);
            return Ok(key);
        }

        let vertex_count = self.model.vertices.len();
        let mut referenced = Vec::with_capacity(triangles.len() * 3);
        for triangle in triangles {
            for &index in &triangle.0 {
                if index as usize >= vertex_count {
                    return Err(Error::VertexIndexOutOfRange {
                        face_id,
                        index,
                        vertex_count,
                    });
                }
                referenced.push(index);
            }
        }
        referenced.sort_unstable();
        referenced.dedup();

        let key = self.model.surfaces.insert(SurfaceData {
            face_id,
            triangles: triangles.to_vec(),
            vertices: referenced,
            sense: Sense {
                forward: volume,
                reverse: None,
            },
        });
        self.model.surface_order.push(key);
        self.model.surface_by_face_id.insert(face_id, key);
        self.model.volumes[volume].surfaces.push(key);
        Ok(key)
    }

    /// Finishes construction, rejecting volumes without a single surface.
    pub fn finish(self) -> Result<TopologyModel> {
        for &key in &self.model.volume_order {
            let volume = &self.model.volumes[key];
            if volume.surfaces.is_empty() {
                return Err(Error::EmptyVolume {
                    volume_id: volume.volume_id,
                });
            }
        }
        Ok(self.model)
    }
}
