// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tessellation input types.
//!
//! The upstream mesher hands over one shared vertex pool plus, per volume,
//! the triangles of each bounding face. Rust maps do not preserve caller
//! insertion order, so the "volume id to face id to triangles" mapping is
//! expressed as ordered structs: the slice order of [`VolumeMesh`] values is
//! the volume order, and `faces` is the face order within a volume.

use serde::{Deserialize, Serialize};

/// A triangle as three 0-based indices into the shared vertex pool, wound so
/// its normal points away from the solid interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle(pub [u32; 3]);

impl Triangle {
    /// Creates a triangle from three vertex indices.
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self([a, b, c])
    }

    /// The three vertex indices.
    pub fn indices(&self) -> [u32; 3] {
        self.0
    }
}

/// The triangles tessellating a single CAD face.
///
/// `face_id` is the stable, user-facing id assigned upstream. A face shared
/// between two volumes appears in both volumes' meshes under the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceMesh {
    pub face_id: u32,
    pub triangles: Vec<Triangle>,
}

impl FaceMesh {
    pub fn new(face_id: u32, triangles: Vec<Triangle>) -> Self {
        Self { face_id, triangles }
    }
}

/// One solid's tessellation: its stable volume id and its faces, in the
/// caller's face order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMesh {
    pub volume_id: u32,
    pub faces: Vec<FaceMesh>,
}

impl VolumeMesh {
    pub fn new(volume_id: u32, faces: Vec<FaceMesh>) -> Self {
        Self { volume_id, faces }
    }
}
