// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology construction.

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building the topological model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A face id was registered under more than two volumes. The model
    /// assumes a closed, manifold shell where a surface separates at most
    /// two solid regions.
    #[error("surface {face_id} is claimed by more than two volumes")]
    NonManifoldSurface { face_id: u32 },

    /// A volume finished construction without a single bounding surface.
    #[error("volume {volume_id} has no surfaces")]
    EmptyVolume { volume_id: u32 },

    /// A triangle referenced a vertex index outside the shared vertex pool.
    #[error(
        "triangle on surface {face_id} references vertex {index} but the model has {vertex_count} vertices"
    )]
    VertexIndexOutOfRange {
        face_id: u32,
        index: u32,
        vertex_count: usize,
    },

    /// Volume key not found in the model.
    #[error("volume not found: {0:?}")]
    VolumeNotFound(crate::keys::VolumeKey),
}
