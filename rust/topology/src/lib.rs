// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # DAGMC-Lite Topology
//!
//! In-memory topological model for tessellated solid geometry bound for
//! particle-transport containers.
//!
//! The input is a tessellation produced upstream: one shared vertex pool and,
//! per solid volume, the triangles of each bounding CAD face. Faces shared
//! between two volumes arrive once per owning volume; this crate deduplicates
//! them into a single surface carrying a sense pair that records which
//! volumes the surface separates. Entities live in slot maps with stable
//! generational keys, while explicit order lists keep surface ids in
//! ascending discovery order and volume ids in caller order, so identical
//! logical input always produces an identical model regardless of map
//! iteration order.
//!
//! A face claimed by more than two volumes, a volume with no faces, and a
//! triangle referencing a vertex outside the pool are rejected as hard
//! errors; nothing about the input is repaired silently.

pub mod builder;
pub mod error;
pub mod keys;
pub mod mesh;
pub mod model;

pub use builder::TopologyBuilder;
pub use error::{Error, Result};
pub use keys::{SurfaceKey, VolumeKey};
pub use mesh::{FaceMesh, Triangle, VolumeMesh};
pub use model::{MaterialGroup, Sense, SurfaceData, TopologyModel, VolumeData};
