// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # DAGMC-Lite Container
//!
//! Tagged set-hierarchy container encoding for particle-transport geometry.
//!
//! Given an already-tessellated geometry (a shared vertex pool plus the
//! triangles of each volume's faces) and one material tag per volume, the
//! [`export`] entry point builds a deduplicated topological model, lays out
//! the container's set hierarchy with a fixed, deterministic handle order,
//! and writes one artifact a transport code can consume without the
//! original CAD model:
//!
//! - one surface set per unique face (`geom_dimension = 2`, sense pair);
//! - one volume set per input volume (`geom_dimension = 3`), parent of its
//!   surface sets;
//! - one group set per distinct material tag (`name = "mat:<tag>"`),
//!   containing the volume sets sharing the tag, plus an optional implicit
//!   complement group;
//! - a file set enumerating everything produced.
//!
//! ## Backends
//!
//! Two interchangeable encoders serialize the same logical container: a
//! compact binary layout (cargo feature `binary`, on by default) and a
//! versioned JSON document. [`read_container`] sniffs the artifact and
//! recovers the identical logical model from either.
//!
//! ## Quick start
//!
//! ```
//! use dagmc_lite_container::{export, ExportConfig, FaceMesh, Triangle, VolumeMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//! let volumes = vec![VolumeMesh::new(
//!     1,
//!     vec![
//!         FaceMesh::new(1, vec![Triangle::new(0, 2, 1)]),
//!         FaceMesh::new(2, vec![Triangle::new(0, 1, 3)]),
//!         FaceMesh::new(3, vec![Triangle::new(0, 3, 2)]),
//!         FaceMesh::new(4, vec![Triangle::new(1, 2, 3)]),
//!     ],
//! )];
//! let material_tags = vec!["steel".to_string()];
//!
//! let out = std::env::temp_dir().join("tetrahedron.dagc");
//! let outcome = export(vertices, &volumes, &material_tags, &out, &ExportConfig::default())?;
//! assert!(outcome.warnings.is_empty());
//! # std::fs::remove_file(&out).ok();
//! # Ok::<(), dagmc_lite_container::Error>(())
//! ```

pub mod container;
pub mod encode;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod reader;
pub mod tags;

pub use container::{Container, EntitySet, Handle, SetContents, SparseTag, TagTables, NULL_HANDLE};
pub use encode::{encoder_for, Backend, Encoder};
pub use error::{Error, Result};
pub use export::{export, ExportConfig, ExportOutcome, ExportSession, ExportStage, Warning};
pub use hierarchy::SetHierarchyEncoder;
pub use reader::{read_container, SenseSlot};
pub use tags::Category;

// Input types, re-exported so callers of [`export`] need not depend on the
// topology crate directly.
pub use dagmc_lite_topology::{FaceMesh, Triangle, VolumeMesh};
