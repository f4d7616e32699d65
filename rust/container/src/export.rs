// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The public export entry point.
//!
//! [`export`] validates the tessellation, builds the topological model,
//! encodes the set hierarchy with the configured backend, and publishes the
//! artifact atomically: bytes go to a temporary file in the destination
//! directory and reach the final path only through a rename on full
//! success. Validation and topology failures therefore never leave a
//! partial artifact a downstream reader could mistake for valid output.
//!
//! Each call owns an [`ExportSession`]: configuration, accumulated
//! warnings, and the stage the call has reached. Sessions never outlive
//! the call and no state is shared between calls.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use nalgebra::Point3;
use tracing::{debug, info, warn};

use dagmc_lite_topology::{TopologyBuilder, VolumeMesh};

use crate::encode::{encoder_for, Backend};
use crate::error::{Error, Result};
use crate::hierarchy::SetHierarchyEncoder;

/// Configuration for one export call.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Physical encoding to write.
    pub backend: Backend,
    /// Material tag for the implicit complement pseudo-group, if any.
    pub implicit_complement_material_tag: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Binary,
            implicit_complement_material_tag: None,
        }
    }
}

/// A non-fatal condition noted during export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A material tag exceeded the fixed-width name budget.
    MaterialTagTruncated { tag: String, stored_name: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MaterialTagTruncated { tag, stored_name } => write!(
                f,
                "material tag {tag:?} exceeds the 28-byte budget and was truncated; \
                 the stored group name is {stored_name:?}"
            ),
        }
    }
}

/// Progress of one export call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Uninitialized,
    Validated,
    TopologyBuilt,
    Encoded,
    Written,
    Failed,
}

/// Per-call session state: configuration, warnings, progress.
#[derive(Debug)]
pub struct ExportSession {
    config: ExportConfig,
    warnings: Vec<Warning>,
    stage: ExportStage,
}

impl ExportSession {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            warnings: Vec::new(),
            stage: ExportStage::Uninitialized,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn stage(&self) -> ExportStage {
        self.stage
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub(crate) fn warn(&mut self, warning: Warning) {
        warn!(%warning);
        self.warnings.push(warning);
    }

    fn advance(&mut self, stage: ExportStage) {
        debug!(?stage, "export stage");
        self.stage = stage;
    }
}

/// Outcome of a successful export.
#[derive(Debug)]
pub struct ExportOutcome {
    /// The published artifact.
    pub path: PathBuf,
    /// Non-fatal conditions, e.g. truncated material tags.
    pub warnings: Vec<Warning>,
}

/// Exports a tessellation to a container artifact at `path`.
///
/// `volumes` carries the per-volume, per-face triangles in caller order;
/// `material_tags` must hold exactly one tag per volume, in the same order.
/// Missing parent directories of `path` are created.
///
/// # Errors
///
/// [`Error::InputShape`] on a tag/volume count mismatch,
/// [`Error::BackendUnavailable`] when the configured backend was compiled
/// out, [`Error::Topology`] for non-manifold faces, empty volumes, or
/// out-of-range vertex indices, and [`Error::Io`] when the destination
/// cannot be written. No artifact exists at `path` after any error.
pub fn export(
    vertices: Vec<Point3<f64>>,
    volumes: &[VolumeMesh],
    material_tags: &[String],
    path: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportOutcome> {
    let mut session = ExportSession::new(config.clone());
    run(vertices, volumes, material_tags, path.as_ref(), &mut session).map_err(|error| {
        session.advance(ExportStage::Failed);
        error
    })
}

fn run(
    vertices: Vec<Point3<f64>>,
    volumes: &[VolumeMesh],
    material_tags: &[String],
    path: &Path,
    session: &mut ExportSession,
) -> Result<ExportOutcome> {
    if material_tags.len() != volumes.len() {
        return Err(Error::InputShape {
            volumes: volumes.len(),
            material_tags: material_tags.len(),
        });
    }
    // Resolve the encoder up front so a compiled-out backend fails before
    // any topology work.
    let encoder = encoder_for(session.config().backend)?;
    session.advance(ExportStage::Validated);

    let mut builder = TopologyBuilder::new(vertices);
    for (mesh, tag) in volumes.iter().zip(material_tags) {
        let volume = builder.add_volume(mesh.volume_id, tag.clone());
        for face in &mesh.faces {
            builder.add_face(volume, face.face_id, &face.triangles)?;
        }
    }
    let model = builder.finish()?;
    session.advance(ExportStage::TopologyBuilt);

    let complement = session.config().implicit_complement_material_tag.clone();
    let container = SetHierarchyEncoder::new(&model, complement.as_deref()).encode(session);
    let bytes = encoder.encode(&container)?;
    session.advance(ExportStage::Encoded);

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)?;
            parent
        }
        _ => Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    staged.write_all(&bytes)?;
    staged.persist(path).map_err(|error| Error::Io(error.error))?;
    session.advance(ExportStage::Written);

    info!(
        path = %path.display(),
        backend = %session.config().backend,
        sets = container.set_count(),
        "wrote container"
    );

    Ok(ExportOutcome {
        path: path.to_path_buf(),
        warnings: session.warnings().to_vec(),
    })
}
