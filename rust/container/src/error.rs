// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for container encoding and export.

use crate::encode::Backend;

/// Result type alias for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding, writing, or reading a container.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The material tag list does not line up with the volume list.
    #[error(
        "{material_tags} material tags were provided for {volumes} volumes; supply exactly one tag per volume"
    )]
    InputShape { volumes: usize, material_tags: usize },

    /// The tessellation violated a topology invariant.
    #[error(transparent)]
    Topology(#[from] dagmc_lite_topology::Error),

    /// The selected backend was not compiled into this build. The
    /// remediation text names the alternative so callers can switch
    /// programmatically.
    #[error("the {backend} backend is not available: {remediation}")]
    BackendUnavailable {
        backend: Backend,
        remediation: String,
    },

    /// The destination could not be created or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the container document failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The artifact being read is not a valid container.
    #[error("malformed container: {0}")]
    Malformed(String),
}
