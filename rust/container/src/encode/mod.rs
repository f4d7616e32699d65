// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Container encoders.
//!
//! One [`Encoder`] trait, two conformant implementations. The JSON backend
//! is always compiled; the compact binary backend sits behind the `binary`
//! cargo feature (on by default). Both serialize the same logical
//! [`Container`]: an artifact written by one backend and read back yields
//! the identical document, whichever bytes were on disk.
//!
//! Selection is explicit configuration, never type inspection: callers put
//! a [`Backend`] value in their export config and [`encoder_for`] resolves
//! it, failing with a distinct error when the backend was compiled out so
//! callers can switch programmatically.

#[cfg(feature = "binary")]
pub mod binary;
pub mod json;

use crate::container::Container;
use crate::error::{Error, Result};

/// Leading bytes of a binary container artifact. Lives here, outside the
/// feature gate, so readers can still recognize (and report) binary
/// artifacts in JSON-only builds.
pub const BINARY_MAGIC: &[u8; 8] = b"DAGMCLC\0";

/// The physical encodings of the logical container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Compact little-endian sections (feature `binary`).
    Binary,
    /// Versioned JSON document.
    Json,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Binary => "binary",
            Backend::Json => "json",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical encoding of the logical container.
pub trait Encoder {
    /// The backend this encoder implements.
    fn backend(&self) -> Backend;

    /// Serializes the container to its byte representation.
    fn encode(&self, container: &Container) -> Result<Vec<u8>>;

    /// Reconstructs the logical container from its byte representation.
    fn decode(&self, bytes: &[u8]) -> Result<Container>;
}

/// Resolves the encoder for `backend`.
///
/// Returns [`Error::BackendUnavailable`] when the backend was compiled out;
/// the remediation text names the alternative.
pub fn encoder_for(backend: Backend) -> Result<Box<dyn Encoder>> {
    match backend {
        Backend::Json => Ok(Box::new(json::JsonEncoder)),
        #[cfg(feature = "binary")]
        Backend::Binary => Ok(Box::new(binary::BinaryEncoder)),
        #[cfg(not(feature = "binary"))]
        Backend::Binary => Err(Error::BackendUnavailable {
            backend,
            remediation: "rebuild dagmc-lite-container with the `binary` feature enabled, \
                          or select Backend::Json"
                .into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_backend_is_always_available() {
        let encoder = encoder_for(Backend::Json).unwrap();
        assert_eq!(encoder.backend(), Backend::Json);
    }

    #[cfg(feature = "binary")]
    #[test]
    fn binary_backend_resolves_when_compiled_in() {
        let encoder = encoder_for(Backend::Binary).unwrap();
        assert_eq!(encoder.backend(), Backend::Binary);
    }

    #[cfg(not(feature = "binary"))]
    #[test]
    fn binary_backend_reports_the_alternative() {
        let error = encoder_for(Backend::Binary).unwrap_err();
        match error {
            Error::BackendUnavailable { remediation, .. } => {
                assert!(remediation.contains("Backend::Json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
