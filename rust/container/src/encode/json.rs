// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Versioned JSON document backend.
//!
//! The container is wrapped in an envelope carrying a format identifier and
//! a version number, so readers can reject foreign documents and files
//! written by a newer format revision with a useful message instead of a
//! deserialization error.

use serde::{Deserialize, Serialize};

use crate::container::Container;
use crate::encode::{Backend, Encoder};
use crate::error::{Error, Result};

/// Format identifier of the JSON envelope.
pub const JSON_FORMAT: &str = "dagmc-lite-container";

/// Current JSON document version.
pub const JSON_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct DocumentRef<'a> {
    format: &'static str,
    version: u32,
    container: &'a Container,
}

#[derive(Deserialize)]
struct Document {
    format: String,
    version: u32,
    container: Container,
}

/// The JSON backend.
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn backend(&self) -> Backend {
        Backend::Json
    }

    fn encode(&self, container: &Container) -> Result<Vec<u8>> {
        let document = DocumentRef {
            format: JSON_FORMAT,
            version: JSON_FORMAT_VERSION,
            container,
        };
        serde_json::to_vec_pretty(&document).map_err(|error| Error::Serialization(error.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Container> {
        let document: Document = serde_json::from_slice(bytes)
            .map_err(|error| Error::Malformed(error.to_string()))?;
        if document.format != JSON_FORMAT {
            return Err(Error::Malformed(format!(
                "unknown document format {:?}",
                document.format
            )));
        }
        if document.version > JSON_FORMAT_VERSION {
            return Err(Error::Malformed(format!(
                "document version {} is newer than supported version {JSON_FORMAT_VERSION}",
                document.version
            )));
        }
        Ok(document.container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{EntitySet, SetContents, TagTables};
    use crate::tags::Category;
    use dagmc_lite_topology::Triangle;

    fn sample_container() -> Container {
        let mut tags = TagTables::default();
        tags.category.push(3, Category::Surface);
        tags.geom_dimension.push(3, 2);
        tags.global_id.push(3, 1);
        tags.sense.push(3, [4, 0]);
        tags.category.push(4, Category::Volume);
        tags.geom_dimension.push(4, 3);
        tags.global_id.push(4, 1);

        Container {
            producer: "dagmc-lite test".to_string(),
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            triangles: vec![Triangle::new(0, 1, 2)],
            sets: vec![
                EntitySet {
                    handle: 3,
                    contents: SetContents::Handles(vec![1, 2]),
                    children: Vec::new(),
                    parents: vec![4],
                },
                EntitySet {
                    handle: 4,
                    contents: SetContents::Handles(Vec::new()),
                    children: vec![3],
                    parents: Vec::new(),
                },
                EntitySet {
                    handle: 5,
                    contents: SetContents::Range { start: 1, count: 4 },
                    children: Vec::new(),
                    parents: Vec::new(),
                },
            ],
            tags,
            vertex_start: 1,
            triangle_start: 2,
            set_start: 3,
            file_set: 5,
        }
    }

    #[test]
    fn round_trip_preserves_the_document() {
        let container = sample_container();
        let encoder = JsonEncoder;
        let bytes = encoder.encode(&container).unwrap();
        let decoded = encoder.decode(&bytes).unwrap();
        assert_eq!(decoded, container);
    }

    #[test]
    fn foreign_format_is_rejected() {
        let container = sample_container();
        let bytes = JsonEncoder.encode(&container).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["format"] = serde_json::json!("something-else");
        let bytes = serde_json::to_vec(&value).unwrap();

        let error = JsonEncoder.decode(&bytes).unwrap_err();
        match error {
            Error::Malformed(message) => assert!(message.contains("something-else")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn future_version_is_rejected() {
        let container = sample_container();
        let bytes = JsonEncoder.encode(&container).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["version"] = serde_json::json!(99);
        let bytes = serde_json::to_vec(&value).unwrap();

        let error = JsonEncoder.decode(&bytes).unwrap_err();
        match error {
            Error::Malformed(message) => assert!(message.contains("newer")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
