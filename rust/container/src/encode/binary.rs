// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compact little-endian binary backend.
//!
//! Layout (all integers little-endian):
//! - 8 bytes: magic `b"DAGMCLC\0"`
//! - 4 bytes: u32 format version
//! - producer string: u16 length + bytes
//! - handle anchors: vertex_start, triangle_start, set_start, file_set (4 x u64)
//! - vertices: u64 count, then 3 x f64 per vertex
//! - triangles: u64 count, then 3 x u32 per triangle
//! - sets: u64 count, then per set:
//!   - handle (u64)
//!   - contents kind (u8): 0 = handle list (u64 count + handles),
//!     1 = range (u64 start + u64 count)
//!   - children: u64 count + handles
//!   - parents: u64 count + handles
//! - tag directory: u8 tag count, then per catalogue entry a u16-length
//!   name followed by its payload:
//!   - `CATEGORY`: sparse, u64 row count + ids, then 32-byte padded values
//!   - `GEOM_DIMENSION`: dense, one i32 per set handle, `-1` for untagged
//!   - `GLOBAL_ID`: sparse, u64 row count + ids, then i32 values
//!   - `NAME`: sparse, u64 row count + ids, then 32-byte padded values
//!   - `GEOM_SENSE_2`: sparse, u64 row count + ids, then 2 x u64 values
//!
//! The dense `GEOM_DIMENSION` array is the one place the physical layout
//! diverges from the logical sparse table; decoding drops the `-1` defaults
//! to reconstruct the identical logical mapping.

use crate::container::{Container, EntitySet, Handle, SetContents, TagTables};
use crate::encode::{Backend, Encoder, BINARY_MAGIC};
use crate::error::{Error, Result};
use crate::tags::{self, Category, TagStorage, CATALOGUE, OPAQUE_TAG_SIZE};
use dagmc_lite_topology::Triangle;

/// Current binary format version.
pub const BINARY_FORMAT_VERSION: u32 = 1;

/// Default value marking untagged slots in the dense GEOM_DIMENSION array.
const GEOM_DIMENSION_DEFAULT: i32 = -1;

/// The binary backend.
pub struct BinaryEncoder;

impl Encoder for BinaryEncoder {
    fn backend(&self) -> Backend {
        Backend::Binary
    }

    fn encode(&self, container: &Container) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.extend_from_slice(BINARY_MAGIC);
        put_u32(&mut buf, BINARY_FORMAT_VERSION);
        put_str(&mut buf, &container.producer);

        put_u64(&mut buf, container.vertex_start);
        put_u64(&mut buf, container.triangle_start);
        put_u64(&mut buf, container.set_start);
        put_u64(&mut buf, container.file_set);

        put_u64(&mut buf, container.vertices.len() as u64);
        for vertex in &container.vertices {
            for coordinate in vertex {
                buf.extend_from_slice(&coordinate.to_le_bytes());
            }
        }

        put_u64(&mut buf, container.triangles.len() as u64);
        for triangle in &container.triangles {
            for index in triangle.indices() {
                put_u32(&mut buf, index);
            }
        }

        put_u64(&mut buf, container.sets.len() as u64);
        for set in &container.sets {
            put_u64(&mut buf, set.handle);
            match &set.contents {
                SetContents::Handles(handles) => {
                    buf.push(0);
                    put_handles(&mut buf, handles);
                }
                SetContents::Range { start, count } => {
                    buf.push(1);
                    put_u64(&mut buf, *start);
                    put_u64(&mut buf, *count);
                }
            }
            put_handles(&mut buf, &set.children);
            put_handles(&mut buf, &set.parents);
        }

        buf.push(CATALOGUE.len() as u8);
        for definition in &CATALOGUE {
            put_str(&mut buf, definition.name);
            match (definition.name, definition.storage) {
                (tags::CATEGORY_TAG_NAME, _) => {
                    put_u64(&mut buf, container.tags.category.len() as u64);
                    for &id in &container.tags.category.ids {
                        put_u64(&mut buf, id);
                    }
                    for value in &container.tags.category.values {
                        put_opaque(&mut buf, value.as_str());
                    }
                }
                (tags::GEOM_DIMENSION_TAG_NAME, TagStorage::Dense) => {
                    for offset in 0..container.sets.len() as Handle {
                        let handle = container.set_start + offset;
                        let value = container
                            .tags
                            .geom_dimension
                            .get(handle)
                            .copied()
                            .unwrap_or(GEOM_DIMENSION_DEFAULT);
                        put_i32(&mut buf, value);
                    }
                }
                (tags::GLOBAL_ID_TAG_NAME, _) => {
                    put_u64(&mut buf, container.tags.global_id.len() as u64);
                    for &id in &container.tags.global_id.ids {
                        put_u64(&mut buf, id);
                    }
                    for &value in &container.tags.global_id.values {
                        put_i32(&mut buf, value);
                    }
                }
                (tags::NAME_TAG_NAME, _) => {
                    put_u64(&mut buf, container.tags.name.len() as u64);
                    for &id in &container.tags.name.ids {
                        put_u64(&mut buf, id);
                    }
                    for value in &container.tags.name.values {
                        put_opaque(&mut buf, value);
                    }
                }
                (tags::SENSE_TAG_NAME, _) => {
                    put_u64(&mut buf, container.tags.sense.len() as u64);
                    for &id in &container.tags.sense.ids {
                        put_u64(&mut buf, id);
                    }
                    for pair in &container.tags.sense.values {
                        put_u64(&mut buf, pair[0]);
                        put_u64(&mut buf, pair[1]);
                    }
                }
                (name, _) => {
                    return Err(Error::Serialization(format!(
                        "no binary layout for tag {name}"
                    )));
                }
            }
        }

        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Container> {
        let mut reader = Reader::new(bytes);

        let magic = reader.take(BINARY_MAGIC.len())?;
        if magic != BINARY_MAGIC {
            return Err(Error::Malformed("bad magic".into()));
        }
        let version = reader.u32()?;
        if version > BINARY_FORMAT_VERSION {
            return Err(Error::Malformed(format!(
                "binary version {version} is newer than supported version {BINARY_FORMAT_VERSION}"
            )));
        }
        let producer = reader.string()?;

        let vertex_start = reader.u64()?;
        let triangle_start = reader.u64()?;
        let set_start = reader.u64()?;
        let file_set = reader.u64()?;

        let vertex_count = reader.u64()? as usize;
        let mut vertices = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            vertices.push([reader.f64()?, reader.f64()?, reader.f64()?]);
        }

        let triangle_count = reader.u64()? as usize;
        let mut triangles = Vec::with_capacity(triangle_count);
        for _ in 0..triangle_count {
            triangles.push(Triangle::new(reader.u32()?, reader.u32()?, reader.u32()?));
        }

        let set_count = reader.u64()? as usize;
        let mut sets = Vec::with_capacity(set_count);
        for _ in 0..set_count {
            let handle = reader.u64()?;
            let contents = match reader.u8()? {
                0 => SetContents::Handles(reader.handles()?),
                1 => SetContents::Range {
                    start: reader.u64()?,
                    count: reader.u64()?,
                },
                kind => {
                    return Err(Error::Malformed(format!(
                        "unknown set contents kind {kind}"
                    )))
                }
            };
            let children = reader.handles()?;
            let parents = reader.handles()?;
            sets.push(EntitySet {
                handle,
                contents,
                children,
                parents,
            });
        }

        let tag_count = reader.u8()? as usize;
        if tag_count != CATALOGUE.len() {
            return Err(Error::Malformed(format!(
                "expected {} tag sections, found {tag_count}",
                CATALOGUE.len()
            )));
        }
        let mut tag_tables = TagTables::default();
        for definition in &CATALOGUE {
            let name = reader.string()?;
            if name != definition.name {
                return Err(Error::Malformed(format!(
                    "expected tag section {:?}, found {name:?}",
                    definition.name
                )));
            }
            match (definition.name, definition.storage) {
                (tags::CATEGORY_TAG_NAME, _) => {
                    let rows = reader.u64()? as usize;
                    let ids = reader.id_column(rows)?;
                    for id in ids {
                        let value = reader.opaque()?;
                        let category = Category::parse(&value).ok_or_else(|| {
                            Error::Malformed(format!("unknown category {value:?}"))
                        })?;
                        tag_tables.category.push(id, category);
                    }
                }
                (tags::GEOM_DIMENSION_TAG_NAME, TagStorage::Dense) => {
                    for offset in 0..set_count as Handle {
                        let value = reader.i32()?;
                        if value != GEOM_DIMENSION_DEFAULT {
                            tag_tables.geom_dimension.push(set_start + offset, value);
                        }
                    }
                }
                (tags::GLOBAL_ID_TAG_NAME, _) => {
                    let rows = reader.u64()? as usize;
                    let ids = reader.id_column(rows)?;
                    for id in ids {
                        tag_tables.global_id.push(id, reader.i32()?);
                    }
                }
                (tags::NAME_TAG_NAME, _) => {
                    let rows = reader.u64()? as usize;
                    let ids = reader.id_column(rows)?;
                    for id in ids {
                        let value = reader.opaque()?;
                        tag_tables.name.push(id, value);
                    }
                }
                (tags::SENSE_TAG_NAME, _) => {
                    let rows = reader.u64()? as usize;
                    let ids = reader.id_column(rows)?;
                    for id in ids {
                        tag_tables.sense.push(id, [reader.u64()?, reader.u64()?]);
                    }
                }
                (name, _) => {
                    return Err(Error::Malformed(format!("no binary layout for tag {name}")));
                }
            }
        }

        if !reader.is_exhausted() {
            return Err(Error::Malformed(format!(
                "{} trailing bytes after container data",
                reader.remaining()
            )));
        }

        Ok(Container {
            producer,
            vertices,
            triangles,
            sets,
            tags: tag_tables,
            vertex_start,
            triangle_start,
            set_start,
            file_set,
        })
    }
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_str(buf: &mut Vec<u8>, value: &str) {
    put_u16(buf, value.len() as u16);
    buf.extend_from_slice(value.as_bytes());
}

fn put_handles(buf: &mut Vec<u8>, handles: &[Handle]) {
    put_u64(buf, handles.len() as u64);
    for &handle in handles {
        put_u64(buf, handle);
    }
}

/// Writes a fixed-width opaque value, zero-padded to [`OPAQUE_TAG_SIZE`].
/// The tag catalogue guarantees stored values fit the width.
fn put_opaque(buf: &mut Vec<u8>, value: &str) {
    debug_assert!(value.len() <= OPAQUE_TAG_SIZE);
    let bytes = value.as_bytes();
    let used = bytes.len().min(OPAQUE_TAG_SIZE);
    buf.extend_from_slice(&bytes[..used]);
    buf.extend(std::iter::repeat(0u8).take(OPAQUE_TAG_SIZE - used));
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).filter(|&end| end <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(Error::Malformed(format!(
                "unexpected end of data at byte {}",
                self.pos
            ))),
        }
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    fn f64(&mut self) -> Result<f64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_le_bytes(raw))
    }

    fn string(&mut self) -> Result<String> {
        let len = self.u16()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::Malformed("string field is not valid UTF-8".into()))
    }

    /// Reads a fixed-width opaque value, trimming the zero padding.
    fn opaque(&mut self) -> Result<String> {
        let bytes = self.take(OPAQUE_TAG_SIZE)?;
        let used = bytes.iter().position(|&b| b == 0).unwrap_or(OPAQUE_TAG_SIZE);
        String::from_utf8(bytes[..used].to_vec())
            .map_err(|_| Error::Malformed("opaque tag value is not valid UTF-8".into()))
    }

    fn handles(&mut self) -> Result<Vec<Handle>> {
        let count = self.u64()? as usize;
        self.id_column(count)
    }

    fn id_column(&mut self, count: usize) -> Result<Vec<Handle>> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(self.u64()?);
        }
        Ok(ids)
    }

    fn is_exhausted(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::SparseTag;

    fn sample_container() -> Container {
        let mut tags = TagTables::default();
        tags.category.push(5, Category::Surface);
        tags.geom_dimension.push(5, 2);
        tags.global_id.push(5, 7);
        tags.sense.push(5, [6, 0]);
        tags.category.push(6, Category::Volume);
        tags.geom_dimension.push(6, 3);
        tags.global_id.push(6, 1);
        tags.category.push(7, Category::Group);
        tags.global_id.push(7, 1);
        tags.name.push(7, "mat:steel".to_string());

        Container {
            producer: "dagmc-lite test".to_string(),
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.5, 0.0], [0.0, 1.0, -2.5]],
            triangles: vec![Triangle::new(0, 1, 2)],
            sets: vec![
                EntitySet {
                    handle: 5,
                    contents: SetContents::Handles(vec![1, 2, 3, 4]),
                    children: Vec::new(),
                    parents: vec![6],
                },
                EntitySet {
                    handle: 6,
                    contents: SetContents::Handles(Vec::new()),
                    children: vec![5],
                    parents: Vec::new(),
                },
                EntitySet {
                    handle: 7,
                    contents: SetContents::Handles(vec![6]),
                    children: Vec::new(),
                    parents: Vec::new(),
                },
                EntitySet {
                    handle: 8,
                    contents: SetContents::Range { start: 1, count: 7 },
                    children: Vec::new(),
                    parents: Vec::new(),
                },
            ],
            tags,
            vertex_start: 1,
            triangle_start: 4,
            set_start: 5,
            file_set: 8,
        }
    }

    #[test]
    fn round_trip_preserves_the_document() {
        let container = sample_container();
        let encoder = BinaryEncoder;
        let bytes = encoder.encode(&container).unwrap();
        let decoded = encoder.decode(&bytes).unwrap();
        assert_eq!(decoded, container);
    }

    #[test]
    fn artifact_starts_with_magic_and_version() {
        let bytes = BinaryEncoder.encode(&sample_container()).unwrap();
        assert!(bytes.starts_with(BINARY_MAGIC));
        let version = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        assert_eq!(version, BINARY_FORMAT_VERSION);
    }

    #[test]
    fn dense_dimension_column_drops_defaults_on_decode() {
        let container = sample_container();
        let bytes = BinaryEncoder.encode(&container).unwrap();
        let decoded = BinaryEncoder.decode(&bytes).unwrap();

        // The group set (handle 7) and file set (handle 8) are untagged in
        // the logical table even though the dense column has slots for them.
        let expected = SparseTag {
            ids: vec![5, 6],
            values: vec![2, 3],
        };
        assert_eq!(decoded.tags.geom_dimension, expected);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = BinaryEncoder.encode(&sample_container()).unwrap();
        bytes[0] = b'X';
        let error = BinaryEncoder.decode(&bytes).unwrap_err();
        match error {
            Error::Malformed(message) => assert!(message.contains("magic")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn truncated_artifact_is_rejected() {
        let bytes = BinaryEncoder.encode(&sample_container()).unwrap();
        let error = BinaryEncoder.decode(&bytes[..bytes.len() - 9]).unwrap_err();
        assert!(matches!(error, Error::Malformed(_)));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = BinaryEncoder.encode(&sample_container()).unwrap();
        bytes.push(0);
        let error = BinaryEncoder.decode(&bytes).unwrap_err();
        match error {
            Error::Malformed(message) => assert!(message.contains("trailing")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
