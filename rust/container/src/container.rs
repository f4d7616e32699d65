// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The logical container document.
//!
//! A container holds one monotonically increasing handle space covering, in
//! order: vertices, triangles, surface sets, volume sets, group sets, the
//! optional implicit complement, and finally the file set. The structures
//! here are the logical model both encoders serialize; two artifacts with
//! different byte layouts that decode to equal [`Container`] values are the
//! same container.

use serde::{Deserialize, Serialize};

use crate::tags::Category;
use dagmc_lite_topology::Triangle;

/// A unique integer identifier within one container's address space.
pub type Handle = u64;

/// The null handle, used for the free slot of a sense pair.
pub const NULL_HANDLE: Handle = 0;

/// What an entity set contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetContents {
    /// Explicit handles, one per contained entity.
    Handles(Vec<Handle>),
    /// A contiguous handle range `start..start + count`.
    Range { start: Handle, count: u64 },
}

impl SetContents {
    /// Number of contained handles.
    pub fn len(&self) -> usize {
        match self {
            SetContents::Handles(handles) => handles.len(),
            SetContents::Range { count, .. } => *count as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the contained handles.
    pub fn handles(&self) -> Box<dyn Iterator<Item = Handle> + '_> {
        match self {
            SetContents::Handles(handles) => Box::new(handles.iter().copied()),
            SetContents::Range { start, count } => Box::new(*start..*start + *count),
        }
    }

    /// `true` if `handle` is a member.
    pub fn contains(&self, handle: Handle) -> bool {
        match self {
            SetContents::Handles(handles) => handles.contains(&handle),
            SetContents::Range { start, count } => {
                handle >= *start && handle < *start + *count
            }
        }
    }
}

/// One entity set: its own handle, its contents, and its containment edges.
///
/// A surface set's parents are its 1-2 owning volume sets; a volume set's
/// children are its surface sets. Group membership travels through
/// `contents`, not through the parent/child edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    pub handle: Handle,
    pub contents: SetContents,
    pub children: Vec<Handle>,
    pub parents: Vec<Handle>,
}

/// A sparse tag table: parallel id/value rows for the tagged handles only.
///
/// Rows are kept in ascending handle order, which set creation order
/// guarantees; lookups binary-search the id column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseTag<T> {
    pub ids: Vec<Handle>,
    pub values: Vec<T>,
}

impl<T> SparseTag<T> {
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Appends a row. `id` must be greater than every id already present.
    pub fn push(&mut self, id: Handle, value: T) {
        debug_assert!(self.ids.last().map_or(true, |&last| last < id));
        self.ids.push(id);
        self.values.push(value);
    }

    /// Looks up the value tagged onto `id`.
    pub fn get(&self, id: Handle) -> Option<&T> {
        self.ids
            .binary_search(&id)
            .ok()
            .map(|index| &self.values[index])
    }

    /// Iterates (id, value) rows in ascending handle order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.ids.iter().copied().zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<T> Default for SparseTag<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The five tag tables of the catalogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagTables {
    pub category: SparseTag<Category>,
    pub geom_dimension: SparseTag<i32>,
    pub global_id: SparseTag<i32>,
    pub name: SparseTag<String>,
    pub sense: SparseTag<[Handle; 2]>,
}

/// The root aggregate written by the encoders.
///
/// Vertices occupy handles `vertex_start..`, triangles
/// `triangle_start..`, and sets `set_start..=file_set`. Triangle vertex
/// indices stay 0-based; encoders write them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Tool that produced the container, e.g. `dagmc-lite 0.3.0`.
    pub producer: String,
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<Triangle>,
    /// Entity sets in ascending handle order.
    pub sets: Vec<EntitySet>,
    pub tags: TagTables,
    pub vertex_start: Handle,
    pub triangle_start: Handle,
    pub set_start: Handle,
    /// Handle of the file set enumerating everything produced.
    pub file_set: Handle,
}

impl Container {
    /// Looks up a set by handle. Sets are stored in ascending handle order.
    pub fn set_by_handle(&self, handle: Handle) -> Option<&EntitySet> {
        self.sets
            .binary_search_by_key(&handle, |set| set.handle)
            .ok()
            .map(|index| &self.sets[index])
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Sets carrying the given category tag, in handle order.
    pub fn sets_with_category(
        &self,
        category: Category,
    ) -> impl Iterator<Item = &EntitySet> + '_ {
        self.tags
            .category
            .iter()
            .filter(move |&(_, &value)| value == category)
            .filter_map(|(handle, _)| self.set_by_handle(handle))
    }
}
