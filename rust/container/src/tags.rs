// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The tag catalogue.
//!
//! Every entity set in the container carries a fixed set of semantic tags:
//! a category string, an optional geometric dimension, a user-facing global
//! id, a fixed-width name (groups only), and a sense pair (surfaces only).
//! This module defines the tag names, widths, and declared storage
//! disciplines, plus the `mat:` name formatting with its truncation rule.
//!
//! A material tag has a 28-byte budget: the NAME tag is stored as a 32-byte
//! opaque value and the `mat:` prefix consumes 4 of those bytes. Over-budget
//! tags are truncated with a warning rather than rejected, matching what
//! established readers of this set hierarchy expect.

use serde::{Deserialize, Serialize};

/// Tag carrying each set's category string.
pub const CATEGORY_TAG_NAME: &str = "CATEGORY";
/// Tag carrying the geometric dimension of volume and surface sets.
pub const GEOM_DIMENSION_TAG_NAME: &str = "GEOM_DIMENSION";
/// Tag carrying the user-facing surface/volume/group id.
pub const GLOBAL_ID_TAG_NAME: &str = "GLOBAL_ID";
/// Tag carrying group names.
pub const NAME_TAG_NAME: &str = "NAME";
/// Tag carrying the two volume-set handles a surface separates.
pub const SENSE_TAG_NAME: &str = "GEOM_SENSE_2";

/// Fixed width of the two opaque string tags (CATEGORY and NAME).
pub const OPAQUE_TAG_SIZE: usize = 32;
/// Prefix of every material group name.
pub const MATERIAL_NAME_PREFIX: &str = "mat:";
/// Suffix marking the implicit complement group.
pub const COMPLEMENT_NAME_SUFFIX: &str = "_comp";
/// Longest material tag that survives the fixed-width NAME encoding intact.
pub const MAX_MATERIAL_TAG_BYTES: usize = OPAQUE_TAG_SIZE - MATERIAL_NAME_PREFIX.len();

/// The category of an entity set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Volume,
    Surface,
    Group,
}

impl Category {
    /// The category string stored in the CATEGORY tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Volume => "Volume",
            Category::Surface => "Surface",
            Category::Group => "Group",
        }
    }

    /// Parses a stored category string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Volume" => Some(Category::Volume),
            "Surface" => Some(Category::Surface),
            "Group" => Some(Category::Group),
            _ => None,
        }
    }

    /// The geometric dimension tagged onto sets of this category. Group
    /// sets carry none; that is the one convention this format commits to
    /// where its ancestors were inconsistent.
    pub fn geom_dimension(&self) -> Option<i32> {
        match self {
            Category::Volume => Some(3),
            Category::Surface => Some(2),
            Category::Group => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value type of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDataType {
    /// 32-bit signed integer.
    Int,
    /// Fixed-width opaque bytes of [`OPAQUE_TAG_SIZE`].
    Opaque,
    /// A pair of unsigned entity handles.
    HandlePair,
}

/// How an encoder lays out a tag's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStorage {
    /// Explicit (handle, value) rows for tagged sets only.
    Sparse,
    /// One slot per set handle, default-filled for untagged sets.
    Dense,
}

/// One entry of the tag catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagDef {
    pub name: &'static str,
    pub data_type: TagDataType,
    pub storage: TagStorage,
}

/// Every tag the container format defines, in encoding order. Encoders
/// emit their tag directories in this order and readers validate against
/// it; the logical (entity, tag) -> value mapping is identical either way.
pub const CATALOGUE: [TagDef; 5] = [
    TagDef {
        name: CATEGORY_TAG_NAME,
        data_type: TagDataType::Opaque,
        storage: TagStorage::Sparse,
    },
    TagDef {
        name: GEOM_DIMENSION_TAG_NAME,
        data_type: TagDataType::Int,
        storage: TagStorage::Dense,
    },
    TagDef {
        name: GLOBAL_ID_TAG_NAME,
        data_type: TagDataType::Int,
        storage: TagStorage::Sparse,
    },
    TagDef {
        name: NAME_TAG_NAME,
        data_type: TagDataType::Opaque,
        storage: TagStorage::Sparse,
    },
    TagDef {
        name: SENSE_TAG_NAME,
        data_type: TagDataType::HandlePair,
        storage: TagStorage::Sparse,
    },
];

/// Truncates a material tag to `budget` bytes without splitting a UTF-8
/// character.
fn truncate_tag(tag: &str, budget: usize) -> &str {
    if tag.len() <= budget {
        return tag;
    }
    let mut end = budget;
    while !tag.is_char_boundary(end) {
        end -= 1;
    }
    &tag[..end]
}

/// Formats the `mat:<tag>` group name, truncating the tag to its 28-byte
/// budget. Returns the name and whether truncation occurred.
pub fn material_group_name(tag: &str) -> (String, bool) {
    let stored = truncate_tag(tag, MAX_MATERIAL_TAG_BYTES);
    (
        format!("{MATERIAL_NAME_PREFIX}{stored}"),
        stored.len() != tag.len(),
    )
}

/// Formats the `mat:<tag>_comp` implicit complement name.
///
/// The tag budget shrinks by the suffix length so the `_comp` marker always
/// survives the fixed-width encoding; readers rely on the suffix to tell the
/// complement apart from an ordinary material group.
pub fn complement_group_name(tag: &str) -> (String, bool) {
    let budget = MAX_MATERIAL_TAG_BYTES - COMPLEMENT_NAME_SUFFIX.len();
    let stored = truncate_tag(tag, budget);
    (
        format!("{MATERIAL_NAME_PREFIX}{stored}{COMPLEMENT_NAME_SUFFIX}"),
        stored.len() != tag.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_28_bytes() {
        assert_eq!(MAX_MATERIAL_TAG_BYTES, 28);
    }

    #[test]
    fn short_tag_passes_through() {
        let (name, truncated) = material_group_name("steel");
        assert_eq!(name, "mat:steel");
        assert!(!truncated);
    }

    #[test]
    fn over_budget_tag_is_truncated() {
        let tag = "a".repeat(29);
        let (name, truncated) = material_group_name(&tag);
        assert_eq!(name, format!("mat:{}", "a".repeat(28)));
        assert!(truncated);
        assert_eq!(name.len(), OPAQUE_TAG_SIZE);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 27 ASCII bytes followed by a 2-byte character straddling the cut
        let tag = format!("{}é", "a".repeat(27));
        assert_eq!(tag.len(), 29);
        let (name, truncated) = material_group_name(&tag);
        assert!(truncated);
        assert_eq!(name, format!("mat:{}", "a".repeat(27)));
    }

    #[test]
    fn complement_name_keeps_suffix() {
        let (name, truncated) = complement_group_name("air");
        assert_eq!(name, "mat:air_comp");
        assert!(!truncated);

        let tag = "a".repeat(40);
        let (name, truncated) = complement_group_name(&tag);
        assert!(truncated);
        assert!(name.ends_with(COMPLEMENT_NAME_SUFFIX));
        assert!(name.len() <= OPAQUE_TAG_SIZE);
    }

    #[test]
    fn group_sets_carry_no_dimension() {
        assert_eq!(Category::Volume.geom_dimension(), Some(3));
        assert_eq!(Category::Surface.geom_dimension(), Some(2));
        assert_eq!(Category::Group.geom_dimension(), None);
    }

    #[test]
    fn category_round_trips_through_strings() {
        for category in [Category::Volume, Category::Surface, Category::Group] {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse("Vertex"), None);
    }
}
