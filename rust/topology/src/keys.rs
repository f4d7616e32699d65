// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology key types for arena-based storage.
//!
//! Each entity gets a unique, type-safe key for O(1) lookup in the model.
//! Keys are created by `slotmap::SlotMap` and remain valid for the lifetime
//! of the model (generational indices).

use slotmap::new_key_type;

new_key_type! {
    /// Key for a volume (a solid region tagged with one material).
    pub struct VolumeKey;

    /// Key for a surface (a triangulated boundary patch owned by 1-2 volumes).
    pub struct SurfaceKey;
}
