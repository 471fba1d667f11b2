//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use bitflags::bitflags;

bitflags! {
    /// Per-node flag mask (spec.md §3, "Tree node"). Transaction diffing
    /// sets ADD/DEL/CHANGE; MARK is scratch space for the mark-and-sweep
    /// cache-projection strategy (spec.md §4.D); DEFAULT records whether a
    /// leaf's value was materialised from a YANG default; TOP marks a
    /// datastore root; MOUNT_POINT marks a node whose YANG spec has an
    /// attached schema-mount binding.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct NodeFlags: u16 {
        const ADD         = 0b0000_0001;
        const DEL         = 0b0000_0010;
        const CHANGE      = 0b0000_0100;
        const MARK        = 0b0000_1000;
        const DEFAULT     = 0b0001_0000;
        const TOP         = 0b0010_0000;
        const MOUNT_POINT = 0b0100_0000;
    }
}

impl NodeFlags {
    /// Flags preserved by `deep_copy`; MARK is transient cache-sweep scratch
    /// state and must never survive a copy (spec.md §4.A, `copy`/`deep_copy`).
    pub fn copy_mask(self) -> NodeFlags {
        self & !NodeFlags::MARK
    }
}
