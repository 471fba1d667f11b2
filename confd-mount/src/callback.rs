//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use confd_tree::{NodeId, Tree};

use crate::error::Error;
use crate::types::YangLibrary;

/// `yang_lib_for(node, context) → yanglib` (spec.md §4.F). Implemented by
/// the daemon/application; invoked whenever the binder encounters a data
/// node whose spec is a mount candidate.
pub trait MountCallback {
    fn yang_lib_for(&self, tree: &Tree, node: NodeId, mount_path: &str) -> Option<YangLibrary>;
}

/// Loads the `yang3::Context` for a mount point's yang-library description.
/// Kept as a separate trait from [`MountCallback`] because loading needs
/// search-directory/embedded-module configuration that belongs to the
/// daemon, not to the resolver.
pub trait MountLoader {
    fn load(&self, yanglib: &YangLibrary) -> Result<yang3::context::Context, Error>;
}
