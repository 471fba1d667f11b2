//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Component F: RFC 8528 schema-mount resolution (spec.md §4.F).

pub mod callback;
pub mod error;
pub mod registry;
pub mod types;

pub use callback::{MountCallback, MountLoader};
pub use error::Error;
pub use registry::{MountRegistry, PendingBind};
pub use types::{YangLibrary, YangLibraryModule};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use confd_tree::{NodeKind, Tree};

    use super::*;

    struct AlwaysDefer;
    impl MountCallback for AlwaysDefer {
        fn yang_lib_for(&self, _tree: &Tree, _node: confd_tree::NodeId, _mount_path: &str) -> Option<YangLibrary> {
            None
        }
    }

    struct NeverCalled;
    impl MountLoader for NeverCalled {
        fn load(&self, _yanglib: &YangLibrary) -> Result<yang3::context::Context, Error> {
            unreachable!("loader should not run when yang_lib_for returns None")
        }
    }

    #[test]
    fn unresolved_mount_defers_binding() {
        let mut tree = Tree::new();
        let node = tree.new_node(NodeKind::Element, "mounted", None);
        let registry = MountRegistry::new();

        let result = registry
            .bind(&tree, node, Arc::from("/config/mounted"), &AlwaysDefer, &NeverCalled)
            .unwrap();
        assert!(result.is_none());
        assert!(registry.mount_spec_for("/config/mounted").is_none());
        assert_eq!(registry.take_ready().len(), 0);
    }

    #[test]
    fn mount_spec_for_picks_nearest_ancestor() {
        let registry = MountRegistry::new();
        let inner_ctx = yang3::context::Context::new(yang3::context::ContextFlags::empty()).unwrap();
        registry.specs.write().unwrap().insert(
            Arc::from("/config/outer"),
            Arc::new(confd_yang::YangIndex::new(inner_ctx)),
        );

        assert!(registry.mount_spec_for("/config/outer/inner/leaf").is_some());
        assert!(registry.mount_spec_for("/config/other").is_none());
    }
}
