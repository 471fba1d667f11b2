//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Component D: named datastores with a read cache, file persistence, lock
//! ownership, and module-state reconciliation (spec.md §4.D).

pub mod datastore;
pub mod defaults;
pub mod error;
pub mod format;
pub mod lock;
pub mod module_state;
pub mod store;

pub use datastore::Datastore;
pub use defaults::DefaultsMode;
pub use error::Error;
pub use format::FileFormat;
pub use lock::LockRegistry;
pub use module_state::{diff_module_state, ModuleChangeKind, ModuleStateChange, ModuleStateEntry};
pub use store::{DatastoreStore, ReadResult};
