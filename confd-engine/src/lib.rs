//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Component E: edit-config application and the two-phase candidate→running
//! commit pipeline (spec.md §4.E), plus the client-facing request shapes
//! component F's callers and `confd-daemon` dispatch against (spec.md §6).

pub mod api;
pub mod builtin;
pub mod callback;
pub mod commit;
pub mod debug;
pub mod edit;
pub mod engine;
pub mod error;

pub use callback::{
    CallbackArgs, CallbackKey, CallbackOp, Callbacks, CallbacksBuilder, CallbacksNode, Provider, ValidationCallback,
    ValidationCallbacks,
};
pub use commit::{commit as apply_commit, prepare_commit, validate, CommitPhase, CommitState, Transaction};
pub use edit::{edit, EditOp};
pub use engine::{new_patch, Engine};
pub use error::Error;
