//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{debug, debug_span, trace, trace_span};

use crate::callback::CallbackOp;
use crate::commit::CommitPhase;

#[derive(Debug)]
pub enum Debug<'a> {
    Edit(&'a str, &'a str),
    BuiltinValidation(&'a str),
    ValidationCallback(&'a str),
    ConfigurationCallback(CommitPhase, CallbackOp, &'a str),
    CommitTransition(CommitPhase),
}

impl<'a> Debug<'a> {
    pub fn log(&self) {
        match self {
            Debug::Edit(op, path) => {
                trace_span!("engine").in_scope(|| trace!(%op, %path, "{}", self));
            }
            Debug::BuiltinValidation(root) => {
                debug_span!("engine").in_scope(|| debug!(%root, "{}", self));
            }
            Debug::ValidationCallback(path) => {
                debug_span!("engine").in_scope(|| debug!(%path, "{}", self));
            }
            Debug::ConfigurationCallback(phase, operation, path) => {
                debug_span!("engine").in_scope(|| debug!(?phase, ?operation, %path, "{}", self));
            }
            Debug::CommitTransition(phase) => {
                debug_span!("engine").in_scope(|| debug!(?phase, "{}", self));
            }
        }
    }
}

impl<'a> std::fmt::Display for Debug<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::Edit(..) => write!(f, "edit-config operation"),
            Debug::BuiltinValidation(..) => write!(f, "built-in schema validation"),
            Debug::ValidationCallback(..) => write!(f, "validation callback"),
            Debug::ConfigurationCallback(..) => write!(f, "configuration callback"),
            Debug::CommitTransition(..) => write!(f, "commit state transition"),
        }
    }
}
