//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

#[derive(Debug)]
pub enum Error {
    /// No schema node resolves for the given canonical data path.
    SchemaNotFound(String),
    /// A module lookup (`find_module_by_prefix`/`find_module_by_namespace_revision`)
    /// found nothing.
    ModuleNotFound(String),
    /// `resolve_type` was asked to resolve a non-leaf statement.
    NotALeaf(String),
}

impl Error {
    pub fn log(&self) {
        match self {
            Error::SchemaNotFound(path) => warn!(%path, "{}", self),
            Error::ModuleNotFound(name) => warn!(%name, "{}", self),
            Error::NotALeaf(path) => warn!(%path, "{}", self),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::SchemaNotFound(_) => write!(f, "no schema node at given path"),
            Error::ModuleNotFound(_) => write!(f, "module not found"),
            Error::NotALeaf(_) => write!(f, "statement is not a leaf or leaf-list"),
        }
    }
}

impl std::error::Error for Error {}
