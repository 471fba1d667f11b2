//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

#[derive(Debug)]
pub enum Error {
    /// A list/leaf-list insert collided with an existing key tuple, or two
    /// same-named elements were inserted under a container that isn't a
    /// leaf-list (spec.md §4.A edge cases).
    DataInvalid(String),
    NodeNotFound,
}

impl Error {
    pub fn log(&self) {
        match self {
            Error::DataInvalid(detail) => warn!(%detail, "{}", self),
            Error::NodeNotFound => warn!("{}", self),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DataInvalid(_) => write!(f, "invalid tree mutation"),
            Error::NodeNotFound => write!(f, "node not found in tree"),
        }
    }
}

impl std::error::Error for Error {}
