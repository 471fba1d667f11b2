//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

#[derive(Debug)]
pub enum Error {
    /// The application's `yang_lib_for` callback returned a yang-library
    /// description this resolver could not load.
    LoadFailed { mount_path: String, detail: String },
}

impl Error {
    pub fn log(&self) {
        match self {
            Error::LoadFailed { mount_path, detail } => {
                warn!(%mount_path, %detail, "{}", self)
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::LoadFailed { .. } => write!(f, "failed to load mounted yang-library"),
        }
    }
}

impl std::error::Error for Error {}
