//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

#[derive(Debug)]
pub enum Error {
    Syntax(String),
    UnsupportedFunction(String),
}

impl Error {
    pub fn log(&self) {
        match self {
            Error::Syntax(detail) => warn!(%detail, "{}", self),
            Error::UnsupportedFunction(name) => warn!(%name, "{}", self),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Syntax(_) => write!(f, "xpath syntax error"),
            Error::UnsupportedFunction(_) => write!(f, "unsupported xpath function"),
        }
    }
}

impl std::error::Error for Error {}
