//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

#[derive(Debug)]
pub enum Error {
    YangContextInit(yang3::Error),
    Datastore(confd_datastore::Error),
}

impl Error {
    pub fn log(&self) {
        match self {
            Error::YangContextInit(e) => warn!(%e, "failed to initialize YANG context"),
            Error::Datastore(e) => e.log(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::YangContextInit(_) => write!(f, "YANG context initialization failed"),
            Error::Datastore(_) => write!(f, "datastore operation failed"),
        }
    }
}

impl std::error::Error for Error {}

impl From<yang3::Error> for Error {
    fn from(e: yang3::Error) -> Self {
        Error::YangContextInit(e)
    }
}

impl From<confd_datastore::Error> for Error {
    fn from(e: confd_datastore::Error) -> Self {
        Error::Datastore(e)
    }
}
