//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use confd_utils::error::RpcError;
use tracing::warn;

#[derive(Debug)]
pub enum Error {
    /// `lock()` found another session already holding the lock.
    LockDenied { holder: u32 },
    /// `unlock()` called by a session that isn't the holder.
    AccessDenied,
    NotFound(String),
    Io(String),
    Parse(String),
}

impl Error {
    pub fn log(&self) {
        match self {
            Error::LockDenied { holder } => warn!(%holder, "{}", self),
            Error::AccessDenied => warn!("{}", self),
            Error::NotFound(name) => warn!(%name, "{}", self),
            Error::Io(detail) => warn!(%detail, "{}", self),
            Error::Parse(detail) => warn!(%detail, "{}", self),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::LockDenied { .. } => write!(f, "datastore is locked by another session"),
            Error::AccessDenied => write!(f, "session does not hold the datastore lock"),
            Error::NotFound(_) => write!(f, "datastore not found"),
            Error::Io(_) => write!(f, "datastore file i/o failure"),
            Error::Parse(_) => write!(f, "datastore file could not be parsed"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn to_rpc_error(&self) -> RpcError {
        match self {
            Error::LockDenied { holder } => RpcError::lock_denied(&holder.to_string()),
            Error::AccessDenied => RpcError::access_denied(self.to_string()),
            Error::NotFound(name) => RpcError::operation_failed(format!("datastore not found: {name}")),
            Error::Io(detail) => RpcError::operation_failed(detail.clone()),
            Error::Parse(detail) => RpcError::operation_failed(detail.clone()),
        }
    }
}
