//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use confd_utils::error::RpcError;
use tracing::warn;

#[derive(Debug)]
pub enum Error {
    /// `edit`'s `create` found the target already present (spec.md §4.E).
    DataExists(String),
    /// `edit`'s `delete` found nothing to remove (spec.md §4.E).
    DataMissing(String),
    /// A validation callback rejected the candidate.
    ValidationCallback(String),
    /// A `prepare_commit` callback rejected the transaction; the driver has
    /// already invoked `abort` on every callback that ran before this one.
    PrepareCallback(String),
    Datastore(confd_datastore::Error),
    Xpath(confd_xpath::Error),
    Tree(confd_tree::Error),
}

impl Error {
    pub fn log(&self) {
        match self {
            Error::DataExists(path) => warn!(%path, "{}", self),
            Error::DataMissing(path) => warn!(%path, "{}", self),
            Error::ValidationCallback(detail) => warn!(%detail, "{}", self),
            Error::PrepareCallback(detail) => warn!(%detail, "{}", self),
            Error::Datastore(e) => e.log(),
            Error::Xpath(e) => e.log(),
            Error::Tree(_) => warn!("{}", self),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DataExists(_) => write!(f, "data already exists"),
            Error::DataMissing(_) => write!(f, "data does not exist"),
            Error::ValidationCallback(_) => write!(f, "validation callback failed"),
            Error::PrepareCallback(_) => write!(f, "prepare-commit callback failed"),
            Error::Datastore(_) => write!(f, "datastore operation failed"),
            Error::Xpath(_) => write!(f, "xpath evaluation failed"),
            Error::Tree(_) => write!(f, "tree operation failed"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Shapes this error into the NETCONF-style `{error-type, error-tag,
    /// error-severity, error-path?, error-message}` tree a request handler
    /// returns to its client (spec.md §7 "User visibility").
    pub fn to_rpc_error(&self) -> RpcError {
        match self {
            Error::DataExists(path) => RpcError::data_exists(path.clone()),
            Error::DataMissing(path) => RpcError::data_missing(path.clone()),
            Error::ValidationCallback(detail) => RpcError::operation_failed(detail.clone()),
            Error::PrepareCallback(detail) => RpcError::operation_failed(detail.clone()),
            Error::Datastore(e) => e.to_rpc_error(),
            Error::Xpath(e) => RpcError::operation_failed(e.to_string()),
            Error::Tree(e) => RpcError::operation_failed(e.to_string()),
        }
    }
}

impl From<confd_datastore::Error> for Error {
    fn from(e: confd_datastore::Error) -> Self {
        Error::Datastore(e)
    }
}

impl From<confd_xpath::Error> for Error {
    fn from(e: confd_xpath::Error) -> Self {
        Error::Xpath(e)
    }
}

impl From<confd_tree::Error> for Error {
    fn from(e: confd_tree::Error) -> Self {
        Error::Tree(e)
    }
}
