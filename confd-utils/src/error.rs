//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The RPC error tree shared by every crate in the workspace, following the
//! NETCONF error-tag/error-type conventions named in the engine's external
//! interface (lock-denied, data-exists, data-missing, access-denied,
//! operation-failed, invalid-value, unknown-element).

use std::fmt;

use tracing::warn;

/// `error-type`: which layer raised the error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum ErrorType {
    Transport,
    Rpc,
    Protocol,
    Application,
}

/// `error-tag`: the specific condition, taken from spec.md's error
/// taxonomy (schema / data / access / protocol / internal).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum ErrorTag {
    // Schema errors.
    UnknownElement,
    InvalidValue,
    MissingElement,
    TooManyElements,
    // Data errors.
    DataExists,
    DataMissing,
    // Access errors.
    LockDenied,
    AccessDenied,
    UnknownNamespace,
    // Protocol errors.
    MalformedMessage,
    OperationNotSupported,
    // Internal.
    OperationFailed,
}

impl ErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::UnknownElement => "unknown-element",
            ErrorTag::InvalidValue => "invalid-value",
            ErrorTag::MissingElement => "missing-element",
            ErrorTag::TooManyElements => "too-many-elements",
            ErrorTag::DataExists => "data-exists",
            ErrorTag::DataMissing => "data-missing",
            ErrorTag::LockDenied => "lock-denied",
            ErrorTag::AccessDenied => "access-denied",
            ErrorTag::UnknownNamespace => "unknown-namespace",
            ErrorTag::MalformedMessage => "malformed-message",
            ErrorTag::OperationNotSupported => "operation-not-supported",
            ErrorTag::OperationFailed => "operation-failed",
        }
    }
}

/// `error-severity`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
}

/// A single user-visible RPC error, as returned to the front-end for
/// surfacing to the client that issued the failing request.
#[derive(Clone, Debug)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct RpcError {
    pub error_type: ErrorType,
    pub error_tag: ErrorTag,
    pub error_severity: ErrorSeverity,
    pub error_path: Option<String>,
    pub error_message: String,
}

impl RpcError {
    pub fn new(error_type: ErrorType, error_tag: ErrorTag, message: impl Into<String>) -> Self {
        RpcError {
            error_type,
            error_tag,
            error_severity: ErrorSeverity::Error,
            error_path: None,
            error_message: message.into(),
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.error_path = Some(path.into());
        self
    }

    pub fn lock_denied(holder: &str) -> Self {
        RpcError::new(
            ErrorType::Application,
            ErrorTag::LockDenied,
            format!("datastore is locked by session {holder}"),
        )
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        RpcError::new(ErrorType::Application, ErrorTag::AccessDenied, message)
    }

    pub fn data_exists(path: impl Into<String>) -> Self {
        let path = path.into();
        RpcError::new(
            ErrorType::Application,
            ErrorTag::DataExists,
            format!("data already exists: {path}"),
        )
        .with_path(path)
    }

    pub fn data_missing(path: impl Into<String>) -> Self {
        let path = path.into();
        RpcError::new(
            ErrorType::Application,
            ErrorTag::DataMissing,
            format!("data does not exist: {path}"),
        )
        .with_path(path)
    }

    pub fn operation_failed(message: impl Into<String>) -> Self {
        RpcError::new(ErrorType::Application, ErrorTag::OperationFailed, message)
    }
}

impl RpcError {
    pub fn log(&self) {
        warn!(tag = self.error_tag.as_str(), path = self.error_path.as_deref(), "{}", self.error_message);
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_tag.as_str(), self.error_message)?;
        if let Some(path) = &self.error_path {
            write!(f, " (at {path})")?;
        }
        Ok(())
    }
}

impl std::error::Error for RpcError {}

/// Accumulated validation failures. Validation never returns at the first
/// failure; every registered callback runs and its errors are appended here
/// so a single `validate` reports every violation at once, per the "Error
/// accumulation during validate" design note.
#[derive(Debug, Default)]
pub struct ErrorList(pub Vec<RpcError>);

impl ErrorList {
    pub fn push(&mut self, error: RpcError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ErrorList> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn log(&self) {
        for err in &self.0 {
            err.log();
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}
