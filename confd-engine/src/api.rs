//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The client-facing RPC surface (spec.md §6 "Client RPCs"), adapted from
//! `holo-northbound/src/api.rs`'s daemon request/response enums. Framing to
//! an actual client socket is `confd-daemon`'s job; this module only shapes
//! the logical request/response pairs the engine dispatches.

use confd_datastore::DefaultsMode;
use confd_tree::Tree;
use confd_utils::session::SessionId;
use confd_utils::Responder;

use crate::error::Error;

#[derive(Debug)]
pub enum Request {
    GetConfig(GetConfigRequest),
    Get(GetRequest),
    EditConfig(EditConfigRequest),
    CopyConfig(CopyConfigRequest),
    DeleteConfig(DeleteConfigRequest),
    Lock(LockRequest),
    Unlock(UnlockRequest),
    Validate(ValidateRequest),
    Commit(CommitRequest),
    DiscardChanges(DiscardChangesRequest),
    CloseSession(CloseSessionRequest),
    KillSession(KillSessionRequest),
    CreateSubscription(CreateSubscriptionRequest),
}

#[derive(Debug)]
pub struct GetConfigRequest {
    pub session: SessionId,
    pub source: String,
    pub filter: Option<String>,
    pub defaults: DefaultsMode,
    pub responder: Option<Responder<Result<GetConfigResponse, Error>>>,
}

#[derive(Debug)]
pub struct GetConfigResponse {
    pub tree: Tree,
}

#[derive(Debug)]
pub struct GetRequest {
    pub session: SessionId,
    pub filter: Option<String>,
    pub defaults: DefaultsMode,
    pub responder: Option<Responder<Result<GetConfigResponse, Error>>>,
}

#[derive(Debug)]
pub struct EditConfigRequest {
    pub session: SessionId,
    pub target: String,
    pub default_operation: String,
    pub config: Tree,
    pub responder: Option<Responder<Result<(), Error>>>,
}

#[derive(Debug)]
pub struct CopyConfigRequest {
    pub session: SessionId,
    pub source: String,
    pub target: String,
    pub responder: Option<Responder<Result<(), Error>>>,
}

#[derive(Debug)]
pub struct DeleteConfigRequest {
    pub session: SessionId,
    pub target: String,
    pub responder: Option<Responder<Result<(), Error>>>,
}

#[derive(Debug)]
pub struct LockRequest {
    pub session: SessionId,
    pub target: String,
    pub responder: Option<Responder<Result<(), Error>>>,
}

#[derive(Debug)]
pub struct UnlockRequest {
    pub session: SessionId,
    pub target: String,
    pub responder: Option<Responder<Result<(), Error>>>,
}

#[derive(Debug)]
pub struct ValidateRequest {
    pub session: SessionId,
    pub source: String,
    pub responder: Option<Responder<Result<(), Error>>>,
}

#[derive(Debug)]
pub struct CommitRequest {
    pub session: SessionId,
    pub responder: Option<Responder<Result<(), Error>>>,
}

#[derive(Debug)]
pub struct DiscardChangesRequest {
    pub session: SessionId,
    pub responder: Option<Responder<Result<(), Error>>>,
}

#[derive(Debug)]
pub struct CloseSessionRequest {
    pub session: SessionId,
    pub responder: Option<Responder<()>>,
}

#[derive(Debug)]
pub struct KillSessionRequest {
    pub target: SessionId,
    pub responder: Option<Responder<Result<(), Error>>>,
}

#[derive(Debug)]
pub struct CreateSubscriptionRequest {
    pub session: SessionId,
    pub stream: String,
    pub filter: Option<String>,
    pub responder: Option<Responder<Result<(), Error>>>,
}
