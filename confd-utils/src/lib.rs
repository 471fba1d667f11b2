//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod error;
pub mod session;

use tokio::sync::oneshot;

/// A one-shot reply channel attached to a daemon request, mirrored after the
/// responder convention used throughout the northbound request/response
/// types: the sender half rides inside the request, the receiver half stays
/// with the caller.
pub type Responder<T> = oneshot::Sender<T>;
