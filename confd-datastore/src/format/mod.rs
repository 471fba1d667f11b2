//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod json;
pub mod xml;

/// `XMLDB_FORMAT` (spec.md §6 "Configuration options consumed"): the
/// on-disk encoding a datastore file is read and written in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileFormat {
    Xml,
    Json,
}

impl Default for FileFormat {
    fn default() -> Self {
        FileFormat::Xml
    }
}
