//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

/// One module entry of an RFC 8525 yang-library description, as returned by
/// an application's `yang_lib_for` callback (spec.md §4.F).
#[derive(Clone, Debug)]
pub struct YangLibraryModule {
    pub name: String,
    pub revision: Option<String>,
    pub namespace: String,
}

/// The yang-library an application hands back for a given mount point
/// (spec.md §4.F: "If the callback returns a yang-library description, the
/// resolver loads each listed module into a fresh YANG spec").
#[derive(Clone, Debug, Default)]
pub struct YangLibrary {
    pub modules: Vec<YangLibraryModule>,
}
