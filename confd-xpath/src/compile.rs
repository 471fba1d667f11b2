//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::ast::Location;
use crate::error::Error;
use crate::parse;

/// A compiled, reusable XPath expression. The compile step is pure (spec.md
/// §4.C) — no tree or YANG context is consulted until [`crate::eval::evaluate`].
#[derive(Clone, Debug)]
pub struct Compiled {
    pub location: Arc<Location>,
}

pub fn compile(xpath: &str) -> Result<Compiled, Error> {
    Ok(Compiled { location: Arc::new(parse::parse(xpath)?) })
}

/// Caches compiled expressions keyed by the raw XPath string plus the
/// namespace-prefix context they were compiled against — the same prefix
/// string can resolve to different modules under a different mount, so the
/// cache key carries both (spec.md §4.B `find_module_by_prefix` is
/// context-dependent).
#[derive(Default)]
pub struct CompileCache {
    entries: Mutex<HashMap<(String, String), Compiled>>,
}

impl CompileCache {
    pub fn new() -> Self {
        CompileCache { entries: Mutex::new(HashMap::new()) }
    }

    pub fn get_or_compile(&self, xpath: &str, ns_context: &str) -> Result<Compiled, Error> {
        let key = (xpath.to_string(), ns_context.to_string());
        if let Some(hit) = self.entries.lock().unwrap().get(&key) {
            return Ok(hit.clone());
        }
        let compiled = compile(xpath)?;
        self.entries.lock().unwrap().insert(key, compiled.clone());
        Ok(compiled)
    }
}
