//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use confd_mount::{MountCallback, MountLoader, MountRegistry};
use confd_tree::{deep_copy, flag_set, flag_test, purge, NodeFlags, NodeId, NodeKind, Tree};
use confd_utils::session::SessionId;
use confd_xpath::{compile, evaluate_with_mounts};
use confd_yang::YangIndex;
use tracing::debug;

use crate::datastore::Datastore;
use crate::defaults::{materialize_top_level_defaults, suppress_at_serialize, DefaultsMode};
use crate::error::Error;
use crate::format::{self, FileFormat};
use crate::lock::LockRegistry;
use crate::module_state::{diff_module_state, ModuleStateChange, ModuleStateEntry};

/// Above this many XPath matches, `read`'s cache projection switches from
/// per-match bottom-up ancestor copy to a mark-then-sweep pass over the
/// cached tree (spec.md §4.D: "the threshold is implementation-chosen,
/// ~1000 matches").
const PROJECTION_FAST_PATH_THRESHOLD: usize = 1000;

/// Component D: named in-memory trees backed by files, with a shared lock
/// registry and module-state reconciliation on load (spec.md §4.D).
pub struct DatastoreStore {
    cache: Mutex<HashMap<String, Datastore>>,
    locks: LockRegistry,
    yang: Arc<YangIndex>,
    base_dir: PathBuf,
    format: FileFormat,
    mounts: Arc<MountRegistry>,
    mount_resolver: Option<MountResolver>,
}

/// The application-supplied half of schema-mount resolution (spec.md §4.F).
/// Kept optional and separate from `DatastoreStore::new` so datastores that
/// never mount anything don't have to thread no-op callbacks through their
/// constructor.
struct MountResolver {
    callback: Arc<dyn MountCallback + Send + Sync>,
    loader: Arc<dyn MountLoader + Send + Sync>,
}

/// The result of a `read`: a standalone projected tree the caller owns, plus
/// whatever module-state reconciliation happened on the underlying load.
pub struct ReadResult {
    pub tree: Tree,
    pub root: NodeId,
    pub module_state: Vec<ModuleStateChange>,
}

impl DatastoreStore {
    pub fn new(base_dir: impl Into<PathBuf>, yang: Arc<YangIndex>, format: FileFormat) -> Self {
        DatastoreStore {
            cache: Mutex::new(HashMap::new()),
            locks: LockRegistry::new(),
            yang,
            base_dir: base_dir.into(),
            format,
            mounts: Arc::new(MountRegistry::new()),
            mount_resolver: None,
        }
    }

    /// Opts this store into schema-mount resolution (spec.md §4.F): every
    /// load binds `callback`/`loader` against whichever data nodes
    /// `confd_yang::YangIndex::is_mount_point_candidate` flags, attaching
    /// each one's spec in `registry` so `read`'s XPath evaluation and the
    /// commit-time validator resolve beneath it against the mounted spec
    /// rather than the top-level one.
    pub fn with_mount_resolver(
        mut self,
        registry: Arc<MountRegistry>,
        callback: Arc<dyn MountCallback + Send + Sync>,
        loader: Arc<dyn MountLoader + Send + Sync>,
    ) -> Self {
        self.mounts = registry;
        self.mount_resolver = Some(MountResolver { callback, loader });
        self
    }

    /// The registry this store binds mount points into, for callers (the
    /// XPath evaluator, the commit-time validator) that need to resolve a
    /// node's spec without going through a read.
    pub fn mounts(&self) -> Arc<MountRegistry> {
        self.mounts.clone()
    }

    fn path_for(&self, name: &str) -> PathBuf {
        let ext = match self.format {
            FileFormat::Xml => "xml",
            FileFormat::Json => "json",
        };
        self.base_dir.join(format!("{name}_db.{ext}"))
    }

    /// `lock(name, session_id)` (spec.md §4.D).
    pub fn lock(&self, name: &str, session: SessionId) -> Result<(), Error> {
        self.locks.lock(name, session)
    }

    /// `unlock(name, session_id)` (spec.md §4.D).
    pub fn unlock(&self, name: &str, session: SessionId) -> Result<(), Error> {
        self.locks.unlock(name, session)
    }

    pub fn release_session(&self, session: SessionId) {
        self.locks.release_session(session);
    }

    /// The current lock holder and acquisition time for `name`, if locked
    /// (spec.md §6 monitoring state's per-datastore lock reporting).
    pub fn lock_holder(&self, name: &str) -> Option<(SessionId, chrono::DateTime<chrono::Utc>)> {
        self.locks.record(name).map(|r| (r.holder, r.acquired_at))
    }

    /// `delete(name)` — empty the datastore in cache and on disk.
    pub fn delete(&self, name: &str) -> Result<(), Error> {
        let mut cache = self.cache.lock().unwrap();
        let ds = cache.entry(name.to_string()).or_insert_with(|| Datastore::empty(name));
        ds.clear();
        self.persist(ds)
    }

    /// `copy(from, to)` — whole-tree copy (spec.md §4.D).
    pub fn copy(&self, from: &str, to: &str) -> Result<(), Error> {
        self.ensure_loaded(from)?;
        let mut cache = self.cache.lock().unwrap();
        let (src_tree, module_state) = {
            let src = cache.get(from).expect("just ensured loaded");
            (src.tree.clone(), src.module_state.clone())
        };
        let dst = cache.entry(to.to_string()).or_insert_with(|| Datastore::empty(to));
        dst.replace(src_tree, module_state);
        self.persist(dst)
    }

    /// `write(name, tree)` — replace root, bump version, persist, cache
    /// (spec.md §4.D).
    pub fn write(&self, name: &str, tree: Tree) -> Result<(), Error> {
        let module_state = self.running_module_state();
        let mut cache = self.cache.lock().unwrap();
        let ds = cache.entry(name.to_string()).or_insert_with(|| Datastore::empty(name));
        ds.replace(tree, module_state);
        self.persist(ds)
    }

    fn persist(&self, ds: &Datastore) -> Result<(), Error> {
        let root = ds.root();
        let path = self.path_for(&ds.name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Io(e.to_string()))?;
        }
        let file = std::fs::File::create(&path).map_err(|e| Error::Io(e.to_string()))?;
        match self.format {
            FileFormat::Xml => format::xml::encode(file, &ds.tree, root)?,
            FileFormat::Json => {
                let value = format::json::encode(&ds.tree, root);
                serde_json::to_writer_pretty(file, &value).map_err(|e| Error::Io(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// `read(name, xpath?, defaults_mode, with_module_state?)` (spec.md
    /// §4.D). Loads on cache miss, binds, materialises defaults, caches;
    /// always returns a fresh tree the caller owns, projected to the XPath
    /// match set when one is given.
    pub fn read(
        &self,
        name: &str,
        xpath: Option<&str>,
        defaults_mode: DefaultsMode,
        with_module_state: bool,
    ) -> Result<ReadResult, Error> {
        self.ensure_loaded(name)?;
        let cache = self.cache.lock().unwrap();
        let ds = cache.get(name).expect("just ensured loaded");

        let module_state = if with_module_state {
            diff_module_state(&ds.module_state, &self.running_module_state())
        } else {
            Vec::new()
        };

        let mut out = Tree::new();
        let out_root = out.new_node(NodeKind::Element, "config", None);

        match xpath {
            None => {
                for &child in ds.tree.children(ds.root()) {
                    let copied = deep_copy(&ds.tree, child, &mut out, Some(out_root));
                    filter_defaults(&mut out, copied, defaults_mode);
                }
            }
            Some(expr) => {
                let compiled = compile(expr).map_err(|e| Error::Parse(e.to_string()))?;
                let matches = evaluate_with_mounts(&compiled, &ds.tree, ds.root(), &self.yang, &self.mounts)
                    .map_err(|e| Error::Parse(e.to_string()))?;
                self.project(&ds.tree, ds.root(), &matches, &mut out, out_root);
                filter_defaults(&mut out, out_root, defaults_mode);
            }
        }

        Ok(ReadResult { tree: out, root: out_root, module_state })
    }

    /// Builds the minimal ancestor-preserving projection of `matches` from
    /// `src` into `dst` under `dst_parent`. Below the threshold, each match
    /// is copied bottom-up, stopping once an already-copied ancestor is
    /// reached (`clixon_datastore_read.c: xml_copy_bottom_recurse`, SPEC_FULL
    /// §4 supplement); at/above it, matches are flagged `MARK` in `src`'s
    /// clone-free arena view instead, one mark-and-sweep pass copies every
    /// marked node's ancestor chain, and the marks are cleared again.
    fn project(&self, src: &Tree, src_root: NodeId, matches: &[NodeId], dst: &mut Tree, dst_parent: NodeId) {
        if matches.len() < PROJECTION_FAST_PATH_THRESHOLD {
            let mut copied: HashMap<NodeId, NodeId> = HashMap::new();
            copied.insert(src_root, dst_parent);
            for &m in matches {
                bottom_up_copy(src, m, dst, &mut copied);
            }
        } else {
            // mark-and-sweep: requires mutation of `src`, so operate on a
            // scratch clone rather than the live cache tree.
            let mut scratch = src.clone();
            for &m in matches {
                let mut cur = Some(m);
                while let Some(n) = cur {
                    if flag_test(&scratch, n, NodeFlags::MARK) {
                        break;
                    }
                    flag_set(&mut scratch, n, NodeFlags::MARK);
                    cur = scratch.parent(n);
                }
            }
            let mut copied: HashMap<NodeId, NodeId> = HashMap::new();
            copied.insert(src_root, dst_parent);
            for &m in matches {
                bottom_up_copy(&scratch, m, dst, &mut copied);
            }
        }
    }

    /// Binds a freshly-loaded tree to YANG, driving component F for any
    /// mount-point candidates (spec.md §4.D "bind every element to YANG
    /// (calling F for mount-points)").
    fn ensure_loaded(&self, name: &str) -> Result<(), Error> {
        {
            let cache = self.cache.lock().unwrap();
            if cache.contains_key(name) {
                return Ok(());
            }
        }

        let path = self.path_for(name);
        if !path.exists() {
            let mut cache = self.cache.lock().unwrap();
            cache.insert(name.to_string(), Datastore::empty(name));
            return Ok(());
        }

        let (mut tree, module_state) = self.load_from_file(&path)?;
        let root = tree.root().expect("loaded tree has a config root");
        materialize_top_level_defaults(&mut tree, root, &self.yang);
        self.bind_mounts(&mut tree, root);

        let mut ds = Datastore::empty(name);
        ds.replace(tree, module_state);
        self.cache.lock().unwrap().insert(name.to_string(), ds);
        Ok(())
    }

    /// Walks a freshly-loaded tree for mount-point candidates and binds each
    /// one into `self.mounts` (spec.md §4.D "bind every element to YANG
    /// (calling F for mount-points)"). A resolved mount has its subtree
    /// re-tagged against the mounted spec's own top level, the same way
    /// `ensure_loaded` tags the datastore's own root.
    fn bind_mounts(&self, tree: &mut Tree, node: NodeId) {
        let Some(resolver) = self.mount_resolver.as_ref() else { return };

        let candidates: Vec<NodeId> = tree.traverse(node).collect();
        for candidate in candidates {
            let Some(path) = tree.node(candidate).schema_path.clone() else { continue };
            let Ok(schema) = self.yang.spec_of(&path) else { continue };
            if !self.yang.is_mount_point_candidate(&schema) {
                continue;
            }

            match self.mounts.bind(tree, candidate, path, resolver.callback.as_ref(), resolver.loader.as_ref()) {
                Ok(Some(mount_yang)) => materialize_top_level_defaults(tree, candidate, &mount_yang),
                Ok(None) => {}
                Err(e) => e.log(),
            }
        }
    }

    fn load_from_file(&self, path: &Path) -> Result<(Tree, Vec<ModuleStateEntry>), Error> {
        let bytes = std::fs::read(path).map_err(|e| Error::Io(e.to_string()))?;

        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        match self.format {
            FileFormat::Xml => {
                check_singleconfigroot(&bytes)?;
                format::xml::decode(bytes.as_slice(), &mut tree, root)?;
            }
            FileFormat::Json => {
                let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| Error::Parse(e.to_string()))?;
                format::json::decode(&mut tree, root, &value)?;
            }
        }

        let module_state = strip_module_state(&mut tree, root);
        Ok((tree, module_state))
    }

    /// The module-state entries for the schema set currently loaded into
    /// this process (spec.md §3 "Module-state diff").
    fn running_module_state(&self) -> Vec<ModuleStateEntry> {
        self.yang
            .context()
            .modules(true)
            .map(|m| ModuleStateEntry {
                module: m.name().to_string(),
                namespace: m.namespace().to_string(),
                revision: m.revision().map(str::to_string),
            })
            .collect()
    }
}

fn bottom_up_copy(src: &Tree, node: NodeId, dst: &mut Tree, copied: &mut HashMap<NodeId, NodeId>) {
    if copied.contains_key(&node) {
        return;
    }
    let parent = src.parent(node).expect("non-root node has a parent");
    if !copied.contains_key(&parent) {
        bottom_up_copy(src, parent, dst, copied);
    }
    let dst_parent = *copied.get(&parent).unwrap();
    let dst_node = deep_copy(src, node, dst, Some(dst_parent));
    copied.insert(node, dst_node);
}

fn filter_defaults(tree: &mut Tree, node: NodeId, mode: DefaultsMode) {
    for child in tree.children(node).to_vec() {
        if suppress_at_serialize(mode, tree.node(child).flags) {
            purge(tree, child);
            continue;
        }
        filter_defaults(tree, child, mode);
    }
}

/// `clixon_datastore_read.c: singleconfigroot` — the file's top-level
/// element must be exactly one, named `config`.
fn check_singleconfigroot(bytes: &[u8]) -> Result<(), Error> {
    use xml::reader::XmlEvent;
    let reader = xml::ParserConfig::new().create_reader(bytes);
    let mut depth = 0usize;
    for event in reader {
        match event.map_err(|e| Error::Parse(e.to_string()))? {
            XmlEvent::StartElement { name, .. } => {
                if depth == 0 && name.local_name != "config" {
                    return Err(Error::Parse(format!("singleconfigroot: expected <config>, found <{}>", name.local_name)));
                }
                depth += 1;
            }
            XmlEvent::EndElement { .. } => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Strips a leading `yang-library`/`module-set` (RFC 8525) or `modules-state`
/// (RFC 7895) child from `root` and turns it into module-state entries
/// (spec.md §4.D).
fn strip_module_state(tree: &mut Tree, root: NodeId) -> Vec<ModuleStateEntry> {
    let header = tree
        .children(root)
        .iter()
        .copied()
        .find(|&c| matches!(tree.node(c).name.as_str(), "yang-library" | "modules-state"));

    let Some(header) = header else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for node in tree.traverse(header) {
        if tree.node(node).name != "module" {
            continue;
        }
        let text_of = |field: &str| -> Option<String> {
            tree.find_child_by_name(node, field)
                .and_then(|n| tree.children(n).first().copied())
                .and_then(|b| tree.node(b).value.clone())
        };
        if let Some(module) = text_of("name") {
            entries.push(ModuleStateEntry {
                module,
                namespace: text_of("namespace").unwrap_or_default(),
                revision: text_of("revision"),
            });
        }
    }

    debug!(count = entries.len(), "stripped module-state header from loaded datastore");
    purge(tree, header);
    entries
}

#[cfg(test)]
mod tests {
    use confd_tree::NodeKind;
    use yang3::context::{Context, ContextFlags};

    use super::*;

    fn store(dir: &tempfile::TempDir) -> DatastoreStore {
        let ctx = Context::new(ContextFlags::empty()).unwrap();
        DatastoreStore::new(dir.path(), Arc::new(YangIndex::new(ctx)), FileFormat::Json)
    }

    #[test]
    fn write_then_read_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        let iface = tree.new_node(NodeKind::Element, "interface", Some(root));
        let leaf = tree.new_node(NodeKind::Element, "name", Some(iface));
        let body = tree.new_node(NodeKind::Body, "", Some(leaf));
        tree.node_mut(body).value = Some("eth0".to_string());

        store.write("running", tree).unwrap();
        assert!(store.path_for("running").exists());

        let result = store.read("running", None, DefaultsMode::ReportAll, false).unwrap();
        let iface = result.tree.find_child_by_name(result.root, "interface").unwrap();
        let name = result.tree.find_child_by_name(iface, "name").unwrap();
        let body = result.tree.children(name)[0];
        assert_eq!(result.tree.node(body).value.as_deref(), Some("eth0"));
    }

    #[test]
    fn lock_then_second_session_denied() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.lock("running", SessionId(1)).unwrap();
        let err = store.lock("running", SessionId(2)).unwrap_err();
        assert!(matches!(err, Error::LockDenied { holder: 1 }));
    }

    #[test]
    fn delete_empties_datastore() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Element, "config", None);
        tree.new_node(NodeKind::Element, "interface", Some(root));
        store.write("candidate", tree).unwrap();

        store.delete("candidate").unwrap();
        let result = store.read("candidate", None, DefaultsMode::ReportAll, false).unwrap();
        assert!(result.tree.children(result.root).is_empty());
    }

    #[test]
    fn reading_nonexistent_datastore_yields_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let result = store.read("startup", None, DefaultsMode::ReportAll, false).unwrap();
        assert!(result.tree.children(result.root).is_empty());
    }
}
