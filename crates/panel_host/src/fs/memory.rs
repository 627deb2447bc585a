//! In-memory hosting backend used by tests and offline demos.
//!
//! Paths are resolved against an explicit segment stack here, so this adapter is the place
//! where traversal outside a domain root is rejected.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap, HashSet},
    future,
    rc::Rc,
};

use serde_json::{json, Value};

use crate::error::HostApiError;
use crate::fs::envelope::ListingShape;
use crate::fs::path::{file_name, join_path, normalize_path, parent_path, resolve_path};
use crate::fs::service::{HostingFsFuture, HostingFsService};
use crate::fs::types::{DomainDirectory, DomainStructure, FileInfo, UploadFile, UserDomain};

#[derive(Debug, Clone, PartialEq, Eq)]
enum MemoryNode {
    Dir,
    File(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Dir,
    File,
}

type Tree = BTreeMap<String, MemoryNode>;

#[derive(Debug, Default)]
struct MemoryState {
    domains: Vec<UserDomain>,
    trees: HashMap<String, Tree>,
    listing_shape: ListingShape,
    raw_listings: HashMap<String, Value>,
    failures: HashMap<String, HostApiError>,
    op_failures: HashMap<&'static str, HostApiError>,
    stalled: HashSet<String>,
    calls: Vec<String>,
}

#[derive(Debug, Clone, Default)]
/// In-memory hosting filesystem with per-path fault injection.
///
/// Clones share state, so a test can keep a handle while the session owns another.
pub struct MemoryHostingFs {
    inner: Rc<RefCell<MemoryState>>,
}

impl MemoryHostingFs {
    /// Registers a browsable domain owned by `linux_username`.
    pub fn add_domain(&self, domain: &str, linux_username: &str) -> &Self {
        let mut state = self.inner.borrow_mut();
        let id = state.domains.len() as u64 + 1;
        state.domains.push(UserDomain {
            domain: domain.to_string(),
            linux_username: linux_username.to_string(),
            id,
        });
        state.trees.entry(domain.to_string()).or_default();
        self
    }

    /// Creates a directory and any missing ancestors.
    pub fn insert_dir(&self, domain: &str, path: &str) -> &Self {
        let mut state = self.inner.borrow_mut();
        let tree = state.trees.entry(domain.to_string()).or_default();
        let key = normalize_path(path);
        insert_ancestors(tree, &key);
        if !key.is_empty() {
            tree.insert(key, MemoryNode::Dir);
        }
        self
    }

    /// Creates a file and any missing ancestor directories.
    pub fn insert_file(&self, domain: &str, path: &str, bytes: impl Into<Vec<u8>>) -> &Self {
        let mut state = self.inner.borrow_mut();
        let tree = state.trees.entry(domain.to_string()).or_default();
        let key = normalize_path(path);
        insert_ancestors(tree, &key);
        tree.insert(key, MemoryNode::File(bytes.into()));
        self
    }

    /// Selects the envelope used for listing responses.
    pub fn set_listing_shape(&self, shape: ListingShape) -> &Self {
        self.inner.borrow_mut().listing_shape = shape;
        self
    }

    /// Answers listings of `path` with `payload` verbatim.
    pub fn override_listing(&self, path: &str, payload: Value) -> &Self {
        self.inner
            .borrow_mut()
            .raw_listings
            .insert(normalize_path(path), payload);
        self
    }

    /// Makes every request touching `path` fail with `error`.
    pub fn fail_path(&self, path: &str, error: HostApiError) -> &Self {
        self.inner
            .borrow_mut()
            .failures
            .insert(normalize_path(path), error);
        self
    }

    /// Makes every `op` request (for example `"get_domain_structure"`) fail with `error`.
    pub fn fail_operation(&self, op: &'static str, error: HostApiError) -> &Self {
        self.inner.borrow_mut().op_failures.insert(op, error);
        self
    }

    /// Makes every request touching `path` stay pending forever.
    pub fn stall_path(&self, path: &str) -> &Self {
        self.inner.borrow_mut().stalled.insert(normalize_path(path));
        self
    }

    /// Removes all injected failures and stalls.
    pub fn clear_faults(&self) -> &Self {
        let mut state = self.inner.borrow_mut();
        state.failures.clear();
        state.op_failures.clear();
        state.stalled.clear();
        self
    }

    /// Returns the request log as `"<op> <domain>:<paths>"` lines.
    pub fn calls(&self) -> Vec<String> {
        self.inner.borrow().calls.clone()
    }

    /// Returns the number of logged requests for `op`.
    pub fn call_count(&self, op: &str) -> usize {
        let prefix = format!("{op} ");
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|call| call.starts_with(&prefix))
            .count()
    }

    /// Returns `true` when `path` exists in `domain`.
    pub fn exists(&self, domain: &str, path: &str) -> bool {
        let state = self.inner.borrow();
        state
            .trees
            .get(domain)
            .is_some_and(|tree| kind_of(tree, &normalize_path(path)).is_some())
    }

    /// Returns a file's content as UTF-8 text.
    pub fn file_text(&self, domain: &str, path: &str) -> Option<String> {
        let state = self.inner.borrow();
        match state.trees.get(domain)?.get(&normalize_path(path))? {
            MemoryNode::File(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            MemoryNode::Dir => None,
        }
    }

    fn respond<'a, T: 'a>(
        &'a self,
        op: &'static str,
        domain: &str,
        paths: &[&str],
        run: impl FnOnce(&mut MemoryState) -> Result<T, HostApiError>,
    ) -> HostingFsFuture<'a, Result<T, HostApiError>> {
        let mut state = self.inner.borrow_mut();
        let keys: Vec<String> = paths.iter().map(|path| normalize_path(path)).collect();
        state
            .calls
            .push(format!("{op} {domain}:{}", keys.join(" -> ")));
        if keys.iter().any(|key| state.stalled.contains(key)) {
            return Box::pin(future::pending());
        }
        let injected = state.op_failures.get(op).cloned().or_else(|| {
            keys.iter()
                .find_map(|key| state.failures.get(key).cloned())
        });
        if let Some(err) = injected {
            return Box::pin(future::ready(Err(err)));
        }
        let result = run(&mut *state);
        Box::pin(future::ready(result))
    }
}

fn insert_ancestors(tree: &mut Tree, key: &str) {
    let mut parent = parent_path(key);
    while !parent.is_empty() {
        tree.entry(parent.clone()).or_insert(MemoryNode::Dir);
        parent = parent_path(&parent);
    }
}

fn resolve_key(path: &str) -> Result<String, HostApiError> {
    resolve_path(path)
        .ok_or_else(|| HostApiError::Server(format!("path `{path}` escapes the domain root")))
}

fn kind_of(tree: &Tree, key: &str) -> Option<NodeKind> {
    if key.is_empty() {
        return Some(NodeKind::Dir);
    }
    match tree.get(key)? {
        MemoryNode::Dir => Some(NodeKind::Dir),
        MemoryNode::File(_) => Some(NodeKind::File),
    }
}

fn in_subtree(candidate: &str, key: &str) -> bool {
    candidate == key || candidate.starts_with(&format!("{key}/"))
}

fn subtree_keys(tree: &Tree, key: &str) -> Vec<String> {
    tree.keys()
        .filter(|candidate| in_subtree(candidate, key))
        .cloned()
        .collect()
}

fn subtree_size(tree: &Tree, key: &str) -> u64 {
    tree.iter()
        .filter(|(candidate, _)| in_subtree(candidate, key))
        .map(|(_, node)| match node {
            MemoryNode::File(bytes) => bytes.len() as u64,
            MemoryNode::Dir => 0,
        })
        .sum()
}

fn require_dir(tree: &Tree, key: &str) -> Result<(), HostApiError> {
    match kind_of(tree, key) {
        Some(NodeKind::Dir) => Ok(()),
        Some(NodeKind::File) => Err(HostApiError::Server(format!(
            "path `{key}` is not a directory"
        ))),
        None => Err(HostApiError::NotFound(key.to_string())),
    }
}

fn require_absent(tree: &Tree, key: &str) -> Result<(), HostApiError> {
    if kind_of(tree, key).is_some() {
        return Err(HostApiError::Server(format!("path `{key}` already exists")));
    }
    Ok(())
}

impl MemoryState {
    fn owner(&self, domain: &str) -> String {
        self.domains
            .iter()
            .find(|candidate| candidate.domain == domain)
            .map(|candidate| candidate.linux_username.clone())
            .unwrap_or_else(|| "root".to_string())
    }

    fn tree(&mut self, domain: &str) -> Result<&mut Tree, HostApiError> {
        if domain.is_empty() {
            return Ok(self.trees.entry(String::new()).or_default());
        }
        self.trees
            .get_mut(domain)
            .ok_or_else(|| HostApiError::Server(format!("unknown domain `{domain}`")))
    }

    fn list(&mut self, domain: &str, path: &str) -> Result<Value, HostApiError> {
        let key = resolve_key(path)?;
        if let Some(raw) = self.raw_listings.get(&key) {
            return Ok(raw.clone());
        }
        let owner = self.owner(domain);
        let shape = self.listing_shape;
        let tree = self.tree(domain)?;
        require_dir(tree, &key)?;

        let entries: Vec<Value> = tree
            .iter()
            .filter(|(candidate, _)| !candidate.is_empty() && parent_path(candidate) == key)
            .map(|(candidate, node)| {
                let (kind, size, permissions) = match node {
                    MemoryNode::Dir => ("directory", None, "rwxr-xr-x"),
                    MemoryNode::File(bytes) => ("file", Some(bytes.len() as u64), "rw-r--r--"),
                };
                json!({
                    "name": file_name(candidate),
                    "path": candidate,
                    "type": kind,
                    "size": size,
                    "permissions": permissions,
                    "owner": owner,
                    "group": owner,
                })
            })
            .collect();
        Ok(shape.wrap(Value::Array(entries)))
    }

    fn read(&mut self, domain: &str, path: &str) -> Result<Value, HostApiError> {
        let key = resolve_key(path)?;
        match self.tree(domain)?.get(&key) {
            Some(MemoryNode::File(bytes)) => {
                Ok(json!({ "content": String::from_utf8_lossy(bytes) }))
            }
            Some(MemoryNode::Dir) => Err(HostApiError::Server(format!(
                "path `{key}` is a directory"
            ))),
            None => Err(HostApiError::NotFound(key)),
        }
    }

    fn write(&mut self, domain: &str, path: &str, bytes: Vec<u8>) -> Result<(), HostApiError> {
        let key = resolve_key(path)?;
        let tree = self.tree(domain)?;
        if key.is_empty() || kind_of(tree, &key) == Some(NodeKind::Dir) {
            return Err(HostApiError::Server(format!("path `{key}` is a directory")));
        }
        require_dir(tree, &parent_path(&key))?;
        tree.insert(key, MemoryNode::File(bytes));
        Ok(())
    }

    fn create_dir(&mut self, domain: &str, path: &str) -> Result<(), HostApiError> {
        let key = resolve_key(path)?;
        let tree = self.tree(domain)?;
        require_absent(tree, &key)?;
        require_dir(tree, &parent_path(&key))?;
        tree.insert(key, MemoryNode::Dir);
        Ok(())
    }

    fn download(&mut self, domain: &str, path: &str) -> Result<Vec<u8>, HostApiError> {
        let key = resolve_key(path)?;
        match self.tree(domain)?.get(&key) {
            Some(MemoryNode::File(bytes)) => Ok(bytes.clone()),
            Some(MemoryNode::Dir) => Err(HostApiError::Server(format!(
                "path `{key}` is a directory"
            ))),
            None => Err(HostApiError::NotFound(key)),
        }
    }

    fn transfer(
        &mut self,
        domain: &str,
        source: &str,
        dest: &str,
        keep_source: bool,
    ) -> Result<(), HostApiError> {
        let source = resolve_key(source)?;
        let dest = resolve_key(dest)?;
        let tree = self.tree(domain)?;
        if source.is_empty() {
            return Err(HostApiError::Server("cannot move the domain root".to_string()));
        }
        if kind_of(tree, &source).is_none() {
            return Err(HostApiError::NotFound(source));
        }
        if in_subtree(&dest, &source) {
            return Err(HostApiError::Server(format!(
                "cannot place `{source}` inside itself"
            )));
        }
        require_absent(tree, &dest)?;
        require_dir(tree, &parent_path(&dest))?;

        for key in subtree_keys(tree, &source) {
            let node = if keep_source {
                tree.get(&key).cloned()
            } else {
                tree.remove(&key)
            };
            if let Some(node) = node {
                let suffix = &key[source.len()..];
                tree.insert(format!("{dest}{suffix}"), node);
            }
        }
        Ok(())
    }

    fn delete(&mut self, domain: &str, path: &str) -> Result<(), HostApiError> {
        let key = resolve_key(path)?;
        let tree = self.tree(domain)?;
        if key.is_empty() {
            return Err(HostApiError::Server("cannot delete the domain root".to_string()));
        }
        if kind_of(tree, &key).is_none() {
            return Err(HostApiError::NotFound(key));
        }
        for candidate in subtree_keys(tree, &key) {
            tree.remove(&candidate);
        }
        Ok(())
    }

    fn info(&mut self, domain: &str, path: &str) -> Result<FileInfo, HostApiError> {
        let key = resolve_key(path)?;
        let owner = self.owner(domain);
        let tree: &Tree = self.tree(domain)?;
        let kind = kind_of(tree, &key).ok_or_else(|| HostApiError::NotFound(key.clone()))?;
        Ok(FileInfo {
            size: Some(subtree_size(tree, &key)),
            permissions: Some(
                match kind {
                    NodeKind::Dir => "rwxr-xr-x",
                    NodeKind::File => "rw-r--r--",
                }
                .to_string(),
            ),
            owner: Some(owner.clone()),
            group: Some(owner),
            path: key,
            ..FileInfo::default()
        })
    }

    fn structure(&mut self, domain: &str) -> Result<DomainStructure, HostApiError> {
        let linux_username = self.owner(domain);
        let tree: &Tree = self.tree(domain)?;
        let directories = tree
            .iter()
            .filter(|(key, node)| !key.contains('/') && **node == MemoryNode::Dir)
            .map(|(key, _)| {
                (
                    key.clone(),
                    DomainDirectory {
                        exists: true,
                        size: Some(subtree_size(tree, key)),
                    },
                )
            })
            .collect();
        Ok(DomainStructure {
            linux_username,
            directories,
        })
    }
}

impl HostingFsService for MemoryHostingFs {
    fn list_directory<'a>(
        &'a self,
        path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<Value, HostApiError>> {
        self.respond("list_directory", domain, &[path], |state| {
            state.list(domain, path)
        })
    }

    fn read_file<'a>(
        &'a self,
        path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<Value, HostApiError>> {
        self.respond("read_file", domain, &[path], |state| state.read(domain, path))
    }

    fn write_file<'a>(
        &'a self,
        path: &'a str,
        content: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>> {
        self.respond("write_file", domain, &[path], |state| {
            state.write(domain, path, content.as_bytes().to_vec())
        })
    }

    fn create_directory<'a>(
        &'a self,
        path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>> {
        self.respond("create_directory", domain, &[path], |state| {
            state.create_dir(domain, path)
        })
    }

    fn upload_file<'a>(
        &'a self,
        path: &'a str,
        file: &'a UploadFile,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>> {
        let target = join_path(path, &file.name);
        self.respond("upload_file", domain, &[target.as_str()], |state| {
            state.write(domain, &target, file.bytes.clone())
        })
    }

    fn download_file<'a>(
        &'a self,
        path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<Vec<u8>, HostApiError>> {
        self.respond("download_file", domain, &[path], |state| {
            state.download(domain, path)
        })
    }

    fn rename_item<'a>(
        &'a self,
        old_path: &'a str,
        new_path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>> {
        self.respond("rename_item", domain, &[old_path, new_path], |state| {
            state.transfer(domain, old_path, new_path, false)
        })
    }

    fn copy_item<'a>(
        &'a self,
        source_path: &'a str,
        dest_path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>> {
        self.respond("copy_item", domain, &[source_path, dest_path], |state| {
            state.transfer(domain, source_path, dest_path, true)
        })
    }

    fn delete_item<'a>(
        &'a self,
        path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>> {
        self.respond("delete_item", domain, &[path], |state| state.delete(domain, path))
    }

    fn get_file_info<'a>(
        &'a self,
        path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<FileInfo, HostApiError>> {
        self.respond("get_file_info", domain, &[path], |state| state.info(domain, path))
    }

    fn get_user_domains<'a>(&'a self) -> HostingFsFuture<'a, Result<Vec<UserDomain>, HostApiError>> {
        self.respond("get_user_domains", "", &[], |state| Ok(state.domains.clone()))
    }

    fn get_domain_structure<'a>(
        &'a self,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<DomainStructure, HostApiError>> {
        self.respond("get_domain_structure", domain, &[], |state| {
            state.structure(domain)
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fs::envelope::parse_listing;

    fn seeded() -> MemoryHostingFs {
        let fs = MemoryHostingFs::default();
        fs.add_domain("example.com", "exmpl")
            .insert_file("example.com", "public_html/index.html", "<h1>hi</h1>")
            .insert_file("example.com", "public_html/css/site.css", "body{}")
            .insert_dir("example.com", "logs");
        fs
    }

    fn names(fs: &MemoryHostingFs, path: &str) -> Vec<String> {
        let raw = block_on(fs.list_directory(path, "example.com")).expect("list");
        let (_, listing) = parse_listing(raw, "example.com", path).expect("parse");
        listing.entries.into_iter().map(|entry| entry.name).collect()
    }

    #[test]
    fn lists_children_in_the_selected_envelope() {
        let fs = seeded();
        fs.set_listing_shape(ListingShape::Files);
        let raw = block_on(fs.list_directory("", "example.com")).expect("list");
        assert!(raw.get("files").is_some());
        assert_eq!(names(&fs, ""), vec!["logs", "public_html"]);
        assert_eq!(names(&fs, "public_html"), vec!["css", "index.html"]);
    }

    #[test]
    fn missing_directory_is_not_found() {
        let fs = seeded();
        let err = block_on(fs.list_directory("nope", "example.com")).expect_err("missing");
        assert_eq!(err, HostApiError::NotFound("nope".to_string()));
    }

    #[test]
    fn traversal_outside_the_root_is_rejected() {
        let fs = seeded();
        let err = block_on(fs.read_file("../../etc/passwd", "example.com")).expect_err("escape");
        assert!(matches!(err, HostApiError::Server(message) if message.contains("escapes")));
    }

    #[test]
    fn rename_moves_whole_subtree_and_copy_keeps_source() {
        let fs = seeded();
        block_on(fs.rename_item("public_html", "site", "example.com")).expect("rename");
        assert!(!fs.exists("example.com", "public_html/css/site.css"));
        assert_eq!(
            fs.file_text("example.com", "site/css/site.css").as_deref(),
            Some("body{}")
        );

        block_on(fs.copy_item("site/index.html", "logs/index.html", "example.com"))
            .expect("copy");
        assert!(fs.exists("example.com", "site/index.html"));
        assert!(fs.exists("example.com", "logs/index.html"));

        let err = block_on(fs.copy_item("site", "site/inner", "example.com"))
            .expect_err("copy into itself");
        assert!(matches!(err, HostApiError::Server(_)));
    }

    #[test]
    fn injected_failures_and_stalls_apply_per_path() {
        let fs = seeded();
        fs.fail_path("logs", HostApiError::Server("disk full".to_string()));
        let err = block_on(fs.delete_item("logs", "example.com")).expect_err("injected");
        assert_eq!(err, HostApiError::Server("disk full".to_string()));
        assert!(fs.exists("example.com", "logs"));

        fs.clear_faults();
        block_on(fs.delete_item("logs", "example.com")).expect("delete");
        assert!(!fs.exists("example.com", "logs"));
        assert_eq!(fs.call_count("delete_item"), 2);
    }

    #[test]
    fn domain_structure_reports_top_level_directories() {
        let fs = seeded();
        let structure = block_on(fs.get_domain_structure("example.com")).expect("structure");
        assert_eq!(structure.linux_username, "exmpl");
        assert_eq!(
            structure.directories.keys().cloned().collect::<Vec<_>>(),
            vec!["logs".to_string(), "public_html".to_string()]
        );
        assert_eq!(structure.directories["public_html"].size, Some(17));
    }
}
