//! Single-slot copy/cut clipboard and the paste request it drives.

use panel_host::{join_path, normalize_path, DirectoryListing, FileEntry};
use tracing::{debug, info};

use crate::client::ScopedClient;
use crate::error::FileManagerError;
use crate::operations::{OperationKind, PendingOperation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What a paste does with the clipboard entry.
pub enum ClipboardAction {
    /// Duplicate the entry; the clipboard survives the paste.
    Copy,
    /// Move the entry; the clipboard is consumed by the paste attempt.
    Cut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The entry on the clipboard.
pub struct ClipboardItem {
    /// Entry as it was listed when copied or cut.
    pub entry: FileEntry,
    /// Domain the entry's path belongs to.
    pub domain: String,
    /// Copy or cut.
    pub action: ClipboardAction,
}

/// Returns the first name among `name{suffix}`, `name{suffix}_1`, `name{suffix}_2`, ... that
/// is not already present in `listing`.
pub fn next_copy_name(name: &str, suffix: &str, listing: &DirectoryListing) -> String {
    let base = format!("{name}{suffix}");
    if !listing.contains(&base) {
        return base;
    }
    let mut n = 1u64;
    loop {
        let candidate = format!("{base}_{n}");
        if !listing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// At most one clipboard item; copy and cut overwrite it.
pub struct ClipboardController {
    item: Option<ClipboardItem>,
}

impl ClipboardController {
    /// Puts `entry` on the clipboard for copying.
    pub fn copy(&mut self, domain: &str, entry: &FileEntry) {
        self.store(domain, entry, ClipboardAction::Copy);
    }

    /// Puts `entry` on the clipboard for moving.
    pub fn cut(&mut self, domain: &str, entry: &FileEntry) {
        self.store(domain, entry, ClipboardAction::Cut);
    }

    fn store(&mut self, domain: &str, entry: &FileEntry, action: ClipboardAction) {
        debug!(?action, path = %entry.path, "clipboard set");
        self.item = Some(ClipboardItem {
            entry: entry.clone(),
            domain: domain.to_string(),
            action,
        });
    }

    /// Empties the clipboard.
    pub fn clear(&mut self) {
        self.item = None;
    }

    /// Returns the clipboard item.
    pub fn item(&self) -> Option<&ClipboardItem> {
        self.item.as_ref()
    }

    /// Returns `true` when nothing is on the clipboard.
    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    /// Pastes into the directory of `listing`.
    ///
    /// A copy lands under the first free `_copy` name and keeps the clipboard. A cut moves the
    /// entry under its own name and empties the clipboard whatever the outcome; cutting onto
    /// the entry's own location sends nothing.
    pub async fn paste(
        &mut self,
        client: &ScopedClient,
        listing: &DirectoryListing,
        suffix: &str,
    ) -> PendingOperation {
        let Some(item) = self.item.clone() else {
            return PendingOperation::new(OperationKind::Copy, Vec::new())
                .finish(Err(FileManagerError::validation("clipboard is empty")));
        };
        let source = normalize_path(&item.entry.path);

        match item.action {
            ClipboardAction::Copy => {
                let dest = join_path(
                    &listing.path,
                    &next_copy_name(&item.entry.name, suffix, listing),
                );
                let op = PendingOperation::new(OperationKind::Copy, vec![source.clone(), dest.clone()]);
                if item.domain != listing.domain {
                    return op.finish(Err(cross_domain(&item.domain, &listing.domain)));
                }
                let result = client.copy_item(&listing.domain, &source, &dest).await;
                if result.is_ok() {
                    info!(from = %source, to = %dest, "item copied");
                }
                op.finish(result)
            }
            ClipboardAction::Cut => {
                self.item = None;
                let dest = join_path(&listing.path, &item.entry.name);
                let op = PendingOperation::new(OperationKind::Move, vec![source.clone(), dest.clone()]);
                if item.domain != listing.domain {
                    return op.finish(Err(cross_domain(&item.domain, &listing.domain)));
                }
                if dest == source {
                    return op.skip();
                }
                let result = client.rename_item(&listing.domain, &source, &dest).await;
                if result.is_ok() {
                    info!(from = %source, to = %dest, "item moved");
                }
                op.finish(result)
            }
        }
    }
}

fn cross_domain(from: &str, to: &str) -> FileManagerError {
    FileManagerError::validation(format!(
        "cannot paste an item from `{from}` into `{to}`"
    ))
}
