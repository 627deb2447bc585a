//! Create, upload, rename, delete, download, and properties requests with batch semantics.

use std::{cell::RefCell, rc::Rc};

use futures::future::join_all;
use panel_host::{join_path, FileEntry, FileKind, UploadFile};
use tracing::info;

use crate::client::ScopedClient;
use crate::error::FileManagerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Kind of filesystem mutation or fetch.
pub enum OperationKind {
    /// Create a directory.
    CreateDirectory,
    /// Upload one or more files.
    Upload,
    /// Rename within the same directory.
    Rename,
    /// Delete one or more entries.
    Delete,
    /// Paste a copied entry.
    Copy,
    /// Paste a cut entry.
    Move,
    /// Fetch bytes for a client-side save.
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Completion state of a [`PendingOperation`].
pub enum OperationOutcome {
    /// Still in flight.
    Pending,
    /// Every request succeeded.
    Succeeded,
    /// Nothing needed to be sent.
    Skipped,
    /// The operation (or some part of a batch) failed.
    Failed(FileManagerError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An issued operation with its target paths and outcome.
pub struct PendingOperation {
    /// What was requested.
    pub kind: OperationKind,
    /// Domain-relative paths involved, sources before destinations.
    pub targets: Vec<String>,
    /// Completion state.
    pub outcome: OperationOutcome,
}

impl PendingOperation {
    /// Creates an in-flight operation.
    pub fn new(kind: OperationKind, targets: Vec<String>) -> Self {
        Self {
            kind,
            targets,
            outcome: OperationOutcome::Pending,
        }
    }

    /// Records the result of the request(s).
    pub fn finish(mut self, result: Result<(), FileManagerError>) -> Self {
        self.outcome = match result {
            Ok(()) => OperationOutcome::Succeeded,
            Err(err) => OperationOutcome::Failed(err),
        };
        self
    }

    /// Marks the operation as not needing any request.
    pub fn skip(mut self) -> Self {
        self.outcome = OperationOutcome::Skipped;
        self
    }

    /// Returns `true` when the listing must be refreshed to reflect this operation.
    pub fn should_refresh(&self) -> bool {
        self.outcome == OperationOutcome::Succeeded && self.kind != OperationKind::Download
    }

    /// Returns the failure, if any.
    pub fn error(&self) -> Option<&FileManagerError> {
        match &self.outcome {
            OperationOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Converts the outcome into a result; skipped and pending operations are `Ok`.
    ///
    /// # Errors
    ///
    /// Returns the recorded failure.
    pub fn into_result(self) -> Result<(), FileManagerError> {
        match self.outcome {
            OperationOutcome::Failed(err) => Err(err),
            _ => Ok(()),
        }
    }
}

/// Client-side save target for downloaded bytes.
pub trait DownloadSink {
    /// Persists `bytes` under `file_name`.
    fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), String>;
}

#[derive(Debug, Clone, Default)]
/// Download sink that keeps saved files in memory.
pub struct MemoryDownloadSink {
    inner: Rc<RefCell<Vec<(String, Vec<u8>)>>>,
}

impl MemoryDownloadSink {
    /// Returns every saved `(file_name, bytes)` pair in save order.
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.inner.borrow().clone()
    }
}

impl DownloadSink for MemoryDownloadSink {
    fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), String> {
        self.inner.borrow_mut().push((file_name.to_string(), bytes));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Confirmation dialog for a pending delete.
pub struct DeleteDialog {
    /// Entries that will be deleted.
    pub targets: Vec<FileEntry>,
    /// Failure of the last confirmation attempt, shown inside the dialog.
    pub error: Option<FileManagerError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Entry metadata merged with on-demand extended info for the properties view.
pub struct FileProperties {
    /// Base name.
    pub name: String,
    /// Domain-relative path.
    pub path: String,
    /// Entry classification.
    pub kind: FileKind,
    /// Size in bytes when known.
    pub size: Option<u64>,
    /// Human-readable size.
    pub size_label: String,
    /// Permission string.
    pub permissions: String,
    /// Owning user.
    pub owner: String,
    /// Owning group.
    pub group: String,
    /// Whether the entry is a symbolic link.
    pub is_symlink: bool,
    /// Link target for symbolic links.
    pub link_target: Option<String>,
    /// MIME type when reported.
    pub mime_type: Option<String>,
    /// Last-modified timestamp.
    pub modified_at: Option<String>,
}

/// Formats a byte count with binary units (`-` when unknown).
pub fn format_size(size: Option<u64>) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    let Some(bytes) = size else {
        return "-".to_string();
    };
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn validate_name(name: &str, what: &str) -> Result<(), FileManagerError> {
    if name.is_empty() {
        return Err(FileManagerError::validation(format!("{what} is required")));
    }
    if name.contains('/') || name == "." || name == ".." {
        return Err(FileManagerError::validation(format!(
            "{what} `{name}` is not a valid name"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
/// Issues filesystem mutations for the current directory and owns the delete dialog.
pub struct FileOperationCoordinator {
    delete_dialog: Option<DeleteDialog>,
}

impl FileOperationCoordinator {
    /// Creates `name` under `current_path`.
    pub async fn create_directory(
        &self,
        client: &ScopedClient,
        domain: &str,
        current_path: &str,
        name: &str,
    ) -> PendingOperation {
        let name = name.trim();
        let path = join_path(current_path, name);
        let op = PendingOperation::new(OperationKind::CreateDirectory, vec![path.clone()]);
        if let Err(err) = validate_name(name, "folder name") {
            return op.finish(Err(err));
        }
        let result = client.create_directory(domain, &path).await;
        if result.is_ok() {
            info!(domain, path = %path, "directory created");
        }
        op.finish(result)
    }

    /// Uploads every file into `current_path` concurrently and waits for all of them.
    ///
    /// Any failure fails the whole operation; completed uploads are not rolled back.
    pub async fn upload_files(
        &self,
        client: &ScopedClient,
        domain: &str,
        current_path: &str,
        files: &[UploadFile],
    ) -> PendingOperation {
        let targets = files
            .iter()
            .map(|file| join_path(current_path, &file.name))
            .collect();
        let op = PendingOperation::new(OperationKind::Upload, targets);
        if files.is_empty() {
            return op.skip();
        }
        if let Some(err) = files
            .iter()
            .find_map(|file| validate_name(&file.name, "file name").err())
        {
            return op.finish(Err(err));
        }

        let results = join_all(
            files
                .iter()
                .map(|file| client.upload_file(domain, current_path, file)),
        )
        .await;
        let result = FileManagerError::collect_batch(results).map(|done| {
            info!(domain, count = done.len(), "files uploaded");
        });
        op.finish(result)
    }

    /// Renames `old_name` to `new_name` within `current_path`.
    ///
    /// Skipped when the new name is empty or unchanged.
    pub async fn rename_item(
        &self,
        client: &ScopedClient,
        domain: &str,
        current_path: &str,
        old_name: &str,
        new_name: &str,
    ) -> PendingOperation {
        let new_name = new_name.trim();
        let old_path = join_path(current_path, old_name);
        let new_path = join_path(current_path, new_name);
        let op = PendingOperation::new(OperationKind::Rename, vec![old_path.clone(), new_path.clone()]);
        if new_name.is_empty() || new_name == old_name {
            return op.skip();
        }
        if let Err(err) = validate_name(new_name, "new name") {
            return op.finish(Err(err));
        }
        let result = client.rename_item(domain, &old_path, &new_path).await;
        if result.is_ok() {
            info!(domain, from = %old_path, to = %new_path, "item renamed");
        }
        op.finish(result)
    }

    /// Opens the delete confirmation dialog for `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`FileManagerError::Validation`] when `targets` is empty.
    pub fn request_delete(&mut self, targets: Vec<FileEntry>) -> Result<(), FileManagerError> {
        if targets.is_empty() {
            return Err(FileManagerError::validation("select an item to delete"));
        }
        self.delete_dialog = Some(DeleteDialog {
            targets,
            error: None,
        });
        Ok(())
    }

    /// Closes the delete dialog without deleting.
    pub fn cancel_delete(&mut self) {
        self.delete_dialog = None;
    }

    /// Returns the open delete dialog.
    pub fn delete_dialog(&self) -> Option<&DeleteDialog> {
        self.delete_dialog.as_ref()
    }

    /// Deletes the dialog's targets.
    ///
    /// A batch is issued concurrently and treated atomically from the user's perspective: if
    /// any delete fails, the dialog stays open with one aggregate error and the caller must not
    /// refresh. Only full success closes the dialog.
    pub async fn confirm_delete(&mut self, client: &ScopedClient, domain: &str) -> PendingOperation {
        let Some(dialog) = &self.delete_dialog else {
            return PendingOperation::new(OperationKind::Delete, Vec::new())
                .finish(Err(FileManagerError::validation("nothing to delete")));
        };
        let paths: Vec<String> = dialog.targets.iter().map(|e| e.path.clone()).collect();
        let op = PendingOperation::new(OperationKind::Delete, paths.clone());

        let result = match paths.as_slice() {
            [single] => client.delete_item(domain, single).await,
            many => {
                let results = join_all(many.iter().map(|path| client.delete_item(domain, path))).await;
                FileManagerError::collect_batch(results).map(|_| ())
            }
        };

        match &result {
            Ok(()) => {
                info!(domain, count = paths.len(), "items deleted");
                self.delete_dialog = None;
            }
            Err(err) => {
                if let Some(dialog) = self.delete_dialog.as_mut() {
                    dialog.error = Some(err.clone());
                }
            }
        }
        op.finish(result)
    }

    /// Fetches `entry` and hands the bytes to `sink`; local state is untouched.
    pub async fn download(
        &self,
        client: &ScopedClient,
        domain: &str,
        entry: &FileEntry,
        sink: &dyn DownloadSink,
    ) -> PendingOperation {
        let op = PendingOperation::new(OperationKind::Download, vec![entry.path.clone()]);
        if entry.is_folder() {
            return op.finish(Err(FileManagerError::validation(
                "folders cannot be downloaded",
            )));
        }
        let result = match client.download_file(domain, &entry.path).await {
            Ok(bytes) => sink
                .save(&entry.name, bytes)
                .map_err(|e| FileManagerError::Server(format!("could not save download: {e}"))),
            Err(err) => Err(err),
        };
        op.finish(result)
    }

    /// Fetches extended metadata for `entry` and merges it for the properties view.
    ///
    /// # Errors
    ///
    /// Propagates the request failure.
    pub async fn file_properties(
        &self,
        client: &ScopedClient,
        domain: &str,
        entry: &FileEntry,
    ) -> Result<FileProperties, FileManagerError> {
        let info = client.file_info(domain, &entry.path).await?;
        let size = info.size.or(entry.size);
        Ok(FileProperties {
            name: entry.name.clone(),
            path: entry.path.clone(),
            kind: entry.kind,
            size,
            size_label: format_size(size),
            permissions: info.permissions.unwrap_or_else(|| entry.permissions.clone()),
            owner: info.owner.unwrap_or_else(|| entry.owner.clone()),
            group: info.group.unwrap_or_else(|| entry.group.clone()),
            is_symlink: info.is_symlink || entry.is_symlink,
            link_target: info.link_target.or_else(|| entry.link_target.clone()),
            mime_type: info.mime_type,
            modified_at: info.modified_at.or_else(|| entry.modified_at.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use panel_host::{HostApiError, MemoryHostingFs, NeverTimer};
    use pretty_assertions::assert_eq;

    use super::*;

    fn fixture() -> (MemoryHostingFs, ScopedClient) {
        let fs = MemoryHostingFs::default();
        fs.add_domain("example.com", "exmpl")
            .insert_file("example.com", "docs/a.txt", "a")
            .insert_file("example.com", "docs/b.txt", "bb")
            .insert_file("example.com", "docs/c.txt", "ccc");
        let client = ScopedClient::new(Rc::new(fs.clone()), Rc::new(NeverTimer), 30_000);
        (fs, client)
    }

    fn entry(path: &str) -> FileEntry {
        FileEntry::new(path, FileKind::from_name(path))
    }

    #[test]
    fn create_directory_validates_name_before_requesting() {
        let (fs, client) = fixture();
        let coordinator = FileOperationCoordinator::default();
        let op = block_on(coordinator.create_directory(&client, "example.com", "docs", "  "));
        assert!(matches!(op.error(), Some(FileManagerError::Validation(_))));
        assert_eq!(fs.call_count("create_directory"), 0);

        let op = block_on(coordinator.create_directory(&client, "example.com", "docs", "img"));
        assert_eq!(op.outcome, OperationOutcome::Succeeded);
        assert!(op.should_refresh());
        assert!(fs.exists("example.com", "docs/img"));
    }

    #[test]
    fn upload_batch_fails_as_a_whole_without_rollback() {
        let (fs, client) = fixture();
        fs.fail_path("docs/bad.bin", HostApiError::Server("quota exceeded".to_string()));
        let coordinator = FileOperationCoordinator::default();
        let files = vec![
            UploadFile::new("good.bin", vec![1, 2]),
            UploadFile::new("bad.bin", vec![3]),
        ];
        let op = block_on(coordinator.upload_files(&client, "example.com", "docs", &files));
        assert_eq!(
            op.error(),
            Some(&FileManagerError::BatchPartialFailure {
                failed: 1,
                total: 2,
                first: "quota exceeded".to_string(),
            })
        );
        assert!(!op.should_refresh());
        assert!(fs.exists("example.com", "docs/good.bin"));
        assert_eq!(fs.call_count("upload_file"), 2);
    }

    #[test]
    fn rename_skips_empty_or_unchanged_names() {
        let (fs, client) = fixture();
        let coordinator = FileOperationCoordinator::default();
        for new_name in ["", "   ", "a.txt"] {
            let op = block_on(coordinator.rename_item(&client, "example.com", "docs", "a.txt", new_name));
            assert_eq!(op.outcome, OperationOutcome::Skipped, "new_name={new_name:?}");
        }
        assert_eq!(fs.call_count("rename_item"), 0);

        let op = block_on(coordinator.rename_item(&client, "example.com", "docs", "a.txt", "z.txt"));
        assert_eq!(op.targets, vec!["docs/a.txt".to_string(), "docs/z.txt".to_string()]);
        assert!(op.should_refresh());
        assert!(fs.exists("example.com", "docs/z.txt"));
    }

    #[test]
    fn batch_delete_failure_keeps_dialog_open_with_one_error() {
        let (fs, client) = fixture();
        fs.fail_path("docs/b.txt", HostApiError::Server("locked".to_string()));
        let mut coordinator = FileOperationCoordinator::default();
        coordinator
            .request_delete(vec![entry("docs/a.txt"), entry("docs/b.txt"), entry("docs/c.txt")])
            .expect("open dialog");

        let op = block_on(coordinator.confirm_delete(&client, "example.com"));
        assert!(!op.should_refresh());
        assert!(matches!(
            op.error(),
            Some(FileManagerError::BatchPartialFailure { failed: 1, total: 3, .. })
        ));
        let dialog = coordinator.delete_dialog().expect("dialog stays open");
        assert_eq!(dialog.targets.len(), 3);
        assert!(dialog.error.is_some());
        assert_eq!(fs.call_count("delete_item"), 3);
    }

    #[test]
    fn successful_delete_closes_dialog() {
        let (fs, client) = fixture();
        let mut coordinator = FileOperationCoordinator::default();
        assert!(coordinator.request_delete(Vec::new()).is_err());
        coordinator
            .request_delete(vec![entry("docs/a.txt")])
            .expect("open dialog");
        let op = block_on(coordinator.confirm_delete(&client, "example.com"));
        assert!(op.should_refresh());
        assert!(coordinator.delete_dialog().is_none());
        assert!(!fs.exists("example.com", "docs/a.txt"));
    }

    #[test]
    fn download_hands_bytes_to_sink_and_rejects_folders() {
        let (_fs, client) = fixture();
        let coordinator = FileOperationCoordinator::default();
        let sink = MemoryDownloadSink::default();
        let op = block_on(coordinator.download(&client, "example.com", &entry("docs/b.txt"), &sink));
        assert_eq!(op.outcome, OperationOutcome::Succeeded);
        assert!(!op.should_refresh());
        assert_eq!(sink.saved(), vec![("b.txt".to_string(), b"bb".to_vec())]);

        let folder = FileEntry::new("docs", FileKind::Folder);
        let op = block_on(coordinator.download(&client, "example.com", &folder, &sink));
        assert!(matches!(op.error(), Some(FileManagerError::Validation(_))));
    }

    #[test]
    fn properties_merge_info_with_entry() {
        let (_fs, client) = fixture();
        let coordinator = FileOperationCoordinator::default();
        let props = block_on(coordinator.file_properties(&client, "example.com", &entry("docs/c.txt")))
            .expect("properties");
        assert_eq!(props.size, Some(3));
        assert_eq!(props.size_label, "3 B");
        assert_eq!(props.owner, "exmpl");

        let err = block_on(coordinator.file_properties(&client, "example.com", &entry("docs/none")))
            .expect_err("missing");
        assert!(err.is_not_found());
    }

    #[test]
    fn format_size_uses_binary_units() {
        assert_eq!(format_size(None), "-");
        assert_eq!(format_size(Some(0)), "0 B");
        assert_eq!(format_size(Some(1536)), "1.5 KB");
        assert_eq!(format_size(Some(5 * 1024 * 1024)), "5.0 MB");
    }
}
