//! Timeout-bounded, envelope-normalizing facade over a [`HostingFsService`].

use std::rc::Rc;

use panel_host::{
    parse_listing, parse_read_content, with_timeout, DirectoryListing, DomainStructure, FileInfo,
    HostApiError, HostingFsFuture, HostingFsService, Timer, UploadFile, UserDomain,
};
use tracing::{debug, warn};

use crate::error::FileManagerError;

#[derive(Clone)]
/// Shared transport handle used by every controller of one session.
///
/// Each call is raced against the session timer and typed at this single boundary, so
/// controllers never see raw envelopes or transport errors.
pub struct ScopedClient {
    service: Rc<dyn HostingFsService>,
    timer: Rc<dyn Timer>,
    timeout_ms: u64,
}

impl ScopedClient {
    /// Creates a client bounding every request by `timeout_ms`.
    pub fn new(service: Rc<dyn HostingFsService>, timer: Rc<dyn Timer>, timeout_ms: u64) -> Self {
        Self {
            service,
            timer,
            timeout_ms,
        }
    }

    /// Returns the request timeout in milliseconds.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        request: HostingFsFuture<'_, Result<T, HostApiError>>,
    ) -> Result<T, FileManagerError> {
        match with_timeout(self.timer.as_ref(), self.timeout_ms, request).await {
            Some(Ok(value)) => Ok(value),
            Some(Err(err)) => {
                warn!(op, error = %err, "hosting request failed");
                Err(err.into())
            }
            None => {
                warn!(op, timeout_ms = self.timeout_ms, "hosting request timed out");
                Err(FileManagerError::Timeout(self.timeout_ms))
            }
        }
    }

    /// Lists `path` in `domain` and normalizes the response envelope.
    pub async fn list_directory(
        &self,
        domain: &str,
        path: &str,
    ) -> Result<DirectoryListing, FileManagerError> {
        debug!(domain, path, "listing directory");
        let raw = self
            .bounded("list_directory", self.service.list_directory(path, domain))
            .await?;
        let (shape, listing) = parse_listing(raw, domain, path)?;
        debug!(?shape, entries = listing.entries.len(), "listing parsed");
        Ok(listing)
    }

    /// Reads a text file and extracts its content from the response envelope.
    pub async fn read_text(&self, domain: &str, path: &str) -> Result<String, FileManagerError> {
        debug!(domain, path, "reading file");
        let raw = self
            .bounded("read_file", self.service.read_file(path, domain))
            .await?;
        Ok(parse_read_content(raw)?)
    }

    /// Writes a text file.
    pub async fn write_text(
        &self,
        domain: &str,
        path: &str,
        content: &str,
    ) -> Result<(), FileManagerError> {
        self.bounded("write_file", self.service.write_file(path, content, domain))
            .await
    }

    /// Creates a directory.
    pub async fn create_directory(&self, domain: &str, path: &str) -> Result<(), FileManagerError> {
        self.bounded("create_directory", self.service.create_directory(path, domain))
            .await
    }

    /// Uploads one file into the directory at `path`.
    pub async fn upload_file(
        &self,
        domain: &str,
        path: &str,
        file: &UploadFile,
    ) -> Result<(), FileManagerError> {
        self.bounded("upload_file", self.service.upload_file(path, file, domain))
            .await
    }

    /// Fetches a file's raw bytes.
    pub async fn download_file(&self, domain: &str, path: &str) -> Result<Vec<u8>, FileManagerError> {
        self.bounded("download_file", self.service.download_file(path, domain))
            .await
    }

    /// Renames or moves an item.
    pub async fn rename_item(
        &self,
        domain: &str,
        old_path: &str,
        new_path: &str,
    ) -> Result<(), FileManagerError> {
        self.bounded(
            "rename_item",
            self.service.rename_item(old_path, new_path, domain),
        )
        .await
    }

    /// Duplicates an item server-side.
    pub async fn copy_item(
        &self,
        domain: &str,
        source_path: &str,
        dest_path: &str,
    ) -> Result<(), FileManagerError> {
        self.bounded(
            "copy_item",
            self.service.copy_item(source_path, dest_path, domain),
        )
        .await
    }

    /// Deletes an item.
    pub async fn delete_item(&self, domain: &str, path: &str) -> Result<(), FileManagerError> {
        self.bounded("delete_item", self.service.delete_item(path, domain))
            .await
    }

    /// Fetches extended metadata.
    pub async fn file_info(&self, domain: &str, path: &str) -> Result<FileInfo, FileManagerError> {
        self.bounded("get_file_info", self.service.get_file_info(path, domain))
            .await
    }

    /// Lists the domains the current user may browse.
    pub async fn user_domains(&self) -> Result<Vec<UserDomain>, FileManagerError> {
        self.bounded("get_user_domains", self.service.get_user_domains())
            .await
    }

    /// Describes a domain's directory layout.
    pub async fn domain_structure(&self, domain: &str) -> Result<DomainStructure, FileManagerError> {
        self.bounded(
            "get_domain_structure",
            self.service.get_domain_structure(domain),
        )
        .await
    }
}
