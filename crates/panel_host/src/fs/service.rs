//! Domain-scoped filesystem service contract consumed by the file manager.

use std::{future::Future, pin::Pin};

use serde_json::Value;

use crate::error::HostApiError;
use crate::fs::types::{DomainStructure, FileInfo, UploadFile, UserDomain};

/// Object-safe boxed future used by [`HostingFsService`] async methods.
pub type HostingFsFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Hosting backend filesystem API.
///
/// Every call except domain discovery carries the `domain` it is scoped to (`""` for the
/// unscoped system root). Paths are domain-relative. Listing and read payloads are returned raw
/// because the backend answers them with several envelope shapes; callers normalize them with
/// [`parse_listing`](crate::parse_listing) and [`parse_read_content`](crate::parse_read_content).
pub trait HostingFsService {
    /// Lists the directory at `path`.
    fn list_directory<'a>(
        &'a self,
        path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<Value, HostApiError>>;

    /// Reads a text file.
    fn read_file<'a>(
        &'a self,
        path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<Value, HostApiError>>;

    /// Writes a text file, replacing its content.
    fn write_file<'a>(
        &'a self,
        path: &'a str,
        content: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>>;

    /// Creates a directory at `path`.
    fn create_directory<'a>(
        &'a self,
        path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>>;

    /// Uploads `file` into the directory at `path`.
    fn upload_file<'a>(
        &'a self,
        path: &'a str,
        file: &'a UploadFile,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>>;

    /// Fetches the raw bytes of a file.
    fn download_file<'a>(
        &'a self,
        path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<Vec<u8>, HostApiError>>;

    /// Renames or moves an item.
    fn rename_item<'a>(
        &'a self,
        old_path: &'a str,
        new_path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>>;

    /// Duplicates an item server-side.
    fn copy_item<'a>(
        &'a self,
        source_path: &'a str,
        dest_path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>>;

    /// Deletes a file or directory tree.
    fn delete_item<'a>(
        &'a self,
        path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>>;

    /// Fetches extended metadata for the properties view.
    fn get_file_info<'a>(
        &'a self,
        path: &'a str,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<FileInfo, HostApiError>>;

    /// Lists the domains the current user may browse.
    fn get_user_domains<'a>(&'a self) -> HostingFsFuture<'a, Result<Vec<UserDomain>, HostApiError>>;

    /// Describes the well-known directory layout of a domain.
    fn get_domain_structure<'a>(
        &'a self,
        domain: &'a str,
    ) -> HostingFsFuture<'a, Result<DomainStructure, HostApiError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Transport for targets without a hosting backend; every call fails as unsupported.
pub struct NoopHostingFsService;

fn unsupported<'a, T: 'a>(op: &'static str) -> HostingFsFuture<'a, Result<T, HostApiError>> {
    Box::pin(async move { Err(HostApiError::Unsupported(op)) })
}

impl HostingFsService for NoopHostingFsService {
    fn list_directory<'a>(
        &'a self,
        _path: &'a str,
        _domain: &'a str,
    ) -> HostingFsFuture<'a, Result<Value, HostApiError>> {
        unsupported("list_directory")
    }

    fn read_file<'a>(
        &'a self,
        _path: &'a str,
        _domain: &'a str,
    ) -> HostingFsFuture<'a, Result<Value, HostApiError>> {
        unsupported("read_file")
    }

    fn write_file<'a>(
        &'a self,
        _path: &'a str,
        _content: &'a str,
        _domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>> {
        unsupported("write_file")
    }

    fn create_directory<'a>(
        &'a self,
        _path: &'a str,
        _domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>> {
        unsupported("create_directory")
    }

    fn upload_file<'a>(
        &'a self,
        _path: &'a str,
        _file: &'a UploadFile,
        _domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>> {
        unsupported("upload_file")
    }

    fn download_file<'a>(
        &'a self,
        _path: &'a str,
        _domain: &'a str,
    ) -> HostingFsFuture<'a, Result<Vec<u8>, HostApiError>> {
        unsupported("download_file")
    }

    fn rename_item<'a>(
        &'a self,
        _old_path: &'a str,
        _new_path: &'a str,
        _domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>> {
        unsupported("rename_item")
    }

    fn copy_item<'a>(
        &'a self,
        _source_path: &'a str,
        _dest_path: &'a str,
        _domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>> {
        unsupported("copy_item")
    }

    fn delete_item<'a>(
        &'a self,
        _path: &'a str,
        _domain: &'a str,
    ) -> HostingFsFuture<'a, Result<(), HostApiError>> {
        unsupported("delete_item")
    }

    fn get_file_info<'a>(
        &'a self,
        _path: &'a str,
        _domain: &'a str,
    ) -> HostingFsFuture<'a, Result<FileInfo, HostApiError>> {
        unsupported("get_file_info")
    }

    fn get_user_domains<'a>(&'a self) -> HostingFsFuture<'a, Result<Vec<UserDomain>, HostApiError>> {
        unsupported("get_user_domains")
    }

    fn get_domain_structure<'a>(
        &'a self,
        _domain: &'a str,
    ) -> HostingFsFuture<'a, Result<DomainStructure, HostApiError>> {
        unsupported("get_domain_structure")
    }
}
