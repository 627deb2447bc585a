//! Typed host contracts and shared models for the hosting-panel file manager.
//!
//! This crate is the API-first boundary between the file manager controllers and the hosting
//! backend. It exposes the domain-scoped filesystem service trait, the response-envelope adapter
//! that normalizes heterogeneous backend payloads, path helpers, the timer capability used for
//! request timeouts, and preference storage. Concrete transports implement [`HostingFsService`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod fs;
pub mod storage;
pub mod timer;

pub use error::HostApiError;
pub use fs::envelope::{parse_listing, parse_read_content, ListingShape};
pub use fs::memory::MemoryHostingFs;
pub use fs::path::{file_name, join_path, normalize_path, parent_path, resolve_path};
pub use fs::service::{HostingFsFuture, HostingFsService, NoopHostingFsService};
pub use fs::types::{
    extension, DirectoryListing, DomainDirectory, DomainScope, DomainStructure, FileEntry, FileInfo,
    FileKind, UploadFile, UserDomain,
};
pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsError, PrefsStore,
    PrefsStoreFuture,
};
pub use timer::{with_timeout, ImmediateTimer, NeverTimer, Timer, TimerFuture};
