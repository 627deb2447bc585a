//! Hosting-panel File Manager: directory navigation, selection, clipboard, batch operations,
//! and an embedded text-editing session against a domain-scoped filesystem API.
//!
//! [`FileManagerSession`] owns every piece of session state (scope, listing, selection,
//! clipboard, delete dialog, editor, context menu, notices) and is the entry point for UI
//! glue. The individual controllers are public so hosts can drive or test them in isolation.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod client;
pub mod clipboard;
pub mod config;
pub mod context_menu;
pub mod domain_scope;
pub mod editor;
pub mod error;
pub mod listing;
pub mod notice;
pub mod operations;
pub mod selection;
pub mod session;

pub use client::ScopedClient;
pub use clipboard::{next_copy_name, ClipboardAction, ClipboardController, ClipboardItem};
pub use config::{ConfigError, FileManagerConfig, FileManagerPrefs, FILE_MANAGER_PREFS_KEY};
pub use context_menu::{
    ContextMenu, ContextMenuController, DismissReason, MenuItem, MenuItemState, Point, Viewport,
};
pub use domain_scope::{DomainScopeResolver, UserRole};
pub use editor::{
    language_for, ContentEditorSession, EditorHost, EditorSession, EditorState, EditorWidget,
    HeadlessEditorWidget, OpenTicket, SaveOutcome, SaveTicket, WidgetFault, WidgetStatus,
    MAX_RECORDED_FAULTS,
};
pub use error::FileManagerError;
pub use listing::{DirectoryListingController, ListingOutcome, ListingState, ListingTicket};
pub use notice::{Notice, NoticeBoard, NoticeSource, RetryAction};
pub use operations::{
    format_size, DeleteDialog, DownloadSink, FileOperationCoordinator, FileProperties,
    MemoryDownloadSink, OperationKind, OperationOutcome, PendingOperation,
};
pub use selection::{ClickModifier, SelectionEffect, SelectionManager};
pub use session::{FileManagerSession, MenuFollowUp, SessionServices};
