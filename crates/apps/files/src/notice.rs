//! Inline, dismissable error notices with manual retry actions.

use panel_host::FileEntry;

use crate::error::FileManagerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Area of the file manager that raised a notice.
pub enum NoticeSource {
    /// Domain discovery or selection.
    Domains,
    /// Directory listing.
    Listing,
    /// Create, upload, rename, paste, or download.
    Operation,
    /// Opening a file in the editor.
    Editor,
    /// The embedded editor widget.
    EditorWidget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// User-triggered recovery action attached to a notice.
pub enum RetryAction {
    /// Reload the domain list.
    LoadDomains,
    /// Reload the current directory.
    ReloadListing,
    /// Open the editor on this entry again.
    OpenEditor(FileEntry),
    /// Remount the editor widget.
    RemountEditorWidget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One visible error message.
pub struct Notice {
    /// Stable identifier used to dismiss or retry.
    pub id: u64,
    /// Area that raised the error.
    pub source: NoticeSource,
    /// The error shown to the user.
    pub error: FileManagerError,
    /// Optional manual retry.
    pub retry: Option<RetryAction>,
}

#[derive(Debug, Clone, Default)]
/// Ordered collection of visible notices.
pub struct NoticeBoard {
    notices: Vec<Notice>,
    next_id: u64,
}

impl NoticeBoard {
    /// Adds a notice and returns its id.
    pub fn push(
        &mut self,
        source: NoticeSource,
        error: FileManagerError,
        retry: Option<RetryAction>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.notices.push(Notice {
            id,
            source,
            error,
            retry,
        });
        id
    }

    /// Removes a notice; returns `false` when it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|notice| notice.id != id);
        self.notices.len() != before
    }

    /// Removes a notice and returns its retry action, if any.
    pub fn take_retry(&mut self, id: u64) -> Option<RetryAction> {
        let idx = self.notices.iter().position(|notice| notice.id == id)?;
        self.notices.remove(idx).retry
    }

    /// Removes every notice raised by `source`.
    pub fn clear_source(&mut self, source: NoticeSource) {
        self.notices.retain(|notice| notice.source != source);
    }

    /// Returns the visible notices, oldest first.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Returns the newest notice.
    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }

    /// Number of visible notices.
    pub fn len(&self) -> usize {
        self.notices.len()
    }

    /// Returns `true` when nothing is shown.
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_dismiss_and_take_retry() {
        let mut board = NoticeBoard::default();
        let listing = board.push(
            NoticeSource::Listing,
            FileManagerError::Timeout(30_000),
            Some(RetryAction::ReloadListing),
        );
        let op = board.push(
            NoticeSource::Operation,
            FileManagerError::validation("name required"),
            None,
        );
        assert_eq!(board.len(), 2);
        assert_eq!(board.latest().map(|n| n.id), Some(op));

        assert_eq!(board.take_retry(listing), Some(RetryAction::ReloadListing));
        assert_eq!(board.take_retry(listing), None);
        assert!(board.dismiss(op));
        assert!(!board.dismiss(op));
        assert!(board.is_empty());
    }

    #[test]
    fn clear_source_only_touches_that_source() {
        let mut board = NoticeBoard::default();
        board.push(NoticeSource::Listing, FileManagerError::Timeout(1), None);
        board.push(
            NoticeSource::Editor,
            FileManagerError::Server("x".to_string()),
            None,
        );
        board.clear_source(NoticeSource::Listing);
        assert_eq!(board.len(), 1);
        assert_eq!(board.notices()[0].source, NoticeSource::Editor);
    }
}
