//! Session-scoped owner of every file manager controller.
//!
//! One [`FileManagerSession`] exists per opened File Manager. It wires user intents (clicks,
//! menu choices, dialog confirmations) to the controllers, refreshes the listing after
//! successful mutations, and routes failures to exactly one visible place: the notice board,
//! the delete dialog, the editor, or the properties view.

use std::rc::Rc;

use panel_host::{
    load_pref_with, parent_path, save_pref_with, FileEntry, HostingFsService, PrefsStore, Timer,
    UploadFile,
};
use tracing::{debug, info, warn};

use crate::client::ScopedClient;
use crate::clipboard::ClipboardController;
use crate::config::{ConfigError, FileManagerConfig, FileManagerPrefs, FILE_MANAGER_PREFS_KEY};
use crate::context_menu::{
    ContextMenu, ContextMenuController, DismissReason, MenuItem, Point, Viewport,
};
use crate::domain_scope::{DomainScopeResolver, UserRole};
use crate::editor::{ContentEditorSession, EditorHost, EditorWidget, SaveOutcome};
use crate::error::FileManagerError;
use crate::listing::{DirectoryListingController, ListingOutcome};
use crate::notice::{NoticeBoard, NoticeSource, RetryAction};
use crate::operations::{
    DownloadSink, FileOperationCoordinator, FileProperties, OperationKind, PendingOperation,
};
use crate::selection::{ClickModifier, SelectionEffect, SelectionManager};

/// Host capabilities a session runs against.
pub struct SessionServices {
    /// Hosting filesystem transport.
    pub fs: Rc<dyn HostingFsService>,
    /// Timer used to bound requests.
    pub timer: Rc<dyn Timer>,
    /// Per-user preference storage.
    pub prefs: Rc<dyn PrefsStore>,
    /// Client-side save target for downloads.
    pub downloads: Rc<dyn DownloadSink>,
    /// Code-editing widget.
    pub widget: Box<dyn EditorWidget>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// UI follow-up required after a context menu choice.
pub enum MenuFollowUp {
    /// Nothing else to do.
    None,
    /// Ask the user for a new name for this entry.
    PromptRename(FileEntry),
    /// The delete dialog is open and awaits confirmation.
    ConfirmDelete,
    /// Render a preview of this non-text entry.
    Preview(FileEntry),
}

/// File manager state for one user session.
pub struct FileManagerSession {
    config: FileManagerConfig,
    client: ScopedClient,
    prefs_store: Rc<dyn PrefsStore>,
    prefs: FileManagerPrefs,
    downloads: Rc<dyn DownloadSink>,
    scope: DomainScopeResolver,
    listing: DirectoryListingController,
    selection: SelectionManager,
    clipboard: ClipboardController,
    operations: FileOperationCoordinator,
    editor: ContentEditorSession,
    editor_host: EditorHost,
    context_menu: ContextMenuController,
    notices: NoticeBoard,
    properties: Option<FileProperties>,
    properties_error: Option<FileManagerError>,
}

impl FileManagerSession {
    /// Creates an idle session; call [`FileManagerSession::start`] to load domains.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `config` fails validation.
    pub fn new(
        config: FileManagerConfig,
        role: UserRole,
        services: SessionServices,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = ScopedClient::new(services.fs, services.timer, config.request_timeout_ms);
        let mut listing = DirectoryListingController::default();
        listing.set_show_hidden(config.show_hidden);
        Ok(Self {
            config,
            client,
            prefs_store: services.prefs,
            prefs: FileManagerPrefs::default(),
            downloads: services.downloads,
            scope: DomainScopeResolver::new(role),
            listing,
            selection: SelectionManager::default(),
            clipboard: ClipboardController::default(),
            operations: FileOperationCoordinator::default(),
            editor: ContentEditorSession::default(),
            editor_host: EditorHost::new(services.widget),
            context_menu: ContextMenuController::default(),
            notices: NoticeBoard::default(),
            properties: None,
            properties_error: None,
        })
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &FileManagerConfig {
        &self.config
    }

    /// Returns the shared transport handle.
    pub fn client(&self) -> &ScopedClient {
        &self.client
    }

    /// Returns the domain scope gate.
    pub fn scope(&self) -> &DomainScopeResolver {
        &self.scope
    }

    /// Returns the current-directory controller.
    pub fn listing(&self) -> &DirectoryListingController {
        &self.listing
    }

    /// Returns the selection state.
    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Returns the clipboard.
    pub fn clipboard(&self) -> &ClipboardController {
        &self.clipboard
    }

    /// Returns the operation coordinator and its delete dialog.
    pub fn operations(&self) -> &FileOperationCoordinator {
        &self.operations
    }

    /// Returns the editing state machine.
    pub fn editor(&self) -> &ContentEditorSession {
        &self.editor
    }

    /// Returns the supervised editor widget.
    pub fn editor_host(&self) -> &EditorHost {
        &self.editor_host
    }

    /// Returns the context menu state.
    pub fn context_menu(&self) -> &ContextMenuController {
        &self.context_menu
    }

    /// Returns the visible notices.
    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Returns the properties view contents.
    pub fn properties(&self) -> Option<&FileProperties> {
        self.properties.as_ref()
    }

    /// Returns the inline error of the properties view.
    pub fn properties_error(&self) -> Option<&FileManagerError> {
        self.properties_error.as_ref()
    }

    /// Number of errors currently visible anywhere in the file manager.
    pub fn visible_errors(&self) -> usize {
        let dialog = self
            .operations
            .delete_dialog()
            .is_some_and(|dialog| dialog.error.is_some());
        self.notices.len()
            + usize::from(dialog)
            + usize::from(self.editor.save_error().is_some())
            + usize::from(self.properties_error.is_some())
    }

    /// Loads preferences and domains, restores the last domain, and lists its root.
    pub async fn start(&mut self) {
        match load_pref_with::<_, FileManagerPrefs>(self.prefs_store.as_ref(), FILE_MANAGER_PREFS_KEY)
            .await
        {
            Ok(Some(prefs)) => self.prefs = prefs,
            Ok(None) => {}
            Err(err) => warn!(error = %err, "file manager preferences unavailable"),
        }
        if let Some(show_hidden) = self.prefs.show_hidden {
            self.listing.set_show_hidden(show_hidden);
        }
        if self.load_domains().await.is_ok() {
            self.reload().await;
        }
    }

    async fn load_domains(&mut self) -> Result<(), FileManagerError> {
        self.notices.clear_source(NoticeSource::Domains);
        let mut scope = match self.scope.load(&self.client).await {
            Ok(scope) => scope,
            Err(err) => {
                self.notices
                    .push(NoticeSource::Domains, err.clone(), Some(RetryAction::LoadDomains));
                return Err(err);
            }
        };
        if let Some(last) = self.prefs.last_domain.clone() {
            if last != scope.domain {
                match self.scope.select(&self.client, &last).await {
                    Ok(restored) => scope = restored,
                    Err(err) => debug!(domain = %last, error = %err, "not restoring last domain"),
                }
            }
        }
        self.listing.set_domain(&scope.domain);
        Ok(())
    }

    /// Switches to `domain`, resetting the path and selection. The clipboard is kept.
    ///
    /// # Errors
    ///
    /// Returns the rejection, which is also shown as a notice.
    pub async fn select_domain(&mut self, domain: &str) -> Result<(), FileManagerError> {
        let scope = match self.scope.select(&self.client, domain).await {
            Ok(scope) => scope,
            Err(err) => {
                self.notices.push(NoticeSource::Domains, err.clone(), None);
                return Err(err);
            }
        };
        self.context_menu.dismiss(DismissReason::ItemChosen);
        self.selection.clear();
        self.listing.set_domain(&scope.domain);
        self.prefs.last_domain = Some(scope.domain);
        self.persist_prefs().await;
        self.reload().await;
        Ok(())
    }

    /// Lists the current directory, following not-found fallbacks up the tree.
    pub async fn reload(&mut self) {
        if !self.scope.can_list() {
            debug!("listing skipped until a domain scope is resolved");
            return;
        }
        self.selection.clear();
        self.notices.clear_source(NoticeSource::Listing);
        loop {
            match self.listing.load(&self.client).await {
                ListingOutcome::Applied | ListingOutcome::Stale => break,
                ListingOutcome::Retargeted { .. } => continue,
                ListingOutcome::Failed(err) => {
                    self.notices.push(
                        NoticeSource::Listing,
                        err,
                        Some(RetryAction::ReloadListing),
                    );
                    break;
                }
            }
        }
    }

    /// Moves to `path` and lists it.
    pub async fn navigate(&mut self, path: &str) {
        self.context_menu.dismiss(DismissReason::ItemChosen);
        self.listing.navigate(path);
        self.reload().await;
    }

    /// Moves to the parent directory.
    pub async fn navigate_up(&mut self) {
        let parent = parent_path(self.listing.current_path());
        self.navigate(&parent).await;
    }

    /// Applies a click on a listing entry.
    pub async fn click(&mut self, entry: &FileEntry, modifier: ClickModifier) {
        match self.selection.click(entry, modifier) {
            SelectionEffect::None => {}
            SelectionEffect::Navigate(path) => self.navigate(&path).await,
            SelectionEffect::OpenEditor(entry) => self.open_editor(&entry).await,
        }
    }

    /// Selects every entry of the current listing.
    pub fn select_all(&mut self) {
        if let Some(listing) = self.listing.listing() {
            self.selection.select_all(listing);
        }
    }

    /// Shows or hides hidden entries and remembers the choice.
    pub async fn set_show_hidden(&mut self, show_hidden: bool) {
        self.listing.set_show_hidden(show_hidden);
        self.prefs.show_hidden = Some(show_hidden);
        self.persist_prefs().await;
    }

    async fn persist_prefs(&self) {
        if let Err(err) =
            save_pref_with(self.prefs_store.as_ref(), FILE_MANAGER_PREFS_KEY, &self.prefs).await
        {
            warn!(error = %err, "failed to save file manager preferences");
        }
    }

    async fn conclude(&mut self, op: PendingOperation) -> PendingOperation {
        if let Some(err) = op.error() {
            self.notices.push(NoticeSource::Operation, err.clone(), None);
        }
        if op.should_refresh() {
            self.reload().await;
        }
        op
    }

    fn current_target(&self) -> (String, String) {
        (
            self.listing.domain().to_string(),
            self.listing.current_path().to_string(),
        )
    }

    /// Puts `entry` on the clipboard for copying.
    pub fn copy_entry(&mut self, entry: &FileEntry) {
        self.clipboard.copy(self.listing.domain(), entry);
    }

    /// Puts `entry` on the clipboard for moving.
    pub fn cut_entry(&mut self, entry: &FileEntry) {
        self.clipboard.cut(self.listing.domain(), entry);
    }

    /// Pastes the clipboard into the current directory.
    pub async fn paste(&mut self) -> PendingOperation {
        let op = match self.listing.listing().cloned() {
            Some(listing) => {
                self.clipboard
                    .paste(&self.client, &listing, &self.config.copy_suffix)
                    .await
            }
            None => PendingOperation::new(OperationKind::Copy, Vec::new())
                .finish(Err(FileManagerError::validation(
                    "wait for the directory to finish loading",
                ))),
        };
        self.conclude(op).await
    }

    /// Creates a folder named `name` in the current directory.
    pub async fn create_directory(&mut self, name: &str) -> PendingOperation {
        let (domain, path) = self.current_target();
        let op = self
            .operations
            .create_directory(&self.client, &domain, &path, name)
            .await;
        self.conclude(op).await
    }

    /// Uploads `files` into the current directory.
    pub async fn upload(&mut self, files: &[UploadFile]) -> PendingOperation {
        let (domain, path) = self.current_target();
        let op = self
            .operations
            .upload_files(&self.client, &domain, &path, files)
            .await;
        self.conclude(op).await
    }

    /// Renames `entry` within the current directory.
    pub async fn rename(&mut self, entry: &FileEntry, new_name: &str) -> PendingOperation {
        let (domain, path) = self.current_target();
        let op = self
            .operations
            .rename_item(&self.client, &domain, &path, &entry.name, new_name)
            .await;
        self.conclude(op).await
    }

    /// Opens the delete dialog for the current selection.
    ///
    /// # Errors
    ///
    /// Returns [`FileManagerError::Validation`] when nothing is selected.
    pub fn request_delete(&mut self) -> Result<(), FileManagerError> {
        let targets = self.selection.targets(self.listing.listing());
        self.operations.request_delete(targets)
    }

    /// Deletes the dialog's targets. Failures stay inside the open dialog.
    pub async fn confirm_delete(&mut self) -> PendingOperation {
        let domain = self.listing.domain().to_string();
        let op = self.operations.confirm_delete(&self.client, &domain).await;
        if op.should_refresh() {
            self.selection.clear();
            self.reload().await;
        }
        op
    }

    /// Closes the delete dialog.
    pub fn cancel_delete(&mut self) {
        self.operations.cancel_delete();
    }

    /// Downloads `entry` to the session's download sink.
    pub async fn download(&mut self, entry: &FileEntry) -> PendingOperation {
        let domain = self.listing.domain().to_string();
        let op = self
            .operations
            .download(&self.client, &domain, entry, self.downloads.as_ref())
            .await;
        self.conclude(op).await
    }

    /// Loads the properties view for `entry`; a failure is shown inside the view.
    pub async fn show_properties(&mut self, entry: &FileEntry) {
        let domain = self.listing.domain().to_string();
        self.properties = None;
        self.properties_error = None;
        match self
            .operations
            .file_properties(&self.client, &domain, entry)
            .await
        {
            Ok(properties) => self.properties = Some(properties),
            Err(err) => self.properties_error = Some(err),
        }
    }

    /// Closes the properties view.
    pub fn close_properties(&mut self) {
        self.properties = None;
        self.properties_error = None;
    }

    /// Opens `entry` in the editor and mounts the widget.
    pub async fn open_editor(&mut self, entry: &FileEntry) {
        self.editor_host.dispose();
        self.notices.clear_source(NoticeSource::Editor);
        self.notices.clear_source(NoticeSource::EditorWidget);
        let domain = self.listing.domain().to_string();
        if let Err(err) = self
            .editor
            .open(&self.client, &domain, entry, &self.config.editor_language_fallback)
            .await
        {
            let retry = match err {
                FileManagerError::Validation(_) => None,
                _ => Some(RetryAction::OpenEditor(entry.clone())),
            };
            self.notices.push(NoticeSource::Editor, err, retry);
            return;
        }
        let Some(session) = self.editor.session() else {
            return;
        };
        if let Err(fault) = self.editor_host.mount(&session.buffer, &session.language) {
            self.notices.push(
                NoticeSource::EditorWidget,
                fault.into(),
                Some(RetryAction::RemountEditorWidget),
            );
        }
    }

    /// Replaces the editor buffer.
    pub fn edit_buffer(&mut self, content: &str) {
        self.editor.edit(content);
        if let Err(fault) = self.editor_host.update(content) {
            self.notices.push(
                NoticeSource::EditorWidget,
                fault.into(),
                Some(RetryAction::RemountEditorWidget),
            );
        }
    }

    /// Saves the editor buffer; success closes the editor and refreshes the listing.
    pub async fn save_editor(&mut self) -> SaveOutcome {
        let outcome = self.editor.save(&self.client).await;
        match &outcome {
            SaveOutcome::Saved => {
                self.editor_host.dispose();
                self.notices.clear_source(NoticeSource::EditorWidget);
                self.reload().await;
            }
            SaveOutcome::SavedAfterClose => self.reload().await,
            SaveOutcome::Failed(_) => {}
            SaveOutcome::FailedAfterClose(err) | SaveOutcome::Rejected(err) => {
                self.notices.push(NoticeSource::Editor, err.clone(), None);
            }
        }
        outcome
    }

    /// Closes the editor, discarding unsaved edits.
    pub fn close_editor(&mut self) {
        self.editor.close();
        self.editor_host.dispose();
        self.notices.clear_source(NoticeSource::EditorWidget);
    }

    /// Remounts a faulted editor widget.
    ///
    /// # Errors
    ///
    /// Returns the widget fault when the remount fails again; it is also shown as a notice.
    pub fn retry_editor_widget(&mut self) -> Result<(), FileManagerError> {
        self.notices.clear_source(NoticeSource::EditorWidget);
        match self.editor_host.retry() {
            Ok(()) => Ok(()),
            Err(fault) => {
                let err = FileManagerError::from(fault);
                self.notices.push(
                    NoticeSource::EditorWidget,
                    err.clone(),
                    Some(RetryAction::RemountEditorWidget),
                );
                Err(err)
            }
        }
    }

    /// Opens the context menu over `entry`, making it the active selection.
    pub fn open_context_menu(
        &mut self,
        entry: &FileEntry,
        at: Point,
        viewport: Viewport,
    ) -> &ContextMenu {
        self.selection.set_active(entry);
        let has_clipboard = !self.clipboard.is_empty();
        self.context_menu.open(entry, at, viewport, has_clipboard)
    }

    /// Forwards a pointer press to the context menu.
    pub fn pointer_down(&mut self, at: Point) -> bool {
        self.context_menu.pointer_down(at)
    }

    /// Closes the context menu on scroll.
    pub fn on_scroll(&mut self) -> bool {
        self.context_menu.on_scroll()
    }

    /// Closes the context menu on viewport resize.
    pub fn on_resize(&mut self) -> bool {
        self.context_menu.on_resize()
    }

    /// Runs a context menu command.
    pub async fn choose_menu_item(&mut self, item: MenuItem) -> MenuFollowUp {
        let Some(entry) = self.context_menu.choose(item) else {
            return MenuFollowUp::None;
        };
        debug!(?item, path = %entry.path, "context menu command");
        match item {
            MenuItem::Open => {
                self.click(&entry, ClickModifier::None).await;
                MenuFollowUp::None
            }
            MenuItem::Preview if entry.is_text() => {
                self.open_editor(&entry).await;
                MenuFollowUp::None
            }
            MenuItem::Preview => MenuFollowUp::Preview(entry),
            MenuItem::Download => {
                self.download(&entry).await;
                MenuFollowUp::None
            }
            MenuItem::Rename => MenuFollowUp::PromptRename(entry),
            MenuItem::Copy => {
                self.copy_entry(&entry);
                MenuFollowUp::None
            }
            MenuItem::Cut => {
                self.cut_entry(&entry);
                MenuFollowUp::None
            }
            MenuItem::Paste => {
                self.paste().await;
                MenuFollowUp::None
            }
            MenuItem::Delete => match self.operations.request_delete(vec![entry]) {
                Ok(()) => MenuFollowUp::ConfirmDelete,
                Err(err) => {
                    self.notices.push(NoticeSource::Operation, err, None);
                    MenuFollowUp::None
                }
            },
            MenuItem::Properties => {
                self.show_properties(&entry).await;
                MenuFollowUp::None
            }
        }
    }

    /// Hides a notice.
    pub fn dismiss_notice(&mut self, id: u64) -> bool {
        self.notices.dismiss(id)
    }

    /// Hides a notice and runs its retry action, if it has one.
    pub async fn retry_notice(&mut self, id: u64) {
        let Some(action) = self.notices.take_retry(id) else {
            return;
        };
        info!(?action, "retrying after notice");
        match action {
            RetryAction::LoadDomains => {
                if self.load_domains().await.is_ok() {
                    self.reload().await;
                }
            }
            RetryAction::ReloadListing => self.reload().await,
            RetryAction::OpenEditor(entry) => self.open_editor(&entry).await,
            RetryAction::RemountEditorWidget => {
                if let Err(err) = self.retry_editor_widget() {
                    debug!(error = %err, "editor widget remount failed again");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use panel_host::{HostApiError, MemoryHostingFs, MemoryPrefsStore, NeverTimer};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::editor::{EditorState, HeadlessEditorWidget};
    use crate::operations::{MemoryDownloadSink, OperationOutcome};

    fn session_with(
        fs: &MemoryHostingFs,
        role: UserRole,
        prefs: MemoryPrefsStore,
        widget: HeadlessEditorWidget,
    ) -> FileManagerSession {
        let services = SessionServices {
            fs: Rc::new(fs.clone()),
            timer: Rc::new(NeverTimer),
            prefs: Rc::new(prefs),
            downloads: Rc::new(MemoryDownloadSink::default()),
            widget: Box::new(widget),
        };
        FileManagerSession::new(FileManagerConfig::default(), role, services).expect("session")
    }

    fn fixture() -> MemoryHostingFs {
        let fs = MemoryHostingFs::default();
        fs.add_domain("example.com", "exmpl")
            .add_domain("second.org", "scnd")
            .insert_file("example.com", "public_html/index.html", "<h1>hi</h1>")
            .insert_file("example.com", ".env", "SECRET=1")
            .insert_file("second.org", "readme.txt", "second");
        fs
    }

    #[test]
    fn start_lists_first_domain_for_members() {
        let fs = fixture();
        let mut session = session_with(
            &fs,
            UserRole::Member,
            MemoryPrefsStore::default(),
            HeadlessEditorWidget::default(),
        );
        block_on(session.start());
        assert_eq!(session.listing().domain(), "example.com");
        let names: Vec<&str> = session
            .listing()
            .visible_entries()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["public_html"]);
        assert_eq!(session.visible_errors(), 0);
    }

    #[test]
    fn domain_choice_and_hidden_toggle_persist() {
        let fs = fixture();
        let prefs = MemoryPrefsStore::default();
        let mut session = session_with(
            &fs,
            UserRole::Member,
            prefs.clone(),
            HeadlessEditorWidget::default(),
        );
        block_on(session.start());
        block_on(session.select_domain("second.org")).expect("switch");
        block_on(session.set_show_hidden(true));

        let mut restored = session_with(
            &fs,
            UserRole::Member,
            prefs,
            HeadlessEditorWidget::default(),
        );
        block_on(restored.start());
        assert_eq!(restored.listing().domain(), "second.org");
        assert!(restored.listing().show_hidden());
    }

    #[test]
    fn unavailable_prefs_store_still_lists_defaults() {
        let fs = fixture();
        let prefs = MemoryPrefsStore::default();
        prefs.fail_with("storage disabled");
        let mut session = session_with(
            &fs,
            UserRole::Member,
            prefs.clone(),
            HeadlessEditorWidget::default(),
        );
        block_on(session.start());
        assert_eq!(session.listing().domain(), "example.com");
        assert!(session.listing().listing().is_some());

        block_on(session.set_show_hidden(true));
        assert!(session.listing().show_hidden());
        assert_eq!(session.visible_errors(), 0);
        assert_eq!(prefs.raw(FILE_MANAGER_PREFS_KEY), None);
    }

    #[test]
    fn successful_upload_refreshes_listing_once() {
        let fs = fixture();
        let mut session = session_with(
            &fs,
            UserRole::Member,
            MemoryPrefsStore::default(),
            HeadlessEditorWidget::default(),
        );
        block_on(session.start());
        block_on(session.navigate("public_html"));
        let lists_before = fs.call_count("list_directory");

        let files = [
            UploadFile::new("style.css", b"body {}".to_vec()),
            UploadFile::new("app.js", b"main()".to_vec()),
        ];
        let op = block_on(session.upload(&files));

        assert_eq!(op.outcome, OperationOutcome::Succeeded);
        assert_eq!(fs.call_count("list_directory"), lists_before + 1);
        assert_eq!(
            fs.file_text("example.com", "public_html/app.js").as_deref(),
            Some("main()")
        );
        let names: Vec<&str> = session
            .listing()
            .visible_entries()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["app.js", "index.html", "style.css"]);
        assert_eq!(session.visible_errors(), 0);
    }

    #[test]
    fn listing_failure_posts_retryable_notice() {
        let fs = fixture();
        fs.fail_path("", HostApiError::Server("backend down".to_string()));
        let mut session = session_with(
            &fs,
            UserRole::Member,
            MemoryPrefsStore::default(),
            HeadlessEditorWidget::default(),
        );
        block_on(session.start());
        let notice = session.notices().latest().expect("notice").clone();
        assert_eq!(notice.retry, Some(RetryAction::ReloadListing));

        fs.clear_faults();
        block_on(session.retry_notice(notice.id));
        assert!(session.notices().is_empty());
        assert!(session.listing().listing().is_some());
    }

    #[test]
    fn widget_fault_is_retryable_without_losing_the_buffer() {
        let fs = fixture();
        let widget = HeadlessEditorWidget::default();
        widget.fail_next_open("assets not loaded");
        let mut session = session_with(
            &fs,
            UserRole::Member,
            MemoryPrefsStore::default(),
            widget.clone(),
        );
        block_on(session.start());
        block_on(session.navigate("public_html"));
        let entry = session
            .listing()
            .listing()
            .and_then(|l| l.find("index.html"))
            .cloned()
            .expect("entry");
        block_on(session.click(&entry, ClickModifier::None));

        assert_eq!(session.editor().state(), EditorState::Open);
        let notice = session.notices().latest().expect("notice").clone();
        assert_eq!(notice.source, NoticeSource::EditorWidget);
        block_on(session.retry_notice(notice.id));
        assert!(widget.is_mounted());
        assert_eq!(widget.content(), "<h1>hi</h1>");
        assert!(session.notices().is_empty());
    }

    #[test]
    fn context_menu_delete_opens_dialog_for_entry() {
        let fs = fixture();
        let mut session = session_with(
            &fs,
            UserRole::Member,
            MemoryPrefsStore::default(),
            HeadlessEditorWidget::default(),
        );
        block_on(session.start());
        block_on(session.set_show_hidden(true));
        let env = session
            .listing()
            .listing()
            .and_then(|l| l.find(".env"))
            .cloned()
            .expect("entry");
        session.open_context_menu(&env, Point::new(40, 40), Viewport { w: 800, h: 600 });
        assert_eq!(session.selection().active(), Some(&env));

        assert_eq!(
            block_on(session.choose_menu_item(MenuItem::Delete)),
            MenuFollowUp::ConfirmDelete
        );
        assert!(!session.context_menu().is_open());
        let op = block_on(session.confirm_delete());
        assert!(op.should_refresh());
        assert!(!fs.exists("example.com", ".env"));
        assert!(session.selection().is_empty());
    }
}
