//! Embedded text-editing session and the supervised editor widget host.
//!
//! [`ContentEditorSession`] owns the editing state machine
//! `Closed -> Opening -> Open -> {Saving -> Open | Closed}`. The buffer is private to the
//! session and discarded on close or successful save. The visual widget sits behind the
//! [`EditorWidget`] capability and is driven through [`EditorHost`], which catches widget
//! errors and panics so a broken widget never takes the file manager down with it.

use std::{
    any::Any,
    cell::RefCell,
    panic::{catch_unwind, AssertUnwindSafe},
    rc::Rc,
};

use panel_host::{extension, FileEntry};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::ScopedClient;
use crate::error::FileManagerError;

/// Maps a file name to an editor language id, falling back to `fallback`.
pub fn language_for(name: &str, fallback: &str) -> String {
    if name.eq_ignore_ascii_case("dockerfile") {
        return "dockerfile".to_string();
    }
    if name == ".htaccess" {
        return "apache".to_string();
    }
    let language = match extension(name).as_deref() {
        Some("rs") => "rust",
        Some("js" | "mjs" | "cjs" | "jsx") => "javascript",
        Some("ts" | "tsx") => "typescript",
        Some("json") => "json",
        Some("html" | "htm") => "html",
        Some("css") => "css",
        Some("scss" | "sass") => "scss",
        Some("md" | "markdown") => "markdown",
        Some("py") => "python",
        Some("php") => "php",
        Some("rb") => "ruby",
        Some("go") => "go",
        Some("java") => "java",
        Some("c" | "h") => "c",
        Some("cpp" | "cc" | "hpp") => "cpp",
        Some("sh" | "bash") => "shell",
        Some("yml" | "yaml") => "yaml",
        Some("toml") => "toml",
        Some("xml" | "svg") => "xml",
        Some("sql") => "sql",
        Some("ini" | "conf" | "cfg" | "env") => "ini",
        Some("txt" | "log") => "plaintext",
        _ => fallback,
    };
    language.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Lifecycle of the editor.
pub enum EditorState {
    /// No file is open.
    #[default]
    Closed,
    /// A read is in flight.
    Opening,
    /// The buffer is editable.
    Open,
    /// A write is in flight.
    Saving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An open file and its private edit buffer.
pub struct EditorSession {
    /// Session identifier; a new one is issued per open.
    pub id: u64,
    /// Entry being edited.
    pub entry: FileEntry,
    /// Domain the entry belongs to.
    pub domain: String,
    /// Current buffer contents.
    pub buffer: String,
    /// Whether the buffer differs from the content that was read.
    pub dirty: bool,
    /// Language id handed to the widget.
    pub language: String,
    original: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Handle for one issued read.
pub struct OpenTicket {
    id: u64,
    /// Domain of the entry.
    pub domain: String,
    /// Entry being opened.
    pub entry: FileEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Handle for one issued write.
pub struct SaveTicket {
    session_id: u64,
    /// Domain of the file.
    pub domain: String,
    /// File path.
    pub path: String,
    /// Buffer snapshot being written.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a completed write.
pub enum SaveOutcome {
    /// Written; the session closed and the listing should refresh.
    Saved,
    /// Written after its session was already closed; the listing should still refresh.
    SavedAfterClose,
    /// The write failed; the session is open again with the error shown inline.
    Failed(FileManagerError),
    /// The write failed after its session was closed; nothing is left to show it inline.
    FailedAfterClose(FileManagerError),
    /// No file was open, so nothing was written.
    Rejected(FileManagerError),
}

impl SaveOutcome {
    /// Returns `true` when the listing should be refreshed.
    pub fn should_refresh(&self) -> bool {
        matches!(self, Self::Saved | Self::SavedAfterClose)
    }
}

#[derive(Debug, Clone, Default)]
/// Editing state machine for at most one file.
pub struct ContentEditorSession {
    state: EditorState,
    session: Option<EditorSession>,
    pending_open: Option<OpenTicket>,
    save_error: Option<FileManagerError>,
    next_id: u64,
}

impl ContentEditorSession {
    /// Returns the lifecycle state.
    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Returns the open session.
    pub fn session(&self) -> Option<&EditorSession> {
        self.session.as_ref()
    }

    /// Returns the entry being opened or edited.
    pub fn entry(&self) -> Option<&FileEntry> {
        self.session
            .as_ref()
            .map(|session| &session.entry)
            .or_else(|| self.pending_open.as_ref().map(|ticket| &ticket.entry))
    }

    /// Returns the inline error of the last failed save.
    pub fn save_error(&self) -> Option<&FileManagerError> {
        self.save_error.as_ref()
    }

    /// Starts opening `entry`, replacing any open session.
    ///
    /// # Errors
    ///
    /// Returns [`FileManagerError::Validation`] for entries that are not text files.
    pub fn begin_open(
        &mut self,
        domain: &str,
        entry: &FileEntry,
    ) -> Result<OpenTicket, FileManagerError> {
        if !entry.is_text() {
            return Err(FileManagerError::validation(format!(
                "`{}` is not a text file",
                entry.name
            )));
        }
        self.next_id += 1;
        let ticket = OpenTicket {
            id: self.next_id,
            domain: domain.to_string(),
            entry: entry.clone(),
        };
        self.session = None;
        self.save_error = None;
        self.pending_open = Some(ticket.clone());
        self.state = EditorState::Opening;
        debug!(path = %entry.path, "opening editor");
        Ok(ticket)
    }

    /// Applies the read issued for `ticket`.
    ///
    /// Returns `Ok(false)` when the open was abandoned meanwhile.
    ///
    /// # Errors
    ///
    /// Propagates the read failure; the editor stays closed.
    pub fn complete_open(
        &mut self,
        ticket: OpenTicket,
        result: Result<String, FileManagerError>,
        language_fallback: &str,
    ) -> Result<bool, FileManagerError> {
        if self.pending_open.as_ref().map(|pending| pending.id) != Some(ticket.id) {
            debug!(path = %ticket.entry.path, "discarding abandoned editor read");
            return Ok(false);
        }
        self.pending_open = None;
        match result {
            Ok(content) => {
                let language = language_for(&ticket.entry.name, language_fallback);
                self.session = Some(EditorSession {
                    id: ticket.id,
                    entry: ticket.entry,
                    domain: ticket.domain,
                    buffer: content.clone(),
                    dirty: false,
                    language,
                    original: content,
                });
                self.state = EditorState::Open;
                Ok(true)
            }
            Err(err) => {
                self.state = EditorState::Closed;
                Err(err)
            }
        }
    }

    /// Reads `entry` and opens it.
    ///
    /// # Errors
    ///
    /// Returns validation or read failures; the editor stays closed.
    pub async fn open(
        &mut self,
        client: &ScopedClient,
        domain: &str,
        entry: &FileEntry,
        language_fallback: &str,
    ) -> Result<(), FileManagerError> {
        let ticket = self.begin_open(domain, entry)?;
        let result = client.read_text(&ticket.domain, &ticket.entry.path).await;
        self.complete_open(ticket, result, language_fallback)
            .map(|_| ())
    }

    /// Replaces the buffer. Ignored unless the editor is open.
    pub fn edit(&mut self, content: &str) {
        if self.state != EditorState::Open {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.buffer = content.to_string();
            session.dirty = session.buffer != session.original;
        }
    }

    /// Starts writing the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FileManagerError::Validation`] unless the editor is open.
    pub fn begin_save(&mut self) -> Result<SaveTicket, FileManagerError> {
        let session = match (&self.state, &self.session) {
            (EditorState::Open, Some(session)) => session,
            _ => return Err(FileManagerError::validation("no file is open for editing")),
        };
        let ticket = SaveTicket {
            session_id: session.id,
            domain: session.domain.clone(),
            path: session.entry.path.clone(),
            content: session.buffer.clone(),
        };
        self.save_error = None;
        self.state = EditorState::Saving;
        Ok(ticket)
    }

    /// Applies the write issued for `ticket`.
    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), FileManagerError>,
    ) -> SaveOutcome {
        let current = self
            .session
            .as_ref()
            .is_some_and(|session| session.id == ticket.session_id);
        match (result, current) {
            (Ok(()), true) => {
                info!(path = %ticket.path, "file saved");
                self.session = None;
                self.state = EditorState::Closed;
                SaveOutcome::Saved
            }
            (Ok(()), false) => {
                info!(path = %ticket.path, "file saved after editor closed");
                SaveOutcome::SavedAfterClose
            }
            (Err(err), true) => {
                self.state = EditorState::Open;
                self.save_error = Some(err.clone());
                SaveOutcome::Failed(err)
            }
            (Err(err), false) => {
                warn!(path = %ticket.path, error = %err, "save failed after editor closed");
                SaveOutcome::FailedAfterClose(err)
            }
        }
    }

    /// Writes the buffer back.
    pub async fn save(&mut self, client: &ScopedClient) -> SaveOutcome {
        let ticket = match self.begin_save() {
            Ok(ticket) => ticket,
            Err(err) => return SaveOutcome::Rejected(err),
        };
        let result = client
            .write_text(&ticket.domain, &ticket.path, &ticket.content)
            .await;
        self.complete_save(ticket, result)
    }

    /// Discards the session and any unsaved edits without prompting.
    ///
    /// In-flight reads and writes are not aborted; their completions are reconciled against
    /// the session id.
    pub fn close(&mut self) {
        if let Some(session) = &self.session {
            debug!(path = %session.entry.path, dirty = session.dirty, "closing editor");
        }
        self.session = None;
        self.pending_open = None;
        self.save_error = None;
        self.state = EditorState::Closed;
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failure raised by the editor widget.
pub enum WidgetFault {
    /// The widget failed while loading content.
    #[error("editor widget failed to load: {0}")]
    Load(String),
    /// The widget failed while being torn down.
    #[error("editor widget failed to dispose: {0}")]
    Dispose(String),
    /// The widget panicked.
    #[error("editor widget panicked: {0}")]
    Panicked(String),
}

impl From<WidgetFault> for FileManagerError {
    fn from(fault: WidgetFault) -> Self {
        FileManagerError::Editor(fault.to_string())
    }
}

/// Code-editing widget capability supplied by the host UI.
pub trait EditorWidget {
    /// Mounts the widget with `content` highlighted as `language`.
    fn open(&mut self, content: &str, language: &str) -> Result<(), WidgetFault>;

    /// Replaces the widget content.
    fn set_content(&mut self, content: &str) -> Result<(), WidgetFault>;

    /// Tears the widget down.
    fn dispose(&mut self) -> Result<(), WidgetFault>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Widget mount state tracked by [`EditorHost`].
pub enum WidgetStatus {
    /// No widget is mounted.
    Unmounted,
    /// The widget is live.
    Mounted,
    /// The widget faulted and awaits a manual retry.
    Faulted,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic".to_string()
}

/// Number of faults an [`EditorHost`] keeps between successful mounts.
pub const MAX_RECORDED_FAULTS: usize = 16;

/// Supervises an [`EditorWidget`]: faults are recorded instead of propagated, and a faulted
/// widget can be remounted on demand.
pub struct EditorHost {
    widget: Box<dyn EditorWidget>,
    status: WidgetStatus,
    faults: Vec<WidgetFault>,
    last_mount: Option<(String, String)>,
}

impl std::fmt::Debug for EditorHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorHost")
            .field("status", &self.status)
            .field("faults", &self.faults)
            .finish_non_exhaustive()
    }
}

impl EditorHost {
    /// Wraps `widget`.
    pub fn new(widget: Box<dyn EditorWidget>) -> Self {
        Self {
            widget,
            status: WidgetStatus::Unmounted,
            faults: Vec::new(),
            last_mount: None,
        }
    }

    /// Returns the mount state.
    pub fn status(&self) -> WidgetStatus {
        self.status
    }

    /// Returns the faults recorded since the last successful mount, oldest first.
    ///
    /// At most [`MAX_RECORDED_FAULTS`] are kept.
    pub fn faults(&self) -> &[WidgetFault] {
        &self.faults
    }

    /// Returns `true` when a faulted widget can be remounted.
    pub fn needs_retry(&self) -> bool {
        self.status == WidgetStatus::Faulted && self.last_mount.is_some()
    }

    fn guarded(
        &mut self,
        call: impl FnOnce(&mut dyn EditorWidget) -> Result<(), WidgetFault>,
    ) -> Result<(), WidgetFault> {
        let widget = self.widget.as_mut();
        match catch_unwind(AssertUnwindSafe(|| call(widget))) {
            Ok(result) => result,
            Err(payload) => Err(WidgetFault::Panicked(panic_message(payload))),
        }
    }

    /// Mounts the widget with `content`.
    ///
    /// # Errors
    ///
    /// Returns the recorded fault; the host stays usable and [`EditorHost::retry`] remounts.
    pub fn mount(&mut self, content: &str, language: &str) -> Result<(), WidgetFault> {
        self.last_mount = Some((content.to_string(), language.to_string()));
        match self.guarded(|widget| widget.open(content, language)) {
            Ok(()) => {
                self.status = WidgetStatus::Mounted;
                self.faults.clear();
                Ok(())
            }
            Err(fault) => Err(self.report_fault(fault)),
        }
    }

    /// Pushes new content to a mounted widget and remembers it for remounts.
    ///
    /// # Errors
    ///
    /// Returns the recorded fault.
    pub fn update(&mut self, content: &str) -> Result<(), WidgetFault> {
        if let Some((last, _)) = self.last_mount.as_mut() {
            *last = content.to_string();
        }
        if self.status != WidgetStatus::Mounted {
            return Ok(());
        }
        self.guarded(|widget| widget.set_content(content))
            .map_err(|fault| self.report_fault(fault))
    }

    /// Tears the widget down. A disposal fault is recorded and logged, never propagated.
    pub fn dispose(&mut self) {
        self.last_mount = None;
        if self.status == WidgetStatus::Unmounted {
            return;
        }
        if let Err(fault) = self.guarded(|widget| widget.dispose()) {
            warn!(error = %fault, "suppressed editor widget disposal fault");
            self.record(fault);
        }
        self.status = WidgetStatus::Unmounted;
    }

    /// Records a fault raised by the widget outside a host call.
    pub fn report_fault(&mut self, fault: WidgetFault) -> WidgetFault {
        warn!(error = %fault, "editor widget faulted");
        self.record(fault.clone());
        self.status = WidgetStatus::Faulted;
        fault
    }

    fn record(&mut self, fault: WidgetFault) {
        if self.faults.len() == MAX_RECORDED_FAULTS {
            self.faults.remove(0);
        }
        self.faults.push(fault);
    }

    /// Remounts a faulted widget with the last mounted content.
    ///
    /// # Errors
    ///
    /// Returns the fault when the remount fails again.
    pub fn retry(&mut self) -> Result<(), WidgetFault> {
        let Some((content, language)) = self.last_mount.clone() else {
            return Ok(());
        };
        if self.status == WidgetStatus::Faulted {
            if let Err(fault) = self.guarded(|widget| widget.dispose()) {
                debug!(error = %fault, "ignoring disposal fault before remount");
            }
        }
        info!("remounting editor widget");
        self.mount(&content, &language)
    }
}

#[derive(Debug, Default)]
struct HeadlessState {
    content: String,
    language: String,
    mounted: bool,
    opens: usize,
    fail_opens: Vec<String>,
    panic_opens: usize,
    fail_dispose: Option<String>,
}

#[derive(Debug, Clone, Default)]
/// Widget without a UI; keeps content in memory and can inject faults.
pub struct HeadlessEditorWidget {
    inner: Rc<RefCell<HeadlessState>>,
}

impl HeadlessEditorWidget {
    /// Returns the mounted content.
    pub fn content(&self) -> String {
        self.inner.borrow().content.clone()
    }

    /// Returns the mounted language id.
    pub fn language(&self) -> String {
        self.inner.borrow().language.clone()
    }

    /// Returns whether the widget is mounted.
    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().mounted
    }

    /// Returns how many times `open` was called.
    pub fn open_count(&self) -> usize {
        self.inner.borrow().opens
    }

    /// Makes the next `open` fail with `message`.
    pub fn fail_next_open(&self, message: &str) -> &Self {
        self.inner.borrow_mut().fail_opens.push(message.to_string());
        self
    }

    /// Makes the next `open` panic.
    pub fn panic_next_open(&self) -> &Self {
        self.inner.borrow_mut().panic_opens += 1;
        self
    }

    /// Makes the next `dispose` fail with `message`.
    pub fn fail_next_dispose(&self, message: &str) -> &Self {
        self.inner.borrow_mut().fail_dispose = Some(message.to_string());
        self
    }
}

impl EditorWidget for HeadlessEditorWidget {
    fn open(&mut self, content: &str, language: &str) -> Result<(), WidgetFault> {
        let mut state = self.inner.borrow_mut();
        state.opens += 1;
        if state.panic_opens > 0 {
            state.panic_opens -= 1;
            drop(state);
            panic!("headless widget crashed while loading");
        }
        if !state.fail_opens.is_empty() {
            let message = state.fail_opens.remove(0);
            return Err(WidgetFault::Load(message));
        }
        state.content = content.to_string();
        state.language = language.to_string();
        state.mounted = true;
        Ok(())
    }

    fn set_content(&mut self, content: &str) -> Result<(), WidgetFault> {
        self.inner.borrow_mut().content = content.to_string();
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), WidgetFault> {
        let mut state = self.inner.borrow_mut();
        state.mounted = false;
        match state.fail_dispose.take() {
            Some(message) => Err(WidgetFault::Dispose(message)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use panel_host::{FileKind, HostApiError, ImmediateTimer, MemoryHostingFs, NeverTimer};
    use pretty_assertions::assert_eq;

    use super::*;

    fn fixture() -> (MemoryHostingFs, ScopedClient) {
        let fs = MemoryHostingFs::default();
        fs.add_domain("example.com", "exmpl")
            .insert_file("example.com", "site/index.html", "<h1>hi</h1>")
            .insert_file("example.com", "site/logo.png", vec![0x89, 0x50]);
        let client = ScopedClient::new(Rc::new(fs.clone()), Rc::new(NeverTimer), 30_000);
        (fs, client)
    }

    fn index() -> FileEntry {
        FileEntry::new("site/index.html", FileKind::Text)
    }

    #[test]
    fn open_edit_save_closes_session() {
        let (fs, client) = fixture();
        let mut editor = ContentEditorSession::default();
        block_on(editor.open(&client, "example.com", &index(), "plaintext")).expect("open");
        assert_eq!(editor.state(), EditorState::Open);
        let session = editor.session().expect("session");
        assert_eq!(session.buffer, "<h1>hi</h1>");
        assert_eq!(session.language, "html");

        editor.edit("<h1>bye</h1>");
        assert!(editor.session().expect("session").dirty);
        let outcome = block_on(editor.save(&client));
        assert_eq!(outcome, SaveOutcome::Saved);
        assert!(outcome.should_refresh());
        assert_eq!(editor.state(), EditorState::Closed);
        assert_eq!(
            fs.file_text("example.com", "site/index.html").as_deref(),
            Some("<h1>bye</h1>")
        );
    }

    #[test]
    fn open_timeout_never_reaches_open() {
        let (fs, _) = fixture();
        fs.stall_path("site/index.html");
        let client = ScopedClient::new(Rc::new(fs), Rc::new(ImmediateTimer), 30_000);
        let mut editor = ContentEditorSession::default();
        let err = block_on(editor.open(&client, "example.com", &index(), "plaintext"))
            .expect_err("timeout");
        assert_eq!(err, FileManagerError::Timeout(30_000));
        assert_eq!(editor.state(), EditorState::Closed);
        assert!(editor.session().is_none());
    }

    #[test]
    fn non_text_entries_are_rejected() {
        let (fs, client) = fixture();
        let mut editor = ContentEditorSession::default();
        let logo = FileEntry::new("site/logo.png", FileKind::Image);
        let err = block_on(editor.open(&client, "example.com", &logo, "plaintext"))
            .expect_err("not text");
        assert!(matches!(err, FileManagerError::Validation(_)));
        assert_eq!(fs.call_count("read_file"), 0);
    }

    #[test]
    fn failed_save_keeps_buffer_and_shows_inline_error() {
        let (fs, client) = fixture();
        let mut editor = ContentEditorSession::default();
        block_on(editor.open(&client, "example.com", &index(), "plaintext")).expect("open");
        editor.edit("draft");
        fs.fail_operation("write_file", HostApiError::Server("disk full".to_string()));

        let outcome = block_on(editor.save(&client));
        assert!(!outcome.should_refresh());
        assert_eq!(editor.state(), EditorState::Open);
        assert_eq!(editor.session().expect("session").buffer, "draft");
        assert_eq!(
            editor.save_error(),
            Some(&FileManagerError::Server("disk full".to_string()))
        );
    }

    #[test]
    fn dirty_close_discards_buffer() {
        let (fs, client) = fixture();
        let mut editor = ContentEditorSession::default();
        block_on(editor.open(&client, "example.com", &index(), "plaintext")).expect("open");
        editor.edit("unsaved");
        editor.close();
        assert_eq!(editor.state(), EditorState::Closed);
        assert!(editor.session().is_none());
        assert_eq!(fs.call_count("write_file"), 0);
        assert_eq!(
            fs.file_text("example.com", "site/index.html").as_deref(),
            Some("<h1>hi</h1>")
        );
    }

    #[test]
    fn save_completing_after_close_still_refreshes() {
        let (_fs, client) = fixture();
        let mut editor = ContentEditorSession::default();
        block_on(editor.open(&client, "example.com", &index(), "plaintext")).expect("open");
        let ticket = editor.begin_save().expect("save ticket");
        editor.close();
        let outcome = editor.complete_save(ticket, Ok(()));
        assert_eq!(outcome, SaveOutcome::SavedAfterClose);
        assert!(outcome.should_refresh());
        assert_eq!(editor.state(), EditorState::Closed);
    }

    #[test]
    fn read_completing_after_close_is_discarded() {
        let mut editor = ContentEditorSession::default();
        let ticket = editor.begin_open("example.com", &index()).expect("ticket");
        editor.close();
        assert_eq!(
            editor.complete_open(ticket, Ok("late".to_string()), "plaintext"),
            Ok(false)
        );
        assert_eq!(editor.state(), EditorState::Closed);
    }

    #[test]
    fn language_follows_extension() {
        assert_eq!(language_for("main.rs", "plaintext"), "rust");
        assert_eq!(language_for("STYLE.CSS", "plaintext"), "css");
        assert_eq!(language_for(".htaccess", "plaintext"), "apache");
        assert_eq!(language_for("README", "plaintext"), "plaintext");
    }

    #[test]
    fn host_records_load_faults_and_retries() {
        let widget = HeadlessEditorWidget::default();
        widget.fail_next_open("bundle missing");
        let mut host = EditorHost::new(Box::new(widget.clone()));

        let fault = host.mount("fn main() {}", "rust").expect_err("fault");
        assert_eq!(fault, WidgetFault::Load("bundle missing".to_string()));
        assert_eq!(host.status(), WidgetStatus::Faulted);
        assert!(host.needs_retry());

        assert_eq!(host.faults().len(), 1);

        host.retry().expect("remount");
        assert_eq!(host.status(), WidgetStatus::Mounted);
        assert_eq!(widget.content(), "fn main() {}");
        assert_eq!(widget.open_count(), 2);
        assert!(host.faults().is_empty());
    }

    #[test]
    fn repeated_failed_retries_keep_a_bounded_fault_log() {
        let widget = HeadlessEditorWidget::default();
        let mut host = EditorHost::new(Box::new(widget.clone()));
        for attempt in 0..MAX_RECORDED_FAULTS + 4 {
            widget.fail_next_open(&format!("attempt {attempt}"));
        }
        host.mount("x", "plaintext").expect_err("first fault");
        for _ in 0..MAX_RECORDED_FAULTS + 3 {
            host.retry().expect_err("still failing");
        }

        assert_eq!(host.faults().len(), MAX_RECORDED_FAULTS);
        assert_eq!(
            host.faults().last(),
            Some(&WidgetFault::Load(format!("attempt {}", MAX_RECORDED_FAULTS + 3)))
        );
        assert_eq!(
            host.faults().first(),
            Some(&WidgetFault::Load("attempt 4".to_string()))
        );

        host.retry().expect("remount");
        assert!(host.faults().is_empty());
        assert!(widget.is_mounted());
    }

    #[test]
    fn host_catches_widget_panics() {
        let widget = HeadlessEditorWidget::default();
        widget.panic_next_open();
        let mut host = EditorHost::new(Box::new(widget.clone()));
        let fault = host.mount("x", "plaintext").expect_err("panic caught");
        assert!(matches!(fault, WidgetFault::Panicked(_)));
        assert_eq!(host.faults().len(), 1);

        host.retry().expect("remount");
        assert!(widget.is_mounted());
        assert!(host.faults().is_empty());
    }

    #[test]
    fn disposal_faults_are_suppressed() {
        let widget = HeadlessEditorWidget::default();
        let mut host = EditorHost::new(Box::new(widget.clone()));
        host.mount("x", "plaintext").expect("mount");
        widget.fail_next_dispose("detached");
        host.dispose();
        assert_eq!(host.status(), WidgetStatus::Unmounted);
        assert_eq!(host.faults(), &[WidgetFault::Dispose("detached".to_string())]);
        assert!(!host.needs_retry());
    }
}
