//! File manager data types shared across host contracts and implementations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Coarse entry classification used for click behavior and menu availability.
pub enum FileKind {
    /// Directory entry.
    Folder,
    /// Plain-text or source file that can be opened in the editor.
    Text,
    /// Raster or vector image.
    Image,
    /// Video file.
    Video,
    /// Audio file.
    Audio,
    /// Compressed archive.
    Archive,
    /// Anything else.
    Other,
}

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "html", "htm", "css", "scss", "less", "js", "mjs", "ts", "jsx",
    "tsx", "json", "xml", "yml", "yaml", "toml", "ini", "conf", "cfg", "env", "php", "py", "rb",
    "pl", "sh", "bash", "sql", "csv", "log", "htaccess", "rs", "go", "java", "c", "h", "cpp",
    "vue", "svelte",
];
const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "ico", "tif", "tiff", "avif",
];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mkv", "mov", "avi", "m4v", "ogv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "m4a", "opus"];
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar"];

impl FileKind {
    /// Infers a kind from a file name's extension.
    ///
    /// Dotfiles such as `.htaccess` are matched on the part after the dot.
    pub fn from_name(name: &str) -> Self {
        let Some(ext) = extension(name) else {
            return Self::Other;
        };
        let ext = ext.as_str();
        if TEXT_EXTENSIONS.contains(&ext) {
            Self::Text
        } else if IMAGE_EXTENSIONS.contains(&ext) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Self::Video
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            Self::Audio
        } else if ARCHIVE_EXTENSIONS.contains(&ext) {
            Self::Archive
        } else {
            Self::Other
        }
    }

    /// Resolves a kind from the backend `type` token, falling back to the name's extension.
    pub fn from_wire(type_token: Option<&str>, name: &str) -> Self {
        match type_token.map(str::to_ascii_lowercase).as_deref() {
            Some("folder" | "directory" | "dir") => Self::Folder,
            Some("text") => Self::Text,
            Some("image") => Self::Image,
            Some("video") => Self::Video,
            Some("audio") => Self::Audio,
            Some("archive") => Self::Archive,
            _ => Self::from_name(name),
        }
    }

    /// Returns `true` for directory entries.
    pub fn is_folder(self) -> bool {
        matches!(self, Self::Folder)
    }
}

/// Returns the lowercase extension of `name`, if any.
pub fn extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One file or folder returned by a directory listing.
pub struct FileEntry {
    /// Base name of the entry.
    pub name: String,
    /// Normalized path relative to the domain root.
    pub path: String,
    /// Entry classification.
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Size in bytes when reported.
    pub size: Option<u64>,
    /// Creation timestamp as reported by the backend.
    pub created_at: Option<String>,
    /// Last-modified timestamp as reported by the backend.
    pub modified_at: Option<String>,
    /// Last-accessed timestamp as reported by the backend.
    pub accessed_at: Option<String>,
    /// Permission string (for example `rwxr-xr-x`).
    pub permissions: String,
    /// Owning user.
    pub owner: String,
    /// Owning group.
    pub group: String,
    /// Whether the entry is a symbolic link.
    pub is_symlink: bool,
    /// Link target for symbolic links.
    pub link_target: Option<String>,
    /// Whether the entry is hidden from the default view.
    pub is_hidden: bool,
}

impl FileEntry {
    /// Builds a minimal entry for `path` with the given kind.
    pub fn new(path: &str, kind: FileKind) -> Self {
        let path = crate::normalize_path(path);
        let name = crate::file_name(&path);
        Self {
            is_hidden: name.starts_with('.'),
            name,
            path,
            kind,
            size: None,
            created_at: None,
            modified_at: None,
            accessed_at: None,
            permissions: String::new(),
            owner: String::new(),
            group: String::new(),
            is_symlink: false,
            link_target: None,
        }
    }

    /// Returns `true` when the entry is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    /// Returns `true` when the entry can be opened in the text editor.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, FileKind::Text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Result of a successful list request; replaced wholesale on the next request.
pub struct DirectoryListing {
    /// Domain the listing belongs to (`""` for the unscoped root).
    pub domain: String,
    /// Normalized directory path that was listed.
    pub path: String,
    /// Entries in backend order, minus nameless records.
    pub entries: Vec<FileEntry>,
}

impl DirectoryListing {
    /// Returns `true` when an entry called `name` exists in the listing.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// Looks up an entry by name.
    pub fn find(&self, name: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Filesystem root the current user is browsing.
pub struct DomainScope {
    /// Selected domain, or `""` for the unscoped system root.
    pub domain: String,
    /// Linux account that owns the domain's files.
    pub linux_username: String,
    /// Display label for the root breadcrumb.
    pub root_label: String,
}

impl DomainScope {
    /// Scope for an administrator browsing the unscoped system root.
    pub fn unscoped() -> Self {
        Self {
            domain: String::new(),
            linux_username: String::new(),
            root_label: "/".to_string(),
        }
    }

    /// Returns `true` for the unscoped system root.
    pub fn is_unscoped(&self) -> bool {
        self.domain.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A domain the current user may browse, as returned by `getUserDomains`.
pub struct UserDomain {
    /// Domain name.
    pub domain: String,
    /// Linux account that owns the domain.
    #[serde(default)]
    pub linux_username: String,
    /// Backend identifier.
    #[serde(default)]
    pub id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Presence and size of one well-known directory under a domain root.
pub struct DomainDirectory {
    /// Whether the directory exists.
    pub exists: bool,
    /// Size in bytes when known.
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Layout summary of a domain root, as returned by `getDomainStructure`.
pub struct DomainStructure {
    /// Linux account that owns the domain.
    #[serde(default)]
    pub linux_username: String,
    /// Well-known directories keyed by name.
    #[serde(default)]
    pub directories: BTreeMap<String, DomainDirectory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Extended metadata fetched on demand for the properties view.
pub struct FileInfo {
    /// Path the metadata describes.
    pub path: String,
    /// Size in bytes when known.
    pub size: Option<u64>,
    /// Permission string.
    pub permissions: Option<String>,
    /// Owning user.
    pub owner: Option<String>,
    /// Owning group.
    pub group: Option<String>,
    /// Whether the path is a symbolic link.
    pub is_symlink: bool,
    /// Link target for symbolic links.
    pub link_target: Option<String>,
    /// MIME type when the backend reports one.
    pub mime_type: Option<String>,
    /// Last-modified timestamp.
    pub modified_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A local file queued for upload.
pub struct UploadFile {
    /// Destination base name.
    pub name: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Creates an upload payload.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}
