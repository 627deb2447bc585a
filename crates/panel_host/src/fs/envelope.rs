//! Single adapter layer that turns heterogeneous backend payloads into typed results.
//!
//! The hosting API answers listings and reads with several envelope shapes. Every shape check
//! lives here so the controllers only ever see [`DirectoryListing`] and plain text.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::HostApiError;
use crate::fs::path::{join_path, normalize_path};
use crate::fs::types::{DirectoryListing, FileEntry, FileKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Known envelope shapes of a directory listing response.
pub enum ListingShape {
    /// `[entry, ...]`
    #[default]
    Bare,
    /// `{ "data": [entry, ...] }`
    Data,
    /// `{ "success": true, "data": [entry, ...] }`
    SuccessData,
    /// `{ "files": [entry, ...] }`
    Files,
}

impl ListingShape {
    /// Wraps an entry array in this envelope.
    pub fn wrap(self, entries: Value) -> Value {
        match self {
            Self::Bare => entries,
            Self::Data => json!({ "data": entries }),
            Self::SuccessData => json!({ "success": true, "data": entries }),
            Self::Files => json!({ "files": entries }),
        }
    }
}

/// Normalizes a listing payload for `dir_path` in `domain`.
///
/// Records without a string `name` are dropped silently.
///
/// # Errors
///
/// Returns [`HostApiError::Server`] for `{ "success": false }` envelopes and
/// [`HostApiError::InvalidResponse`] for any other unrecognized shape.
pub fn parse_listing(
    value: Value,
    domain: &str,
    dir_path: &str,
) -> Result<(ListingShape, DirectoryListing), HostApiError> {
    let (shape, items) = match value {
        Value::Array(items) => (ListingShape::Bare, items),
        Value::Object(mut map) => {
            if let Some(message) = failure_message(&map) {
                return Err(HostApiError::Server(message));
            }
            let has_success = map.contains_key("success");
            match (map.remove("data"), map.remove("files")) {
                (Some(Value::Array(items)), _) if has_success => (ListingShape::SuccessData, items),
                (Some(Value::Array(items)), _) => (ListingShape::Data, items),
                (_, Some(Value::Array(items))) => (ListingShape::Files, items),
                _ => {
                    return Err(HostApiError::InvalidResponse(
                        "listing envelope has no entry array".to_string(),
                    ))
                }
            }
        }
        other => {
            return Err(HostApiError::InvalidResponse(format!(
                "listing payload is a {}",
                value_kind(&other)
            )))
        }
    };

    let dir_path = normalize_path(dir_path);
    let total = items.len();
    let entries: Vec<FileEntry> = items
        .iter()
        .filter_map(|item| item.as_object())
        .filter_map(|item| entry_from_object(item, &dir_path))
        .collect();
    if entries.len() != total {
        debug!(
            dropped = total - entries.len(),
            path = %dir_path,
            "dropped nameless listing records"
        );
    }

    Ok((
        shape,
        DirectoryListing {
            domain: domain.to_string(),
            path: dir_path,
            entries,
        },
    ))
}

/// Extracts file text from a read payload.
///
/// Accepts a bare string, `{ "content" }`, `{ "data": { "content" } }`, and
/// `{ "success": true, "data": "..." }`.
///
/// # Errors
///
/// Returns [`HostApiError::Server`] for `{ "success": false }` envelopes and
/// [`HostApiError::InvalidResponse`] for anything else.
pub fn parse_read_content(value: Value) -> Result<String, HostApiError> {
    match value {
        Value::String(text) => Ok(text),
        Value::Object(map) => {
            if let Some(message) = failure_message(&map) {
                return Err(HostApiError::Server(message));
            }
            if let Some(Value::String(text)) = map.get("content") {
                return Ok(text.clone());
            }
            match map.get("data") {
                Some(Value::Object(data)) => match data.get("content") {
                    Some(Value::String(text)) => Ok(text.clone()),
                    _ => Err(HostApiError::InvalidResponse(
                        "read envelope data has no content".to_string(),
                    )),
                },
                Some(Value::String(text)) if map.contains_key("success") => Ok(text.clone()),
                _ => Err(HostApiError::InvalidResponse(
                    "read envelope has no content".to_string(),
                )),
            }
        }
        other => Err(HostApiError::InvalidResponse(format!(
            "read payload is a {}",
            value_kind(&other)
        ))),
    }
}

fn failure_message(map: &Map<String, Value>) -> Option<String> {
    if map.get("success") != Some(&Value::Bool(false)) {
        return None;
    }
    let message = ["message", "error"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .unwrap_or("request failed");
    Some(message.to_string())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn entry_from_object(item: &Map<String, Value>, dir_path: &str) -> Option<FileEntry> {
    let name = item.get("name").and_then(Value::as_str)?;
    if name.is_empty() {
        return None;
    }

    let path = match text_field(item, &["path"]) {
        Some(path) => normalize_path(&path),
        None => join_path(dir_path, name),
    };
    let type_token = text_field(item, &["type", "kind"]);
    let kind = if bool_field(item, &["isDirectory", "is_dir", "isDir"]) {
        FileKind::Folder
    } else {
        FileKind::from_wire(type_token.as_deref(), name)
    };

    Some(FileEntry {
        name: name.to_string(),
        path,
        kind,
        size: size_field(item),
        created_at: text_field(item, &["createdAt", "created", "birthtime"]),
        modified_at: text_field(item, &["modifiedAt", "modified", "mtime"]),
        accessed_at: text_field(item, &["accessedAt", "accessed", "atime"]),
        permissions: text_field(item, &["permissions", "mode"]).unwrap_or_default(),
        owner: text_field(item, &["owner", "user"]).unwrap_or_default(),
        group: text_field(item, &["group"]).unwrap_or_default(),
        is_symlink: bool_field(item, &["isSymlink", "symlink", "isSymbolicLink"]),
        link_target: text_field(item, &["linkTarget", "target"]),
        is_hidden: item
            .get("isHidden")
            .or_else(|| item.get("hidden"))
            .and_then(Value::as_bool)
            .unwrap_or_else(|| name.starts_with('.')),
    })
}

fn text_field(item: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match item.get(*key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn bool_field(item: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter()
        .find_map(|key| item.get(*key).and_then(Value::as_bool))
        .unwrap_or(false)
}

fn size_field(item: &Map<String, Value>) -> Option<u64> {
    match item.get("size")? {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn sample_entries() -> Value {
        json!([
            { "name": "public_html", "type": "directory" },
            { "name": "notes.txt", "size": 12, "permissions": "rw-r--r--", "owner": "exmpl" },
            { "type": "file", "size": 1 },
            { "name": ".env", "size": "42" }
        ])
    }

    #[test]
    fn parse_listing_accepts_every_known_envelope() {
        for shape in [
            ListingShape::Bare,
            ListingShape::Data,
            ListingShape::SuccessData,
            ListingShape::Files,
        ] {
            let (detected, listing) =
                parse_listing(shape.wrap(sample_entries()), "example.com", "/docs/")
                    .expect("known envelope");
            assert_eq!(detected, shape);
            assert_eq!(listing.path, "docs");
            assert_eq!(listing.domain, "example.com");
            let names: Vec<&str> = listing.entries.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, vec!["public_html", "notes.txt", ".env"]);
        }
    }

    #[test]
    fn parse_listing_builds_typed_entries() {
        let (_, listing) =
            parse_listing(sample_entries(), "", "docs").expect("bare array");
        let folder = &listing.entries[0];
        assert_eq!(folder.kind, FileKind::Folder);
        assert_eq!(folder.path, "docs/public_html");

        let notes = &listing.entries[1];
        assert_eq!(notes.kind, FileKind::Text);
        assert_eq!(notes.size, Some(12));
        assert_eq!(notes.owner, "exmpl");
        assert!(!notes.is_hidden);

        let env = &listing.entries[2];
        assert_eq!(env.size, Some(42));
        assert!(env.is_hidden);
    }

    #[test]
    fn parse_listing_rejects_unknown_shapes() {
        let cases = [
            json!({ "items": [] }),
            json!({ "data": { "entries": [] } }),
            json!("nope"),
            json!(null),
        ];
        for value in cases {
            let err = parse_listing(value.clone(), "", "").expect_err("unknown shape");
            assert!(
                matches!(err, HostApiError::InvalidResponse(_)),
                "value={value} err={err:?}"
            );
        }
    }

    #[test]
    fn parse_listing_maps_explicit_failure_to_server_error() {
        let err = parse_listing(
            json!({ "success": false, "message": "permission denied" }),
            "example.com",
            "",
        )
        .expect_err("failure envelope");
        assert_eq!(err, HostApiError::Server("permission denied".to_string()));
    }

    #[test]
    fn parse_read_content_accepts_every_known_envelope() {
        let cases = [
            json!("hello"),
            json!({ "content": "hello" }),
            json!({ "data": { "content": "hello" } }),
            json!({ "success": true, "data": "hello" }),
        ];
        for value in cases {
            assert_eq!(parse_read_content(value).expect("known envelope"), "hello");
        }
        assert!(matches!(
            parse_read_content(json!({ "data": "hello" })),
            Err(HostApiError::InvalidResponse(_))
        ));
        assert_eq!(
            parse_read_content(json!({ "success": false, "error": "too large" })),
            Err(HostApiError::Server("too large".to_string()))
        );
    }
}
