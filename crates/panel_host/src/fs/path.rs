//! Domain-relative path helpers shared by the file manager and its transports.
//!
//! Paths are relative to the domain root, use `/` as separator, and carry no leading or
//! trailing separator. The root itself is the empty string.

/// Canonicalizes a domain-relative path textually.
///
/// Leading, trailing, and repeated separators are dropped, `.` segments are removed, and `..`
/// tokens are stripped rather than resolved against their parent, so `a/../b` becomes `a/b`.
/// The result is idempotent. This is presentation-level cleanup only; access control belongs to
/// the backend, which should use [`resolve_path`].
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolves `.` and `..` segments against an explicit segment stack.
///
/// Returns `None` when the path climbs above the root.
pub fn resolve_path(path: &str) -> Option<String> {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop()?;
            }
            other => stack.push(other),
        }
    }
    Some(stack.join("/"))
}

/// Joins `name` under `parent` and normalizes the result.
pub fn join_path(parent: &str, name: &str) -> String {
    normalize_path(&format!("{parent}/{name}"))
}

/// Returns the parent of a normalized path, or the root (`""`) for top-level segments.
pub fn parent_path(path: &str) -> String {
    let normalized = normalize_path(path);
    match normalized.rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    }
}

/// Returns the final segment of a path (empty for the root).
pub fn file_name(path: &str) -> String {
    let normalized = normalize_path(path);
    normalized
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
