//! Binding path normalization and resolution.
//!
//! Paths come in three interchangeable spellings that all normalize to the
//! same segment list:
//!
//! - dotted: `user.addresses[0].city`
//! - slashed: `/user/addresses/0/city`
//! - mixed: `user/addresses.0.city`
//!
//! A leading `/` marks a path as absolute. Anything else is relative to the
//! data context path of the component that holds the binding.

use regex::Regex;
use std::sync::OnceLock;

/// The root data context path.
pub const ROOT_PATH: &str = "/";

/// Leading segments stripped from binding paths inside template contexts.
pub const LEGACY_ITEM_PREFIXES: [&str; 3] = ["/item", "/text", "/label"];

fn bracket_index_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(\d+)\]").expect("bracket index pattern is valid"))
}

/// Split a path into its segments.
///
/// Bracketed indices become their own segment and empty segments are
/// dropped, so `normalize("a.b[0].c") == normalize("/a/b/0/c")`.
pub fn normalize(path: &str) -> Vec<String> {
    let dotted = bracket_index_re().replace_all(path, ".$1");
    dotted
        .split(['.', '/'])
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve `path` against `context` into an absolute path.
///
/// Absolute paths are returned unchanged. A missing context is the root. An
/// empty relative path resolves to the context itself.
pub fn resolve(path: &str, context: Option<&str>) -> String {
    if is_absolute(path) {
        return path.to_string();
    }
    let context = context.filter(|c| !c.is_empty()).unwrap_or(ROOT_PATH);
    if path.is_empty() {
        return context.to_string();
    }
    join(context, path)
}

/// Append one relative piece to a base path with a single separator.
pub fn join(base: &str, piece: &str) -> String {
    let piece = piece.trim_start_matches('/');
    if base.ends_with('/') {
        format!("{}{}", base, piece)
    } else {
        format!("{}/{}", base, piece)
    }
}

/// Whether the path starts at the data model root.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// Whether a context path points somewhere below the root.
pub fn is_nested_context(context: Option<&str>) -> bool {
    context.is_some_and(|c| !normalize(c).is_empty())
}

/// Strip a leading `/item`, `/text` or `/label` segment from `path`.
///
/// Returns the remainder as a relative path (empty when the whole path was
/// the prefix), or `None` when no prefix matches.
pub fn strip_legacy_prefix(path: &str) -> Option<&str> {
    LEGACY_ITEM_PREFIXES.iter().find_map(|prefix| {
        let rest = path.strip_prefix(prefix)?;
        if rest.is_empty() {
            Some(rest)
        } else {
            rest.strip_prefix('/')
        }
    })
}

/// Resolve the `path` of a binding held by a component in `context`.
///
/// With `legacy_prefixes` set and a context below the root, a leading
/// `/item`, `/text` or `/label` segment is dropped and the rest is read
/// relative to the context.
pub fn resolve_binding(path: &str, context: Option<&str>, legacy_prefixes: bool) -> String {
    if legacy_prefixes && is_nested_context(context) {
        if let Some(rest) = strip_legacy_prefix(path) {
            return resolve(rest, context);
        }
    }
    resolve(path, context)
}

/// Render segments back into an absolute slash path.
pub fn to_absolute(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}
