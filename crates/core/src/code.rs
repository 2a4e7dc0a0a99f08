//! Helpers for class names and doc comments

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static CLASS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z_]\w*(\\[a-z_]\w*)*$").expect("class pattern must compile"));

static REPEATED_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\+").expect("separator pattern must compile"));

static DOC_LINE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\* ?").expect("doc comment pattern must compile"));

/// Splits `foo\bar\Baz` into `(Some("foo\bar"), "Baz")`.
pub fn class_parts(class: &str) -> (Option<&str>, &str) {
    match class.rsplit_once('\\') {
        Some((namespace, name)) if !namespace.is_empty() => (Some(namespace), name),
        Some((_, name)) => (None, name),
        None => (None, class),
    }
}

/// Namespace of a class, or `None` for root-level classes.
pub fn namespace(class: &str) -> Option<&str> {
    class_parts(class).0
}

/// Short name of a class.
pub fn class_name(class: &str) -> &str {
    class_parts(class).1
}

/// Turns `foo/bar//Baz` or `\foo\Baz\` into a canonical class name.
pub fn normalize_class(class: &str) -> Result<String> {
    let class = class.replace('/', "\\");
    let class = REPEATED_SEPARATOR.replace_all(&class, "\\");
    let class = class.trim_matches('\\');
    if !validate_class(class) {
        return Err(Error::InvalidInput(format!(
            "`{class}` is an invalid class/namespace."
        )));
    }
    Ok(class.to_string())
}

/// Whether every segment starts with a letter or underscore and contains only
/// word characters.
pub fn validate_class(class: &str) -> bool {
    CLASS_REGEX.is_match(class)
}

/// Strips `/**`, `*/` and leading `*` decoration from a doc comment.
pub fn unformat_doc_comment(comment: &str) -> String {
    let inner = comment
        .trim()
        .trim_matches(|c| c == '/' || c == '*')
        .trim();
    DOC_LINE_PREFIX
        .replace_all(inner, "")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wraps text in doc comment decoration. Empty text yields an empty string.
pub fn format_doc_comment(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = text.trim().replace("*/", "* /");
    if text.is_empty() {
        return String::new();
    }
    let body = text
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                " *".to_string()
            } else {
                format!(" * {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("/**\n{body}\n */")
}
