//! Loading and saving descriptions.
//!
//! Descriptions are JSON documents that may carry `//` comments, either on
//! their own line or trailing a value. Comments are stripped before parsing;
//! `//` inside string literals (URLs, for instance) is left alone.

use std::path::Path;

use serde::Serialize;

use super::{TreeError, Value};
use crate::Result;

/// Removes `//` comments that appear outside of string literals.
///
/// ```
/// # use blueprint::tree::strip_comments;
/// let text = "{\"url\": \"http://x\" // where\n}";
/// assert_eq!(strip_comments(text), "{\"url\": \"http://x\" \n}");
/// ```
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                // Drop everything up to, but not including, the newline
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Parses a commented JSON description. The root must be a map.
pub fn parse_commented(text: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(&strip_comments(text))?;
    match value {
        Value::Map(_) => Ok(value),
        other => Err(TreeError::RootNotMap {
            found: other.type_name(),
        }
        .into()),
    }
}

/// Loads a commented JSON description from disk.
pub fn load(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let value = parse_commented(&text)?;
    tracing::debug!(path = %path.display(), "Loaded description");
    Ok(value)
}

/// Serializes a tree as UTF-8 JSON with 4-space indentation and a trailing
/// newline.
pub fn to_pretty_string(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    String::from_utf8(buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

/// Writes a tree to disk in the format of [`to_pretty_string`].
pub fn save(path: impl AsRef<Path>, value: &Value) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_pretty_string(value)?)?;
    tracing::debug!(path = %path.display(), "Saved description");
    Ok(())
}
