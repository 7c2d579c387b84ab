//! Dotted/bracketed key paths into nested JSON values.
//!
//! A path such as `points[0].x` is normalized to `points.0.x` and split into
//! segments. Three operations share the parser:
//!
//! - [`query`] / [`get`] read without mutating.
//! - [`set`] writes, creating empty objects for missing intermediate members.
//!   Intermediate members that are not objects or arrays are **overwritten**
//!   (`{"some": 42}` becomes `{"some": {"deep": ...}}`).
//! - [`unset`] removes a member; a non-container intermediate member is removed
//!   instead and traversal stops there.
//!
//! An empty or absent path never traverses: reads return the container itself,
//! writes and removals leave it unchanged. Keys containing `.` cannot be
//! addressed.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use anyhow::{Result, anyhow, bail};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

/// Most `null` slots `set` will insert to reach an index past an array's end.
/// Farther indices drop the write.
pub const MAX_ARRAY_PADDING: usize = 1024;

static INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([A-Za-z0-9_]+)\]").unwrap());

/// Parsed path: ordered keys, array indices kept as decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// Parse `expr` into segments: `[k]` becomes `.k`, one leading `.` is
    /// stripped, the rest is split on `.`.
    ///
    /// Trailing or doubled separators yield empty segments, which no lookup
    /// ever finds.
    pub fn parse(expr: &str) -> Self {
        let normalized = INDEX_RE.replace_all(expr, ".$1");
        let trimmed = normalized.strip_prefix('.').unwrap_or(&normalized);
        Self(trimmed.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<Vec<String>> for KeyPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

/// Anything accepted as a path: nothing, a textual expression, or keys that
/// are already split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathExpr<'a> {
    Absent,
    Text(Cow<'a, str>),
    Segments(Cow<'a, [String]>),
}

impl PathExpr<'_> {
    /// Build a path from a dynamically typed JSON value.
    ///
    /// `null` is absent, a string is parsed, an array of strings or numbers is
    /// used as segments. Any other value is a misuse and errors.
    pub fn from_value(value: &Value) -> Result<PathExpr<'static>> {
        match value {
            Value::Null => Ok(PathExpr::Absent),
            Value::String(text) => Ok(PathExpr::Text(Cow::Owned(text.clone()))),
            Value::Array(items) => {
                let segments = items
                    .iter()
                    .map(|item| match item {
                        Value::String(key) => Ok(key.clone()),
                        Value::Number(index) => Ok(index.to_string()),
                        other => Err(anyhow!(
                            "path segment must be a string or number, got {other}"
                        )),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(PathExpr::Segments(Cow::Owned(segments)))
            }
            other => bail!("path must be a string or an array of keys, got {other}"),
        }
    }

    /// Segments to traverse, or `None` when the path is empty.
    pub fn resolve(&self) -> Option<Cow<'_, [String]>> {
        match self {
            PathExpr::Absent => None,
            PathExpr::Text(text) if text.is_empty() => None,
            PathExpr::Text(text) => Some(Cow::Owned(KeyPath::parse(text).0)),
            PathExpr::Segments(segments) if segments.is_empty() => None,
            PathExpr::Segments(segments) => Some(Cow::Borrowed(&**segments)),
        }
    }
}

impl<'a> From<&'a str> for PathExpr<'a> {
    fn from(text: &'a str) -> Self {
        PathExpr::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for PathExpr<'a> {
    fn from(text: &'a String) -> Self {
        PathExpr::Text(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for PathExpr<'_> {
    fn from(text: String) -> Self {
        PathExpr::Text(Cow::Owned(text))
    }
}

impl<'a> From<Option<&'a str>> for PathExpr<'a> {
    fn from(text: Option<&'a str>) -> Self {
        text.map_or(PathExpr::Absent, PathExpr::from)
    }
}

impl<'a> From<&'a [String]> for PathExpr<'a> {
    fn from(segments: &'a [String]) -> Self {
        PathExpr::Segments(Cow::Borrowed(segments))
    }
}

impl From<Vec<String>> for PathExpr<'_> {
    fn from(segments: Vec<String>) -> Self {
        PathExpr::Segments(Cow::Owned(segments))
    }
}

impl<const N: usize> From<[&str; N]> for PathExpr<'_> {
    fn from(segments: [&str; N]) -> Self {
        PathExpr::Segments(Cow::Owned(
            segments.iter().map(|key| (*key).to_string()).collect(),
        ))
    }
}

impl<'a> From<&'a KeyPath> for PathExpr<'a> {
    fn from(path: &'a KeyPath) -> Self {
        PathExpr::Segments(Cow::Borrowed(path.segments()))
    }
}

impl From<KeyPath> for PathExpr<'_> {
    fn from(path: KeyPath) -> Self {
        PathExpr::Segments(Cow::Owned(path.0))
    }
}

/// Objects and arrays can be descended into; everything else is a leaf.
pub fn is_traversable(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Look up the value at `path`, or `None` if any segment is missing.
///
/// An empty path returns `container` itself.
pub fn query<'v, 'p>(container: &'v Value, path: impl Into<PathExpr<'p>>) -> Option<&'v Value> {
    let path = path.into();
    let Some(segments) = path.resolve() else {
        return Some(container);
    };
    segments
        .iter()
        .try_fold(container, |current, key| member(current, key))
}

/// Look up the value at `path`, or `default` if any segment is missing.
pub fn get<'v, 'p>(
    container: &'v Value,
    path: impl Into<PathExpr<'p>>,
    default: &'v Value,
) -> &'v Value {
    query(container, path).unwrap_or(default)
}

/// Assign `value` at `path`, creating or clobbering intermediate members.
///
/// A root that is not an object or array is replaced by `{}` through the
/// reference. Returns the root.
pub fn set<'v, 'p>(
    container: &'v mut Value,
    path: impl Into<PathExpr<'p>>,
    value: Value,
) -> &'v mut Value {
    let path = path.into();
    let Some(segments) = path.resolve() else {
        return container;
    };
    if !is_traversable(container) {
        *container = Value::Object(Map::new());
    }
    if let Some((last, parents)) = segments.split_last() {
        assign(container, parents, last, value);
    }
    container
}

/// Remove the member at `path`. Never replaces the root.
pub fn unset<'v, 'p>(container: &'v mut Value, path: impl Into<PathExpr<'p>>) -> &'v mut Value {
    let path = path.into();
    let Some(segments) = path.resolve() else {
        return container;
    };
    if !is_traversable(container) {
        return container;
    }
    if let Some((last, parents)) = segments.split_last() {
        prune(container, parents, last);
    }
    container
}

fn assign(root: &mut Value, parents: &[String], last: &str, value: Value) {
    let mut current = root;
    for key in parents {
        let Some(slot) = slot_mut(current, key) else {
            debug!(key = %key, "array slot not addressable, dropping write");
            return;
        };
        if !is_traversable(slot) {
            *slot = Value::Object(Map::new());
        }
        current = slot;
    }
    match slot_mut(current, last) {
        Some(slot) => *slot = value,
        None => debug!(key = %last, "array slot not addressable, dropping write"),
    }
}

fn prune(root: &mut Value, parents: &[String], last: &str) {
    let mut current = root;
    for key in parents {
        match member(current, key) {
            None => return,
            Some(child) if !is_traversable(child) => {
                remove_member(current, key);
                return;
            }
            Some(_) => {}
        }
        let Some(child) = member_mut(current, key) else {
            return;
        };
        current = child;
    }
    remove_member(current, last);
}

/// Canonical decimal index (`"0"`, `"12"`; not `"01"` or `"+1"`).
fn array_index(key: &str) -> Option<usize> {
    let index: usize = key.parse().ok()?;
    (index.to_string() == key).then_some(index)
}

fn member<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => items.get(array_index(key)?),
        _ => None,
    }
}

fn member_mut<'v>(value: &'v mut Value, key: &str) -> Option<&'v mut Value> {
    match value {
        Value::Object(map) => map.get_mut(key),
        Value::Array(items) => items.get_mut(array_index(key)?),
        _ => None,
    }
}

/// Member slot for writing, inserted as `null` if missing. Arrays grow with
/// at most [`MAX_ARRAY_PADDING`] `null`s. `None` for non-index keys on
/// arrays, indices past the padding bound, and leaves.
fn slot_mut<'v>(value: &'v mut Value, key: &str) -> Option<&'v mut Value> {
    match value {
        Value::Object(map) => Some(map.entry(key).or_insert(Value::Null)),
        Value::Array(items) => {
            let index = array_index(key)?;
            if index >= items.len() {
                if index - items.len() > MAX_ARRAY_PADDING {
                    return None;
                }
                items.resize(index.checked_add(1)?, Value::Null);
            }
            items.get_mut(index)
        }
        _ => None,
    }
}

/// Object members are removed; array elements become `null` so later indices
/// stay put.
fn remove_member(value: &mut Value, key: &str) {
    match value {
        Value::Object(map) => {
            map.remove(key);
        }
        Value::Array(items) => {
            if let Some(item) = array_index(key).and_then(|index| items.get_mut(index)) {
                *item = Value::Null;
            }
        }
        _ => {}
    }
}
