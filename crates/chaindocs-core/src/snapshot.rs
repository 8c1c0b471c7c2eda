//! Snapshot export — plain, recursively-describable views of a resolved
//! document tree.
//!
//! A snapshot mirrors a document's top-level fields with each pointer
//! field either inlined as a nested `{ reference, contents }` object or
//! left as a bare URI string, as selected by a [`ResolvePolicy`].

use serde::Serialize;
use serde_json::{Map, Value};

/// Controls how far snapshot production descends into pointer fields.
///
/// Two independent inputs, either of which may be set:
///
/// - **paths** — dotted field paths (`"ratePlans.weekend"`). When present
///   (even empty), only fields named by a path's first segment are
///   resolved, and the remaining suffix is threaded down to the child.
///   When absent, every pointer field resolves.
/// - **depth** — maximum resolution depth. `0` leaves every pointer at
///   this level as a bare URI; each recursion step decrements. Absent
///   means unbounded.
///
/// When both are set, paths decide *which* fields recurse and depth
/// decides *how far*.
#[derive(Debug, Clone, Default)]
pub struct ResolvePolicy {
    paths: Option<Vec<String>>,
    depth: Option<u32>,
}

impl ResolvePolicy {
    /// Resolve every pointer field, to unbounded depth.
    pub fn resolve_all() -> Self {
        Self::default()
    }

    /// Resolve only the fields named by the given dotted paths.
    pub fn paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: Some(paths.into_iter().map(Into::into).collect()),
            depth: None,
        }
    }

    /// Resolve every pointer field down to `depth` levels.
    pub fn depth(depth: u32) -> Self {
        Self {
            paths: None,
            depth: Some(depth),
        }
    }

    /// Limit an existing policy to `depth` levels.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Whether the pointer field `field` should be resolved at this level.
    pub(crate) fn allows(&self, field: &str) -> bool {
        if self.depth == Some(0) {
            return false;
        }
        match &self.paths {
            None => true,
            Some(paths) => paths
                .iter()
                .any(|path| path == field || is_prefix_segment(path, field)),
        }
    }

    /// The policy a resolved child of `field` is produced under.
    ///
    /// A bare path entry equal to `field` resolves the child fully;
    /// otherwise the dotted suffixes under `field` are threaded down.
    /// Depth decrements by one level.
    pub(crate) fn descend(&self, field: &str) -> Self {
        let paths = match &self.paths {
            None => None,
            Some(paths) if paths.iter().any(|path| path == field) => None,
            Some(paths) => Some(
                paths
                    .iter()
                    .filter_map(|path| {
                        path.strip_prefix(field)
                            .and_then(|rest| rest.strip_prefix('.'))
                    })
                    .map(str::to_string)
                    .collect(),
            ),
        };
        Self {
            paths,
            depth: self.depth.map(|d| d.saturating_sub(1)),
        }
    }
}

fn is_prefix_segment(path: &str, field: &str) -> bool {
    path.strip_prefix(field)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// The plain export of one resolved document.
///
/// `contents` mirrors the downloaded top-level fields; pointer fields the
/// policy selected appear as nested `{ reference, contents }` objects
/// (one per key for nested pointer fields), everything else verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSnapshot {
    /// The URI this document was resolved from.
    pub reference: String,
    /// The document's top-level fields after policy-driven resolution.
    pub contents: Map<String, Value>,
}

impl DocumentSnapshot {
    /// Render the snapshot as the recursive `{ reference, contents }`
    /// JSON shape.
    pub fn into_value(self) -> Value {
        let mut object = Map::new();
        object.insert("reference".into(), Value::String(self.reference));
        object.insert("contents".into(), Value::Object(self.contents));
        Value::Object(object)
    }
}
