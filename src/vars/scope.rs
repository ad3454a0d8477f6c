//! Variable scope: declaration collection and dotted-path lookup.

use crate::extract::{entry_key, node_value, value_child};
use crate::syntax::{NodeKind, SyntaxTree};
use serde_json::{Map, Value};
use std::fmt;

/// Errors raised by strict-mode variable resolution.
///
/// Ordinary substitution never raises these: an unresolved token is left in
/// the text verbatim. Strict resolution is for callers that need a hard
/// answer instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarError {
    /// No declaration matches the path.
    Undefined {
        /// The full dotted path that failed to resolve
        path: String,
    },

    /// A non-final path segment landed on a scalar instead of a mapping.
    NotAMapping {
        /// The full dotted path being walked
        path: String,
        /// The segment whose value was not a mapping
        segment: String,
    },
}

impl fmt::Display for VarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarError::Undefined { path } => {
                write!(f, "Undefined variable '{}'", path)
            }
            VarError::NotAMapping { path, segment } => {
                write!(
                    f,
                    "Cannot resolve '{}': segment '{}' is not a mapping",
                    path, segment
                )
            }
        }
    }
}

impl std::error::Error for VarError {}

/// Merged name-to-value bindings visible to substitutions within a range.
///
/// Entries keep declaration order. Values are scalars or nested mappings,
/// exactly as written in the `@var` sections they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableScope {
    entries: Map<String, Value>,
}

impl VariableScope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self {
            entries: Map::new(),
        }
    }

    /// Creates a scope from pre-built entries. Mostly a test convenience.
    pub fn from_entries(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    /// Collects every `@var` section in the given range into one scope.
    ///
    /// Sections merge in document order: a later declaration of the same
    /// name overrides the earlier one. With no range the whole block is
    /// scanned. Read-only over the tree; safe to call repeatedly.
    ///
    /// # Arguments
    ///
    /// * `tree` - Syntax tree of the block
    /// * `text` - The block text the tree was parsed from
    /// * `range` - Optional byte range restricting which sections count
    pub fn declare(tree: &SyntaxTree, text: &str, range: Option<(usize, usize)>) -> Self {
        let (from, to) = range.unwrap_or((0, text.len()));
        let mut entries = Map::new();

        for &item in tree.items() {
            let node = tree.node(item);
            if node.kind != NodeKind::VarSection || node.start < from || node.end > to {
                continue;
            }
            let object = match tree.child_of_kind(item, NodeKind::Object) {
                Some(id) => id,
                None => continue,
            };
            for entry in tree.children_of_kind(object, NodeKind::Entry) {
                if let (Some(key), Some(value_id)) =
                    (entry_key(tree, text, entry), value_child(tree, entry))
                {
                    entries.insert(key, node_value(tree, text, value_id));
                }
            }
        }

        Self { entries }
    }

    /// Adds or overrides a single binding.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    /// Number of top-level bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether the scope has no bindings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a dotted path through nested mappings.
    ///
    /// Returns `None` on a missing segment or when a non-final segment
    /// lands on a scalar. Callers that need the distinction use
    /// [`VariableScope::resolve_strict`].
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.entries.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Resolves a dotted path, turning a miss into an error.
    ///
    /// Used only by callers that require resolution to succeed; ordinary
    /// substitution goes through [`VariableScope::lookup`] and degrades to
    /// leaving the token in place.
    pub fn resolve_strict(&self, path: &str) -> Result<&Value, VarError> {
        let mut current: Option<&Value> = None;
        let mut walked = String::new();

        for segment in path.split('.') {
            let subject = match current {
                None => self.entries.get(segment),
                Some(Value::Object(map)) => map.get(segment),
                Some(_) => {
                    return Err(VarError::NotAMapping {
                        path: path.to_string(),
                        segment: walked,
                    })
                }
            };
            match subject {
                Some(value) => current = Some(value),
                None => {
                    return Err(VarError::Undefined {
                        path: path.to_string(),
                    })
                }
            }
            walked = segment.to_string();
        }

        current.ok_or_else(|| VarError::Undefined {
            path: path.to_string(),
        })
    }
}
