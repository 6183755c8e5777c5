use super::range::SlotAddress;
use crate::ast::AstId;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// One containing struct variable on the way down to a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSegment {
    /// Id of the struct-typed variable (or member)
    pub declaration: AstId,
    /// Its name
    pub label: String,
    /// Where that struct instance began
    pub start: SlotAddress,
}

#[derive(Debug)]
struct PathNode {
    segment: PathSegment,
    parent: SlotPath,
}

/// Chain of containing struct instances, innermost first.
///
/// Extending a path shares the parent chain, so every member of a struct
/// holds the same tail without copying it.
#[derive(Debug, Clone, Default)]
pub struct SlotPath(Option<Arc<PathNode>>);

impl SlotPath {
    /// Path of a top-level variable.
    pub fn root() -> Self {
        Self(None)
    }

    /// New path with `segment` as the innermost container.
    pub fn push(&self, segment: PathSegment) -> Self {
        Self(Some(Arc::new(PathNode {
            segment,
            parent: self.clone(),
        })))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    /// Number of containing structs.
    pub fn depth(&self) -> usize {
        self.iter().count()
    }

    /// Innermost container, if any.
    pub fn parent(&self) -> Option<&PathSegment> {
        self.0.as_deref().map(|node| &node.segment)
    }

    /// Segments from innermost to outermost.
    pub fn iter(&self) -> impl Iterator<Item = &PathSegment> {
        std::iter::successors(self.0.as_deref(), |node| node.parent.0.as_deref())
            .map(|node| &node.segment)
    }

    /// Segments from outermost to innermost.
    pub fn outermost_first(&self) -> Vec<&PathSegment> {
        let mut segments: Vec<_> = self.iter().collect();
        segments.reverse();
        segments
    }

    /// Dotted label for a member at the end of this path, e.g. `config.limits.max`.
    pub fn label_for(&self, name: &str) -> String {
        let mut parts: Vec<&str> = self
            .outermost_first()
            .into_iter()
            .map(|s| s.label.as_str())
            .collect();
        parts.push(name);
        parts.join(".")
    }
}

impl PartialEq for SlotPath {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for SlotPath {}

impl Serialize for SlotPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.outermost_first())
    }
}
