use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a node owned by a `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A childList change: nodes inserted under (or removed from) `target`.
///
/// Only the roots of inserted subtrees are listed, descendants are reached by
/// querying the added node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
}

/// Declarative description of a subtree to insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text {
        text: String,
    },
    Element {
        tag: String,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        classes: Vec<String>,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
}

impl NodeSpec {
    pub fn element(tag: impl Into<String>) -> Self {
        NodeSpec::Element {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        NodeSpec::Text { text: text.into() }
    }

    pub fn with_id(mut self, value: impl Into<String>) -> Self {
        if let NodeSpec::Element { id, .. } = &mut self {
            *id = Some(value.into());
        }
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        if let NodeSpec::Element { classes, .. } = &mut self {
            classes.push(class.into());
        }
        self
    }

    pub fn with_child(mut self, child: NodeSpec) -> Self {
        if let NodeSpec::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }
}

/// The subset of a page's DOM the price engine reads and writes.
///
/// Implementations queue a `MutationRecord` for every childList change and
/// hand them out through `take_mutations`, in the order they happened.
pub trait Document {
    /// First attached element with this id, in document order
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Every attached element carrying `class`, in document order
    fn elements_by_class(&self, class: &str) -> Vec<NodeId>;

    /// Descendants of `root` (not `root` itself) carrying `class`
    fn descendants_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId>;

    fn is_element(&self, node: NodeId) -> bool;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Replace the whole content of `node` with `html`
    fn set_inner_html(&mut self, node: NodeId, html: &str);

    fn inner_html(&self, node: NodeId) -> String;

    /// Drain queued mutation records
    fn take_mutations(&mut self) -> Vec<MutationRecord>;
}
