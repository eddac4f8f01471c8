use crate::document::{Document, MutationRecord, NodeId, NodeSpec};
use crate::{CoreError, CoreResult};
use tracing::debug;

#[derive(Debug, Clone)]
enum NodeKind {
    Element { tag: String },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    id: Option<String>,
    classes: Vec<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    /// Markup written through `set_inner_html`. Stored opaquely, never parsed.
    html: Option<String>,
}

impl Node {
    fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }
}

/// Arena-backed page model with a `<body>` root.
///
/// Structural changes (`append_child`, `remove`) queue mutation records the
/// way a subtree childList observer on `<body>` would see them.
///
/// Detached nodes keep their arena slot so `NodeId`s handed out in mutation
/// records stay readable. Nothing is reclaimed until the document is dropped,
/// which is fine for one page view but not for a long-lived document.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    body: NodeId,
    pending: Vec<MutationRecord>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        let body = Node {
            kind: NodeKind::Element { tag: "body".to_string() },
            id: None,
            classes: Vec::new(),
            children: Vec::new(),
            parent: None,
            html: None,
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            pending: Vec::new(),
        }
    }

    /// Build a document from top-level body children without queuing
    /// mutations, as if the markup had been served with the page.
    pub fn from_specs(specs: &[NodeSpec]) -> Self {
        let mut doc = Self::new();
        for spec in specs {
            let node = doc.build(spec, Some(doc.body));
            doc.nodes[doc.body.0].children.push(node);
        }
        doc
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn append_child(&mut self, parent: NodeId, spec: &NodeSpec) -> CoreResult<NodeId> {
        let parent_node = self.node(parent).ok_or(CoreError::NotAnElement(parent))?;
        if !parent_node.is_element() {
            return Err(CoreError::NotAnElement(parent));
        }

        let node = self.build(spec, Some(parent));
        let parent_node = &mut self.nodes[parent.0];
        // Inserting into a region previously filled through innerHTML
        // turns its content back into real children
        if parent_node.html.take().is_some() {
            debug!(node = %parent, "Dropping opaque markup before child insert");
        }
        parent_node.children.push(node);

        self.pending.push(MutationRecord {
            target: parent,
            added_nodes: vec![node],
            removed_nodes: Vec::new(),
        });
        Ok(node)
    }

    pub fn append_to_body(&mut self, spec: &NodeSpec) -> NodeId {
        let node = self.build(spec, Some(self.body));
        self.nodes[self.body.0].children.push(node);
        self.pending.push(MutationRecord {
            target: self.body,
            added_nodes: vec![node],
            removed_nodes: Vec::new(),
        });
        node
    }

    /// Append under the element with id `parent_id`
    pub fn append_to(&mut self, parent_id: &str, spec: &NodeSpec) -> CoreResult<NodeId> {
        let parent = self
            .element_by_id(parent_id)
            .ok_or_else(|| CoreError::ElementNotFound(parent_id.to_string()))?;
        self.append_child(parent, spec)
    }

    /// Detach `node` and its subtree from the document
    pub fn remove(&mut self, node: NodeId) -> CoreResult<()> {
        let parent = self
            .node(node)
            .and_then(|n| n.parent)
            .ok_or_else(|| CoreError::ElementNotFound(node.to_string()))?;

        self.nodes[parent.0].children.retain(|child| *child != node);
        self.nodes[node.0].parent = None;
        self.pending.push(MutationRecord {
            target: parent,
            added_nodes: Vec::new(),
            removed_nodes: vec![node],
        });
        Ok(())
    }

    pub fn remove_by_id(&mut self, id: &str) -> CoreResult<NodeId> {
        let node = self
            .element_by_id(id)
            .ok_or_else(|| CoreError::ElementNotFound(id.to_string()))?;
        self.remove(node)?;
        Ok(node)
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.body {
                return true;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let Some(n) = self.node(node) else {
            return String::new();
        };
        match &n.kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { tag } => {
                let mut out = format!("<{}", tag);
                if let Some(id) = &n.id {
                    out.push_str(&format!(" id=\"{}\"", id));
                }
                if !n.classes.is_empty() {
                    out.push_str(&format!(" class=\"{}\"", n.classes.join(" ")));
                }
                out.push('>');
                out.push_str(&self.inner_html(node));
                out.push_str(&format!("</{}>", tag));
                out
            }
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn build(&mut self, spec: &NodeSpec, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        match spec {
            NodeSpec::Text { text } => {
                self.nodes.push(Node {
                    kind: NodeKind::Text(text.clone()),
                    id: None,
                    classes: Vec::new(),
                    children: Vec::new(),
                    parent,
                    html: None,
                });
            }
            NodeSpec::Element { tag, id: element_id, classes, children } => {
                self.nodes.push(Node {
                    kind: NodeKind::Element { tag: tag.clone() },
                    id: element_id.clone(),
                    classes: classes.clone(),
                    children: Vec::new(),
                    parent,
                    html: None,
                });
                for child in children {
                    let child_id = self.build(child, Some(id));
                    self.nodes[id.0].children.push(child_id);
                }
            }
        }
        id
    }

    /// Pre-order walk of `root`'s subtree
    fn collect(&self, root: NodeId, include_root: bool, pred: &dyn Fn(&Node) -> bool) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = Vec::new();
        if include_root {
            stack.push(root);
        } else if let Some(n) = self.node(root) {
            stack.extend(n.children.iter().rev().copied());
        }

        while let Some(id) = stack.pop() {
            let Some(n) = self.node(id) else { continue };
            if pred(n) {
                found.push(id);
            }
            stack.extend(n.children.iter().rev().copied());
        }
        found
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for MemoryDocument {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.collect(self.body, true, &|n: &Node| n.is_element() && n.id.as_deref() == Some(id))
            .into_iter()
            .next()
    }

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.collect(self.body, true, &|n: &Node| {
            n.is_element() && n.classes.iter().any(|c| c == class)
        })
    }

    fn descendants_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.collect(root, false, &|n: &Node| {
            n.is_element() && n.classes.iter().any(|c| c == class)
        })
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(Node::is_element)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node)
            .is_some_and(|n| n.is_element() && n.classes.iter().any(|c| c == class))
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) {
        if !self.is_element(node) {
            return;
        }
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        self.nodes[node.0].html = Some(html.to_string());
    }

    fn inner_html(&self, node: NodeId) -> String {
        let Some(n) = self.node(node) else {
            return String::new();
        };
        match (&n.kind, &n.html) {
            (NodeKind::Text(text), _) => text.clone(),
            (_, Some(html)) => html.clone(),
            (_, None) => n.children.iter().map(|child| self.outer_html(*child)).collect(),
        }
    }

    fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending)
    }
}
