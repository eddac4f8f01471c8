use crate::instance::EngineInstance;
use pricesync_core::{Document, NodeId};
use pricesync_store::EngineSettings;

/// Writes an instance's current fragment into page regions.
///
/// Every write replaces the region's whole content, so repeating a render
/// leaves the page unchanged. Missing regions are skipped.
#[derive(Debug, Clone)]
pub struct RenderSink {
    mirror_class: String,
}

impl RenderSink {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            mirror_class: settings.mirror_class.clone(),
        }
    }

    pub fn mirror_class(&self) -> &str {
        &self.mirror_class
    }

    /// Primary region plus every mirror currently in the document
    pub fn render<D: Document>(&self, document: &mut D, instance: &EngineInstance) -> usize {
        self.render_primary(document, instance) + self.render_mirrors(document, instance.current_html())
    }

    pub fn render_primary<D: Document>(&self, document: &mut D, instance: &EngineInstance) -> usize {
        match document.element_by_id(instance.container_id()) {
            Some(node) => {
                document.set_inner_html(node, instance.current_html());
                1
            }
            None => 0,
        }
    }

    pub fn render_mirrors<D: Document>(&self, document: &mut D, html: &str) -> usize {
        let mirrors = document.elements_by_class(&self.mirror_class);
        for node in &mirrors {
            document.set_inner_html(*node, html);
        }
        mirrors.len()
    }

    /// Fill mirrors inside a freshly inserted node.
    ///
    /// A node that is itself a mirror is written directly and its subtree is
    /// not searched.
    pub fn backfill<D: Document>(&self, document: &mut D, added: NodeId, html: &str) -> usize {
        if !document.is_element(added) {
            return 0;
        }
        if document.has_class(added, &self.mirror_class) {
            document.set_inner_html(added, html);
            return 1;
        }
        let mirrors = document.descendants_by_class(added, &self.mirror_class);
        for node in &mirrors {
            document.set_inner_html(*node, html);
        }
        mirrors.len()
    }
}
