use crate::registry::RegisteredConfig;
use pricesync_catalog::{render_presentation, resolve, MoneyFormat};
use pricesync_shared::{BlockConfig, PresentationKind, VariantId};
use pricesync_store::EngineSettings;
use std::sync::Arc;

/// Lifecycle of an instance. Instances watch until the page goes away;
/// there is no pause or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    Watching,
}

/// Runtime state for one block. Never shared between blocks.
#[derive(Debug, Clone)]
pub struct EngineInstance {
    config: Arc<BlockConfig>,
    money_format: MoneyFormat,
    container_id: String,
    current_variant_id: Option<VariantId>,
    /// Last rendered fragment, replayed into newly inserted mirrors
    current_html: String,
    state: InstanceState,
}

impl EngineInstance {
    pub fn new(entry: &RegisteredConfig, settings: &EngineSettings) -> Self {
        Self {
            container_id: settings.container_id(&entry.config.block_id),
            current_variant_id: entry.config.selected_variant_id.clone(),
            config: Arc::clone(&entry.config),
            money_format: entry.money_format.clone(),
            current_html: String::new(),
            state: InstanceState::Watching,
        }
    }

    pub fn block_id(&self) -> &str {
        &self.config.block_id
    }

    pub fn config(&self) -> &BlockConfig {
        &self.config
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn current_variant_id(&self) -> Option<&VariantId> {
        self.current_variant_id.as_ref()
    }

    pub fn current_html(&self) -> &str {
        &self.current_html
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub(crate) fn set_current_variant(&mut self, variant_id: VariantId) {
        self.current_variant_id = Some(variant_id);
    }

    /// Resolve the current variant and store the resulting fragment.
    ///
    /// Unknown variants leave `current_html` as it was and return `None`.
    pub(crate) fn refresh(&mut self) -> Option<PresentationKind> {
        let variant_id = self.current_variant_id.as_ref()?;
        let presentation = resolve(variant_id, &self.config)?;
        let kind = presentation.kind();
        let html = render_presentation(&presentation, &self.money_format);
        self.current_html = html;
        Some(kind)
    }
}
