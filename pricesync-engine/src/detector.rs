use crate::instance::EngineInstance;
use crate::sink::RenderSink;
use pricesync_core::{Document, Location, MutationRecord};
use pricesync_shared::{PresentationKind, VariantId};
use pricesync_store::EngineSettings;
use tracing::debug;

/// Result of one resolve -> format -> render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub variant_id: Option<VariantId>,
    /// `None` when the variant had no price data and nothing was written
    pub presentation: Option<PresentationKind>,
    pub regions_written: usize,
}

/// The two variant-change triggers. Both handlers take the instance
/// explicitly; the detector itself holds only settings.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    variant_param: String,
    refresh_mirrors_on_poll: bool,
}

impl ChangeDetector {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            variant_param: settings.variant_query_param.clone(),
            refresh_mirrors_on_poll: settings.refresh_mirrors_on_poll,
        }
    }

    /// Timer tick: follow the address bar's variant parameter.
    ///
    /// Returns `None` when the parameter is absent or unchanged. A change
    /// re-renders the primary region only (mirrors too when
    /// `refresh_mirrors_on_poll` is set); mirrors otherwise keep the fragment
    /// they last received.
    pub fn on_poll<D: Document, L: Location>(
        &self,
        instance: &mut EngineInstance,
        document: &mut D,
        location: &L,
        sink: &RenderSink,
    ) -> Option<RenderOutcome> {
        let variant_id = VariantId::from(location.query_param(&self.variant_param)?);
        if instance.current_variant_id() == Some(&variant_id) {
            return None;
        }

        debug!(block_id = %instance.block_id(), variant_id = %variant_id, "Variant changed in address");
        instance.set_current_variant(variant_id.clone());

        let Some(presentation) = instance.refresh() else {
            return Some(RenderOutcome {
                variant_id: Some(variant_id),
                presentation: None,
                regions_written: 0,
            });
        };

        let regions_written = if self.refresh_mirrors_on_poll {
            sink.render(document, instance)
        } else {
            sink.render_primary(document, instance)
        };

        Some(RenderOutcome {
            variant_id: Some(variant_id),
            presentation: Some(presentation),
            regions_written,
        })
    }

    /// Subtree childList notification: replay the last fragment into any
    /// mirrors that were just inserted. No re-resolution happens here.
    pub fn on_mutations<D: Document>(
        &self,
        instance: &EngineInstance,
        document: &mut D,
        records: &[MutationRecord],
        sink: &RenderSink,
    ) -> usize {
        records
            .iter()
            .flat_map(|record| record.added_nodes.iter())
            .map(|node| sink.backfill(document, *node, instance.current_html()))
            .sum()
    }
}
