use crate::detector::{ChangeDetector, RenderOutcome};
use crate::instance::EngineInstance;
use crate::registry::{ConfigRegistry, RegisteredConfig};
use crate::sink::RenderSink;
use crate::EngineResult;
use chrono::Utc;
use pricesync_core::{Document, Location};
use pricesync_shared::{BlockConfig, PriceRenderedEvent, RenderTrigger};
use pricesync_store::EngineSettings;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Keeps every price block on one page in sync with the selected variant.
///
/// All entry points run to completion; callers drive them from a single
/// task (see `PageRuntime`), which is what keeps instances free of locks.
pub struct PriceSyncEngine<D, L> {
    settings: EngineSettings,
    registry: ConfigRegistry,
    instances: Vec<EngineInstance>,
    sink: RenderSink,
    detector: ChangeDetector,
    document: D,
    location: L,
    events: broadcast::Sender<PriceRenderedEvent>,
}

impl<D: Document, L: Location> PriceSyncEngine<D, L> {
    pub fn new(settings: EngineSettings, document: D, location: L) -> Self {
        let registry = ConfigRegistry::new(&settings);
        Self::start(settings, registry, document, location)
    }

    /// Start with configs the host registered before the engine existed.
    /// Each gets its instance and initial render, in registration order.
    pub fn start(settings: EngineSettings, registry: ConfigRegistry, document: D, location: L) -> Self {
        let (events, _) = broadcast::channel(settings.event_capacity.max(1));
        Self::start_with_events(settings, registry, document, location, events)
    }

    /// Like `start`, publishing on a channel the caller already subscribed
    /// to, so the initial renders are observable too.
    pub fn start_with_events(
        settings: EngineSettings,
        registry: ConfigRegistry,
        mut document: D,
        location: L,
        events: broadcast::Sender<PriceRenderedEvent>,
    ) -> Self {
        // Changes made before anyone observed the page are not reported
        let stale = document.take_mutations();
        if !stale.is_empty() {
            debug!(records = stale.len(), "Discarding mutations from before start");
        }

        let pre_seeded = registry.entries().to_vec();
        let mut engine = Self {
            sink: RenderSink::new(&settings),
            detector: ChangeDetector::new(&settings),
            instances: Vec::with_capacity(registry.len()),
            settings,
            registry,
            document,
            location,
            events,
        };

        info!(blocks = pre_seeded.len(), "Price sync engine started");
        for entry in &pre_seeded {
            engine.initialize(entry);
        }
        engine
    }

    /// Append a config and initialise it before returning
    pub fn register(&mut self, config: BlockConfig) -> EngineResult<&EngineInstance> {
        // Deliver pending records to the instances that were watching when
        // they happened; the new instance only sees later changes
        self.process_mutations();

        let entry = self.registry.register(config)?.clone();
        let index = self.initialize(&entry);
        Ok(&self.instances[index])
    }

    /// One timer tick for every instance
    pub fn poll(&mut self) -> usize {
        let mut changed = 0;
        for index in 0..self.instances.len() {
            let outcome = self.detector.on_poll(
                &mut self.instances[index],
                &mut self.document,
                &self.location,
                &self.sink,
            );
            if let Some(outcome) = outcome {
                changed += 1;
                if outcome.presentation.is_some() {
                    self.publish(index, &outcome, RenderTrigger::Poll);
                }
            }
        }
        changed
    }

    /// Drain the document's mutation records and hand them to every
    /// instance in registration order. Returns the number of region writes.
    pub fn process_mutations(&mut self) -> usize {
        let records = self.document.take_mutations();
        if records.is_empty() {
            return 0;
        }

        let mut written = 0;
        for index in 0..self.instances.len() {
            let regions_written = self.detector.on_mutations(
                &self.instances[index],
                &mut self.document,
                &records,
                &self.sink,
            );
            if regions_written > 0 {
                let outcome = RenderOutcome {
                    variant_id: self.instances[index].current_variant_id().cloned(),
                    presentation: None,
                    regions_written,
                };
                self.publish(index, &outcome, RenderTrigger::Mutation);
                written += regions_written;
            }
        }
        // Backfills replace content and never queue further records
        written
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PriceRenderedEvent> {
        self.events.subscribe()
    }

    pub fn instances(&self) -> &[EngineInstance] {
        &self.instances
    }

    /// First instance registered for `block_id`
    pub fn instance(&self, block_id: &str) -> Option<&EngineInstance> {
        self.instances.iter().find(|i| i.block_id() == block_id)
    }

    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    fn initialize(&mut self, entry: &RegisteredConfig) -> usize {
        let mut instance = EngineInstance::new(entry, &self.settings);
        let presentation = instance.refresh();
        let regions_written = match presentation {
            Some(_) => self.sink.render(&mut self.document, &instance),
            None => 0,
        };

        info!(
            block_id = %instance.block_id(),
            variant_id = ?instance.current_variant_id().map(|v| v.as_str()),
            regions_written,
            "Price block initialised"
        );

        let outcome = RenderOutcome {
            variant_id: instance.current_variant_id().cloned(),
            presentation,
            regions_written,
        };
        self.instances.push(instance);
        let index = self.instances.len() - 1;
        if presentation.is_some() {
            self.publish(index, &outcome, RenderTrigger::Initial);
        }
        index
    }

    fn publish(&self, index: usize, outcome: &RenderOutcome, trigger: RenderTrigger) {
        let instance = &self.instances[index];
        if trigger == RenderTrigger::Poll {
            info!(
                block_id = %instance.block_id(),
                variant_id = ?outcome.variant_id.as_ref().map(|v| v.as_str()),
                regions_written = outcome.regions_written,
                "Price re-rendered"
            );
        }
        // No subscribers is fine
        let _ = self.events.send(PriceRenderedEvent {
            block_id: instance.block_id().to_string(),
            variant_id: outcome.variant_id.clone(),
            presentation: outcome.presentation,
            trigger,
            regions_written: outcome.regions_written,
            rendered_at: Utc::now(),
        });
    }
}
