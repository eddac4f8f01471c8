use anyhow::Context;
use pricesync_core::{MemoryDocument, PageLocation};
use pricesync_engine::{ConfigRegistry, PageRuntime, PageSnapshot, PriceSyncEngine};
use pricesync_shared::PriceRenderedEvent;
use pricesync_store::{EngineSettings, PageAction, PageFixture};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

/// What a headless run of a page produced
#[derive(Debug, Serialize)]
pub struct PageReport {
    pub snapshot: PageSnapshot,
    pub events: Vec<PriceRenderedEvent>,
}

/// Load the fixture's page, run its script through a live runtime and report
/// the final regions.
///
/// Failed steps are logged and skipped; a price display problem never aborts
/// the page.
pub async fn run_fixture(fixture: PageFixture, settings: EngineSettings) -> anyhow::Result<PageReport> {
    let document = MemoryDocument::from_specs(&fixture.document);
    let location = PageLocation::parse(&fixture.url)
        .with_context(|| format!("Invalid page url {:?}", fixture.url))?;

    let mut registry = ConfigRegistry::new(&settings);
    for config in fixture.configs {
        if let Err(e) = registry.register(config) {
            error!("Skipping pre-seeded block: {}", e);
        }
    }

    let settle = settings.poll_interval();
    let (events_tx, mut rx) = broadcast::channel(settings.event_capacity.max(1));
    let engine = PriceSyncEngine::start_with_events(settings, registry, document, location, events_tx);
    let collector = tokio::spawn(async move {
        let mut events = Vec::new();
        loop {
            match rx.recv().await {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(skipped)) => warn!("Event collector lagged, {} events dropped", skipped),
                Err(RecvError::Closed) => break,
            }
        }
        events
    });

    let (runtime, handle) = PageRuntime::new(engine);
    let page = tokio::spawn(runtime.run());

    for (i, step) in fixture.script.into_iter().enumerate() {
        tokio::time::sleep(Duration::from_millis(step.after_ms)).await;
        let result = match step.action {
            PageAction::Navigate { url } => handle.navigate(url).await,
            PageAction::Insert { parent, node } => handle.insert(parent, node).await,
            PageAction::Remove { id } => handle.remove(id).await,
            PageAction::Register { config } => handle.register(config).await.map(|_| ()),
        };
        match result {
            Ok(()) => info!(step = i, "Script step applied"),
            Err(e) => warn!(step = i, error = %e, "Script step failed"),
        }
    }

    // Let a trailing navigation reach the poller
    tokio::time::sleep(settle).await;
    let snapshot = handle.snapshot().await?;
    handle.shutdown().await;

    let engine = page.await.context("Page runtime panicked")?;
    drop(engine);
    let events = collector.await.context("Event collector panicked")?;

    Ok(PageReport { snapshot, events })
}
