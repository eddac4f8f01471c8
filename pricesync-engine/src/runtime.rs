use crate::engine::PriceSyncEngine;
use crate::{EngineError, EngineResult};
use pricesync_core::{Document, MemoryDocument, NodeSpec, PageLocation};
use pricesync_shared::BlockConfig;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

pub type PageEngine = PriceSyncEngine<MemoryDocument, PageLocation>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionRole {
    Primary,
    Mirror,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionSnapshot {
    pub role: RegionRole,
    /// Owning block for primary regions
    pub block_id: Option<String>,
    pub html: String,
}

/// Rendered state of every price region on the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageSnapshot {
    pub href: String,
    pub regions: Vec<RegionSnapshot>,
}

impl PageSnapshot {
    pub fn primary(&self, block_id: &str) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.role == RegionRole::Primary && r.block_id.as_deref() == Some(block_id))
            .map(|r| r.html.as_str())
    }

    pub fn mirrors(&self) -> impl Iterator<Item = &str> {
        self.regions
            .iter()
            .filter(|r| r.role == RegionRole::Mirror)
            .map(|r| r.html.as_str())
    }
}

enum PageCommand {
    Navigate {
        href: String,
        reply: oneshot::Sender<EngineResult<()>>,
    },
    Insert {
        parent: Option<String>,
        node: NodeSpec,
        reply: oneshot::Sender<EngineResult<()>>,
    },
    Remove {
        id: String,
        reply: oneshot::Sender<EngineResult<()>>,
    },
    Register {
        config: BlockConfig,
        reply: oneshot::Sender<EngineResult<String>>,
    },
    Snapshot {
        reply: oneshot::Sender<PageSnapshot>,
    },
    Shutdown,
}

/// Host-side handle to a running page
#[derive(Clone)]
pub struct PageHandle {
    tx: mpsc::Sender<PageCommand>,
}

impl PageHandle {
    /// Replace the page address, as the variant picker does
    pub async fn navigate(&self, href: impl Into<String>) -> EngineResult<()> {
        let href = href.into();
        self.request(|reply| PageCommand::Navigate { href, reply }).await?
    }

    /// Insert a subtree under the element with id `parent`, or under the body
    pub async fn insert(&self, parent: Option<String>, node: NodeSpec) -> EngineResult<()> {
        self.request(|reply| PageCommand::Insert { parent, node, reply }).await?
    }

    pub async fn remove(&self, id: impl Into<String>) -> EngineResult<()> {
        let id = id.into();
        self.request(|reply| PageCommand::Remove { id, reply }).await?
    }

    /// Register a block config; resolves to its primary region id
    pub async fn register(&self, config: BlockConfig) -> EngineResult<String> {
        self.request(|reply| PageCommand::Register { config, reply }).await?
    }

    pub async fn snapshot(&self) -> EngineResult<PageSnapshot> {
        self.request(|reply| PageCommand::Snapshot { reply }).await
    }

    pub async fn shutdown(&self) {
        // Already stopped is fine
        let _ = self.tx.send(PageCommand::Shutdown).await;
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> PageCommand,
    ) -> EngineResult<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| EngineError::RuntimeClosed)?;
        rx.await.map_err(|_| EngineError::RuntimeClosed)
    }
}

/// Drives one engine over an in-memory page on a single task.
///
/// Timer ticks and host commands are handled one at a time, each to
/// completion, followed by delivery of whatever mutation records it queued.
pub struct PageRuntime {
    engine: PageEngine,
    commands: mpsc::Receiver<PageCommand>,
}

impl PageRuntime {
    pub fn new(engine: PageEngine) -> (Self, PageHandle) {
        let (tx, commands) = mpsc::channel(32);
        (Self { engine, commands }, PageHandle { tx })
    }

    /// Run until shutdown (or every handle is dropped) and hand the engine back
    pub async fn run(mut self) -> PageEngine {
        let period = self.engine.settings().poll_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(poll_ms = period.as_millis() as u64, "Page runtime running");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.engine.poll();
                }
                command = self.commands.recv() => match command {
                    Some(PageCommand::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
            }
            self.engine.process_mutations();
        }

        info!("Page runtime stopped");
        self.engine
    }

    fn handle(&mut self, command: PageCommand) {
        match command {
            PageCommand::Navigate { href, reply } => {
                let result = self.engine.location_mut().navigate(&href).map_err(EngineError::from);
                let _ = reply.send(result);
            }
            PageCommand::Insert { parent, node, reply } => {
                let document = self.engine.document_mut();
                let result = match parent {
                    Some(parent) => document.append_to(&parent, &node).map(|_| ()),
                    None => {
                        document.append_to_body(&node);
                        Ok(())
                    }
                };
                let _ = reply.send(result.map_err(EngineError::from));
            }
            PageCommand::Remove { id, reply } => {
                let result = self.engine.document_mut().remove_by_id(&id).map(|_| ());
                let _ = reply.send(result.map_err(EngineError::from));
            }
            PageCommand::Register { config, reply } => {
                let result = self
                    .engine
                    .register(config)
                    .map(|instance| instance.container_id().to_string());
                if let Err(err) = &result {
                    warn!(error = %err, "Late registration failed");
                }
                let _ = reply.send(result);
            }
            PageCommand::Snapshot { reply } => {
                let _ = reply.send(snapshot(&self.engine));
            }
            PageCommand::Shutdown => {}
        }
    }
}

/// Collect primary regions (registration order) then mirrors (document order)
pub fn snapshot(engine: &PageEngine) -> PageSnapshot {
    let document = engine.document();
    let mut regions = Vec::new();

    for instance in engine.instances() {
        if let Some(node) = document.element_by_id(instance.container_id()) {
            regions.push(RegionSnapshot {
                role: RegionRole::Primary,
                block_id: Some(instance.block_id().to_string()),
                html: document.inner_html(node),
            });
        }
    }
    for node in document.elements_by_class(&engine.settings().mirror_class) {
        regions.push(RegionSnapshot {
            role: RegionRole::Mirror,
            block_id: None,
            html: document.inner_html(node),
        });
    }

    PageSnapshot {
        href: engine.location().href().to_string(),
        regions,
    }
}
