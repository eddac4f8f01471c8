pub mod registry;
pub mod instance;
pub mod sink;
pub mod detector;
pub mod engine;
pub mod runtime;

pub use registry::{ConfigRegistry, RegisteredConfig, RegistryError};
pub use instance::{EngineInstance, InstanceState};
pub use sink::RenderSink;
pub use detector::{ChangeDetector, RenderOutcome};
pub use engine::PriceSyncEngine;
pub use runtime::{PageEngine, PageHandle, PageRuntime, PageSnapshot, RegionRole, RegionSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Page(#[from] pricesync_core::CoreError),
    #[error("Page runtime has shut down")]
    RuntimeClosed,
}

pub type EngineResult<T> = Result<T, EngineError>;
