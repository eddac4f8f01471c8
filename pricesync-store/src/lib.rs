pub mod app_config;
pub mod page_source;

pub use app_config::{Config, EngineSettings, LoggingConfig};
pub use page_source::{PageAction, PageFixture, PageSourceError, ScriptStep};
