use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Knobs for the price sync engine. Defaults match the storefront theme
/// extension's markup contract.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_container_id_prefix")]
    pub container_id_prefix: String,
    #[serde(default = "default_mirror_class")]
    pub mirror_class: String,
    #[serde(default = "default_variant_query_param")]
    pub variant_query_param: String,
    #[serde(default = "default_money_format")]
    pub default_money_format: String,
    /// Also rewrite mirrors when the poller picks up a variant change.
    /// Off: mirrors only follow through mutation backfill.
    #[serde(default)]
    pub refresh_mirrors_on_poll: bool,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

const MIN_POLL_INTERVAL_MS: u64 = 1;

fn default_poll_interval_ms() -> u64 { 500 }
fn default_container_id_prefix() -> String { "b2b-price-container".into() }
fn default_mirror_class() -> String { "gd-b2b-price-update".into() }
fn default_variant_query_param() -> String { "variant".into() }
fn default_money_format() -> String { "${{amount}}".into() }
fn default_event_capacity() -> usize { 64 }

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            container_id_prefix: default_container_id_prefix(),
            mirror_class: default_mirror_class(),
            variant_query_param: default_variant_query_param(),
            default_money_format: default_money_format(),
            refresh_mirrors_on_poll: false,
            event_capacity: default_event_capacity(),
        }
    }
}

impl EngineSettings {
    /// Poll period, never shorter than 1ms (a zero period is not a valid timer).
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    /// Element id of a block's primary region
    pub fn container_id(&self, block_id: &str) -> String {
        format!("{}-{}", self.container_id_prefix, block_id)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String { "pricesync=info,pricesync_engine=debug".into() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Built-in defaults cover every key, so all files are optional
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `PRICESYNC__ENGINE__POLL_INTERVAL_MS=250`
            .add_source(config::Environment::with_prefix("PRICESYNC").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
