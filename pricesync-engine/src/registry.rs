use pricesync_catalog::{MoneyFormat, MoneyFormatError};
use pricesync_shared::BlockConfig;
use pricesync_store::EngineSettings;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A config accepted into the registry, with its money template validated
#[derive(Debug, Clone)]
pub struct RegisteredConfig {
    /// Position in registration order
    pub seq: usize,
    pub config: Arc<BlockConfig>,
    pub money_format: MoneyFormat,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Block {block_id:?} rejected: {source}")]
    InvalidMoneyFormat {
        block_id: String,
        #[source]
        source: MoneyFormatError,
    },
}

/// Append-only list of the block configs a page has handed over.
///
/// Hosts may fill it before the engine starts; once the engine owns it,
/// further configs go through `PriceSyncEngine::register` so that each one is
/// initialised as it is appended.
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    default_money_format: String,
    entries: Vec<RegisteredConfig>,
}

impl ConfigRegistry {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            default_money_format: settings.default_money_format.clone(),
            entries: Vec::new(),
        }
    }

    /// Validate and append. Rejected configs leave the registry untouched.
    pub fn register(&mut self, config: BlockConfig) -> Result<&RegisteredConfig, RegistryError> {
        let money_format =
            MoneyFormat::parse_or(config.money_format.as_deref(), &self.default_money_format)
                .map_err(|source| {
                    error!(block_id = %config.block_id, error = %source, "Rejecting block config");
                    RegistryError::InvalidMoneyFormat {
                        block_id: config.block_id.clone(),
                        source,
                    }
                })?;

        if self.entries.iter().any(|e| e.config.block_id == config.block_id) {
            warn!(block_id = %config.block_id, "Block id registered more than once, regions will be shared");
        }

        let seq = self.entries.len();
        info!(
            block_id = %config.block_id,
            seq,
            variants = config.variants_data.len(),
            is_b2b = config.is_b2b,
            "Block config registered"
        );
        self.entries.push(RegisteredConfig {
            seq,
            config: Arc::new(config),
            money_format,
        });
        Ok(&self.entries[seq])
    }

    pub fn entries(&self) -> &[RegisteredConfig] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
