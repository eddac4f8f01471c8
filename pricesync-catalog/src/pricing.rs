use pricesync_shared::{BlockConfig, MinorAmount, PresentationKind, VariantId, VariantPriceRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Customer classification the resolver needs
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricingContext {
    /// Logged-in customer belongs to a B2B company with negotiated prices
    pub is_b2b: bool,
}

impl From<&BlockConfig> for PricingContext {
    fn from(config: &BlockConfig) -> Self {
        Self { is_b2b: config.is_b2b }
    }
}

/// The price presentation chosen for one variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presentation<'a> {
    /// Negotiated price, with the list price struck through
    B2b {
        current: &'a MinorAmount,
        original: &'a MinorAmount,
    },
    /// Public sale, with the compare-at price struck through
    Sale {
        current: &'a MinorAmount,
        compare_at: &'a MinorAmount,
    },
    Regular { current: &'a MinorAmount },
}

impl Presentation<'_> {
    pub fn kind(&self) -> PresentationKind {
        match self {
            Presentation::B2b { .. } => PresentationKind::B2b,
            Presentation::Sale { .. } => PresentationKind::Sale,
            Presentation::Regular { .. } => PresentationKind::Regular,
        }
    }

    pub fn current(&self) -> &MinorAmount {
        match self {
            Presentation::B2b { current, .. }
            | Presentation::Sale { current, .. }
            | Presentation::Regular { current } => current,
        }
    }
}

/// Pick the presentation for a single record.
///
/// A zero or missing B2B price is "no override" and falls through to the
/// public sale/regular logic.
pub fn resolve_record<'a>(record: &'a VariantPriceRecord, context: &PricingContext) -> Presentation<'a> {
    if context.is_b2b {
        if let Some(b2b) = record.b2b_price.as_ref() {
            if b2b.to_minor_units().is_some_and(|cents| cents > 0) {
                return Presentation::B2b {
                    current: b2b,
                    original: &record.price,
                };
            }
        }
    }

    if let Some(compare_at) = record.compare_at_price.as_ref() {
        let on_sale = match (compare_at.to_minor_units(), record.price.to_minor_units()) {
            (Some(compare), Some(price)) => compare > price,
            _ => false,
        };
        if on_sale {
            return Presentation::Sale {
                current: &record.price,
                compare_at,
            };
        }
    }

    Presentation::Regular {
        current: &record.price,
    }
}

/// Resolve `variant_id` against a block's price data.
///
/// Returns `None` for variants the block has no data for; callers must leave
/// whatever they rendered before untouched.
pub fn resolve<'a>(variant_id: &VariantId, config: &'a BlockConfig) -> Option<Presentation<'a>> {
    let Some(record) = config.variant(variant_id) else {
        debug!(block_id = %config.block_id, variant_id = %variant_id, "No price data for variant");
        return None;
    };
    Some(resolve_record(record, &PricingContext::from(config)))
}
