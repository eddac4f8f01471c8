use crate::models::variant::{VariantId, VariantPriceRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Host-supplied description of one price block on the page.
///
/// Read-only for the engine. Missing `blockId` or `variantsData` are tolerated:
/// lookups against them simply find nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    #[serde(rename = "blockId", default)]
    pub block_id: String,

    #[serde(rename = "isB2B", default)]
    pub is_b2b: bool,

    /// Money template, e.g. `"${{amount}}"`. Empty means "use the default".
    #[serde(rename = "moneyFormat", default)]
    pub money_format: Option<String>,

    #[serde(rename = "variantsData", default)]
    pub variants_data: HashMap<VariantId, VariantPriceRecord>,

    #[serde(rename = "selectedVariantId", default)]
    pub selected_variant_id: Option<VariantId>,
}

impl BlockConfig {
    pub fn new(block_id: impl Into<String>, is_b2b: bool) -> Self {
        Self {
            block_id: block_id.into(),
            is_b2b,
            money_format: None,
            variants_data: HashMap::new(),
            selected_variant_id: None,
        }
    }

    pub fn with_money_format(mut self, template: impl Into<String>) -> Self {
        self.money_format = Some(template.into());
        self
    }

    pub fn with_variant(mut self, id: impl Into<VariantId>, record: VariantPriceRecord) -> Self {
        self.variants_data.insert(id.into(), record);
        self
    }

    pub fn with_selected(mut self, id: impl Into<VariantId>) -> Self {
        self.selected_variant_id = Some(id.into());
        self
    }

    pub fn variant(&self, id: &VariantId) -> Option<&VariantPriceRecord> {
        self.variants_data.get(id)
    }
}
