use crate::models::variant::VariantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which of the three price presentations a variant resolved to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PresentationKind {
    B2b,
    Sale,
    Regular,
}

/// What caused a region write
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenderTrigger {
    Initial,
    Poll,
    Mutation,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PriceRenderedEvent {
    pub block_id: String,
    pub variant_id: Option<VariantId>,
    /// `None` for mutation backfills, which replay html without resolving
    pub presentation: Option<PresentationKind>,
    pub trigger: RenderTrigger,
    pub regions_written: usize,
    pub rendered_at: DateTime<Utc>,
}
