pub mod models;

pub use models::block::BlockConfig;
pub use models::events::{PresentationKind, PriceRenderedEvent, RenderTrigger};
pub use models::variant::{MinorAmount, VariantId, VariantPriceRecord};
