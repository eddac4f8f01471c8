pub mod money;
pub mod pricing;
pub mod markup;

pub use money::{format_money, AmountStyle, MoneyFormat, MoneyFormatError};
pub use pricing::{resolve, resolve_record, Presentation, PricingContext};
pub use markup::render_presentation;
