use crate::money::MoneyFormat;
use crate::pricing::Presentation;

const STRIKE_STYLE: &str = "text-decoration: line-through;";

/// Build the html fragment written into price regions
pub fn render_presentation(presentation: &Presentation<'_>, format: &MoneyFormat) -> String {
    match presentation {
        Presentation::B2b { current, original } => format!(
            r#"<div class="b2b-price-wrapper b2b-customer-price"><span class="b2b-price-current">{}</span><span class="b2b-price-original" style="{}">{}</span></div>"#,
            format.format(current),
            STRIKE_STYLE,
            format.format(original),
        ),
        Presentation::Sale { current, compare_at } => format!(
            r#"<div class="b2b-price-wrapper b2b-regular-sale"><span class="b2b-price-current">{}</span><span class="b2b-price-compare" style="{}">{}</span></div>"#,
            format.format(current),
            STRIKE_STYLE,
            format.format(compare_at),
        ),
        Presentation::Regular { current } => format!(
            r#"<div class="b2b-price-wrapper b2b-regular-price"><span class="b2b-price-current">{}</span></div>"#,
            format.format(current),
        ),
    }
}
