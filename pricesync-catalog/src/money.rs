use once_cell::sync::Lazy;
use pricesync_shared::MinorAmount;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Template used when a block does not carry its own money format
pub const DEFAULT_MONEY_FORMAT: &str = "${{amount}}";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder pattern compiles"));

/// Amount rendering selected by the template placeholder
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AmountStyle {
    /// `{{amount}}` -> `1,234.56`
    Amount,
    /// `{{amount_no_decimals}}` -> `1,235`
    AmountNoDecimals,
    /// `{{amount_with_comma_separator}}` -> `1.234,56`
    AmountWithCommaSeparator,
    /// `{{amount_no_decimals_with_comma_separator}}` -> `1.235`
    AmountNoDecimalsWithCommaSeparator,
}

impl AmountStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "amount" => Some(AmountStyle::Amount),
            "amount_no_decimals" => Some(AmountStyle::AmountNoDecimals),
            "amount_with_comma_separator" => Some(AmountStyle::AmountWithCommaSeparator),
            "amount_no_decimals_with_comma_separator" => {
                Some(AmountStyle::AmountNoDecimalsWithCommaSeparator)
            }
            _ => None,
        }
    }

    pub fn precision(self) -> u32 {
        match self {
            AmountStyle::Amount | AmountStyle::AmountWithCommaSeparator => 2,
            AmountStyle::AmountNoDecimals | AmountStyle::AmountNoDecimalsWithCommaSeparator => 0,
        }
    }

    /// `(thousands, decimal)` separators
    pub fn separators(self) -> (char, char) {
        match self {
            AmountStyle::Amount | AmountStyle::AmountNoDecimals => (',', '.'),
            AmountStyle::AmountWithCommaSeparator
            | AmountStyle::AmountNoDecimalsWithCommaSeparator => ('.', ','),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyFormatError {
    #[error("Money format has no {{{{ amount }}}} placeholder: {0:?}")]
    MissingPlaceholder(String),

    #[error("Unsupported money placeholder {token:?} in format {template:?}")]
    UnsupportedPlaceholder { token: String, template: String },
}

/// A validated money template.
///
/// Only the first `{{ ... }}` token is substituted; the rest of the template,
/// markup included, is emitted verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyFormat {
    template: String,
    style: AmountStyle,
    placeholder: Range<usize>,
}

impl MoneyFormat {
    pub fn parse(template: &str) -> Result<Self, MoneyFormatError> {
        let captures = PLACEHOLDER
            .captures(template)
            .ok_or_else(|| MoneyFormatError::MissingPlaceholder(template.to_string()))?;

        // Group 0 and 1 always participate in a match
        let whole = captures.get(0).map(|m| m.range()).unwrap_or_default();
        let token = captures.get(1).map(|m| m.as_str()).unwrap_or_default();

        let style = AmountStyle::from_token(token).ok_or_else(|| {
            MoneyFormatError::UnsupportedPlaceholder {
                token: token.to_string(),
                template: template.to_string(),
            }
        })?;

        Ok(Self {
            template: template.to_string(),
            style,
            placeholder: whole,
        })
    }

    /// Parse `template`, falling back to `default` when it is absent or empty.
    pub fn parse_or(template: Option<&str>, default: &str) -> Result<Self, MoneyFormatError> {
        match template {
            Some(t) if !t.is_empty() => Self::parse(t),
            _ => Self::parse(default),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn style(&self) -> AmountStyle {
        self.style
    }

    pub fn format(&self, amount: &MinorAmount) -> String {
        self.substitute(&self.amount_text(amount.to_minor_units()))
    }

    pub fn format_cents(&self, cents: i64) -> String {
        self.substitute(&self.amount_text(Some(cents)))
    }

    fn amount_text(&self, cents: Option<i64>) -> String {
        match cents {
            Some(cents) => {
                let (thousands, decimal) = self.style.separators();
                format_with_delimiters(cents, self.style.precision(), thousands, decimal)
            }
            None => "0".to_string(),
        }
    }

    fn substitute(&self, value: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + value.len());
        out.push_str(&self.template[..self.placeholder.start]);
        out.push_str(value);
        out.push_str(&self.template[self.placeholder.end..]);
        out
    }
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            template: DEFAULT_MONEY_FORMAT.to_string(),
            style: AmountStyle::Amount,
            placeholder: 1..DEFAULT_MONEY_FORMAT.len(),
        }
    }
}

impl FromStr for MoneyFormat {
    type Err = MoneyFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MoneyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// One-shot helper: validate `template` and format `amount` with it
pub fn format_money(amount: &MinorAmount, template: &str) -> Result<String, MoneyFormatError> {
    Ok(MoneyFormat::parse(template)?.format(amount))
}

/// Render minor units as major units with `precision` decimals (0 or 2),
/// rounding half away from zero and grouping integer digits by three.
fn format_with_delimiters(cents: i64, precision: u32, thousands: char, decimal: char) -> String {
    let magnitude = cents.unsigned_abs();
    let (units, fraction) = if precision == 0 {
        ((magnitude + 50) / 100, None)
    } else {
        (magnitude / 100, Some(magnitude % 100))
    };

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if cents < 0 && (units > 0 || fraction.unwrap_or(0) > 0) {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(ch);
    }

    if let Some(fraction) = fraction {
        grouped.push(decimal);
        grouped.push_str(&format!("{:02}", fraction));
    }
    grouped
}
