use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Storefront variant identifier.
///
/// Hosts emit these either as JSON numbers (server-rendered ids) or as strings
/// (URL parameters, object keys). Both forms normalise to the same string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VariantId(String);

impl VariantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VariantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for VariantId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for VariantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => VariantId(s),
            Raw::Unsigned(n) => VariantId(n.to_string()),
            Raw::Signed(n) => VariantId(n.to_string()),
        })
    }
}

/// An amount in minor currency units (cents).
///
/// Integer is the normal form. Legacy themes pass pre-formatted strings such
/// as `"123.45"`, which are read with the first `.` removed. `null` (or a
/// missing key) is kept as `Null` and formats as `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinorAmount {
    Cents(i64),
    Fractional(f64),
    Text(String),
    #[default]
    Null,
}

impl MinorAmount {
    /// Numeric value in minor units, `None` when the input is not a number.
    ///
    /// Fractional values are rounded half away from zero.
    pub fn to_minor_units(&self) -> Option<i64> {
        match self {
            MinorAmount::Cents(cents) => Some(*cents),
            MinorAmount::Fractional(value) => round_minor(*value),
            MinorAmount::Null => None,
            MinorAmount::Text(raw) => {
                let stripped = raw.replacen('.', "", 1);
                let trimmed = stripped.trim();
                if trimmed.is_empty() {
                    // Number("") is 0 in the storefront's scripting runtime
                    return Some(0);
                }
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(round_minor))
            }
        }
    }
}

impl From<i64> for MinorAmount {
    fn from(cents: i64) -> Self {
        MinorAmount::Cents(cents)
    }
}

fn round_minor(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    Some(value.round() as i64)
}

/// Price data for one variant, keyed by `VariantId` in `BlockConfig::variants_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantPriceRecord {
    #[serde(default)]
    pub price: MinorAmount,

    #[serde(default, alias = "compareAtPrice")]
    pub compare_at_price: Option<MinorAmount>,

    #[serde(default, alias = "b2bPrice")]
    pub b2b_price: Option<MinorAmount>,
}

impl VariantPriceRecord {
    pub fn new(price: i64) -> Self {
        Self {
            price: MinorAmount::Cents(price),
            compare_at_price: None,
            b2b_price: None,
        }
    }

    pub fn with_compare_at(mut self, compare_at_price: i64) -> Self {
        self.compare_at_price = Some(MinorAmount::Cents(compare_at_price));
        self
    }

    pub fn with_b2b(mut self, b2b_price: i64) -> Self {
        self.b2b_price = Some(MinorAmount::Cents(b2b_price));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_id_accepts_numbers_and_strings() {
        let from_number: VariantId = serde_json::from_str("44012345678").unwrap();
        let from_string: VariantId = serde_json::from_str("\"44012345678\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number.as_str(), "44012345678");
    }

    #[test]
    fn test_minor_amount_text_strips_first_dot() {
        assert_eq!(MinorAmount::Text("123.45".into()).to_minor_units(), Some(12345));
        assert_eq!(MinorAmount::Text("1500".into()).to_minor_units(), Some(1500));
        assert_eq!(MinorAmount::Text("12.345.67".into()).to_minor_units(), Some(12346));
        assert_eq!(MinorAmount::Text("abc".into()).to_minor_units(), None);
        assert_eq!(MinorAmount::Fractional(12345.5).to_minor_units(), Some(12346));
    }

    #[test]
    fn test_record_reads_both_key_styles() {
        let snake: VariantPriceRecord =
            serde_json::from_str(r#"{"price": 1000, "compare_at_price": 1200, "b2b_price": null}"#).unwrap();
        let camel: VariantPriceRecord =
            serde_json::from_str(r#"{"price": 1000, "compareAtPrice": 1200}"#).unwrap();
        assert_eq!(snake, camel);
        assert_eq!(snake.b2b_price, None);
    }

    #[test]
    fn test_null_or_missing_price_is_kept() {
        let null: VariantPriceRecord =
            serde_json::from_str(r#"{"price": null, "compare_at_price": 1200}"#).unwrap();
        let missing: VariantPriceRecord = serde_json::from_str(r#"{"b2b_price": 900}"#).unwrap();
        assert_eq!(null.price, MinorAmount::Null);
        assert_eq!(missing.price, MinorAmount::Null);
        assert_eq!(null.price.to_minor_units(), None);
    }
}
