use pricesync_core::NodeSpec;
use pricesync_shared::BlockConfig;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum PageSourceError {
    #[error("Failed to read page source: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed page source: {0}")]
    Json(#[from] serde_json::Error),
}

/// A host page described as data: its address, server-rendered markup, the
/// block configs inlined into it, and a script of later visitor actions.
#[derive(Debug, Clone, Deserialize)]
pub struct PageFixture {
    pub url: String,
    #[serde(default)]
    pub document: Vec<NodeSpec>,
    /// Either a bare array or the `{"b2bPriceConfigs": [...]}` object
    /// themes render inline.
    #[serde(default, deserialize_with = "config_list")]
    pub configs: Vec<BlockConfig>,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    /// Delay before the action, relative to the previous step
    #[serde(default)]
    pub after_ms: u64,
    #[serde(flatten)]
    pub action: PageAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PageAction {
    Navigate {
        url: String,
    },
    Insert {
        /// Element id to insert under, `None` for the body
        #[serde(default)]
        parent: Option<String>,
        node: NodeSpec,
    },
    Remove {
        id: String,
    },
    Register {
        config: BlockConfig,
    },
}

impl PageFixture {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PageSourceError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let fixture: PageFixture = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            configs = fixture.configs.len(),
            steps = fixture.script.len(),
            "Loaded page fixture"
        );
        Ok(fixture)
    }
}

fn config_list<'de, D>(deserializer: D) -> Result<Vec<BlockConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Payload {
        List(Vec<BlockConfig>),
        Wrapped {
            #[serde(rename = "b2bPriceConfigs")]
            configs: Vec<BlockConfig>,
        },
    }

    Ok(match Payload::deserialize(deserializer)? {
        Payload::List(configs) | Payload::Wrapped { configs } => configs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricesync_shared::{MinorAmount, VariantId};

    #[test]
    fn test_fixture_with_script() {
        let raw = r#"{
            "url": "https://shop.example/products/tee?variant=1",
            "document": [{"tag": "div", "id": "b2b-price-container-main"}],
            "configs": [{"blockId": "main", "isB2B": false, "variantsData": {"1": {"price": 100}}, "selectedVariantId": 1}],
            "script": [
                {"after_ms": 600, "action": "navigate", "url": "?variant=2"},
                {"action": "insert", "node": {"tag": "span", "classes": ["gd-b2b-price-update"]}},
                {"action": "remove", "id": "b2b-price-container-main"}
            ]
        }"#;
        let fixture: PageFixture = serde_json::from_str(raw).unwrap();
        assert_eq!(fixture.configs.len(), 1);
        assert_eq!(fixture.script.len(), 3);
        assert_eq!(fixture.script[0].after_ms, 600);
        assert!(matches!(&fixture.script[0].action, PageAction::Navigate { url } if url == "?variant=2"));
        assert!(matches!(&fixture.script[1].action, PageAction::Insert { parent: None, .. }));
        assert_eq!(fixture.script[1].after_ms, 0);
    }

    #[test]
    fn test_fixture_accepts_both_config_shapes() {
        let bare: PageFixture = serde_json::from_str(
            r#"{"url": "https://shop.example/", "configs": [{"blockId": "a"}, {"blockId": "b"}]}"#,
        )
        .unwrap();
        let wrapped: PageFixture = serde_json::from_str(
            r#"{"url": "https://shop.example/", "configs": {"b2bPriceConfigs": [{"blockId": "a"}]}}"#,
        )
        .unwrap();
        assert_eq!(bare.configs.len(), 2);
        assert_eq!(wrapped.configs.len(), 1);
        assert_eq!(wrapped.configs[0].block_id, "a");
        assert!(serde_json::from_str::<PageFixture>(r#"{"url": "x", "configs": {"other": []}}"#).is_err());
    }

    #[test]
    fn test_null_price_does_not_reject_config_list() {
        let raw = r#"{
            "url": "https://shop.example/products/tee?variant=1",
            "configs": {"b2bPriceConfigs": [{
                "blockId": "main",
                "variantsData": {"1": {"price": null}, "2": {"price": 1000}, "3": {"compare_at_price": 500}}
            }]}
        }"#;
        let fixture: PageFixture = serde_json::from_str(raw).unwrap();
        let config = &fixture.configs[0];
        assert_eq!(config.variants_data.len(), 3);
        assert_eq!(config.variant(&VariantId::from("1")).unwrap().price, MinorAmount::Null);
        assert_eq!(config.variant(&VariantId::from("2")).unwrap().price, MinorAmount::Cents(1000));
    }
}
