//! Request and response shapes exchanged with a text structurer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shopintel_core::PolicyKind;

/// Which field of the insights record a text item came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FieldKey {
    ProductDescription { product_id: String },
    ProductTitle { product_id: String },
    PolicyBody { kind: PolicyKind },
    BrandContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    pub key: FieldKey,
    pub text: String,
    /// Read-only hints that help classify `text`, e.g. a product's type and
    /// tags. Never written back.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureRequest {
    pub items: Vec<TextItem>,
    /// Output fields the collaborator is expected to fill per item.
    pub schema_hint: Vec<String>,
}

impl StructureRequest {
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.items.iter().map(|i| i.text.chars().count()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One structured result. Every field besides `key` may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredItem {
    pub key: FieldKey,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureResponse {
    #[serde(default)]
    pub items: Vec<StructuredItem>,
}

impl StructureResponse {
    /// Decodes a collaborator payload, dropping items that do not decode.
    ///
    /// Returns `None` only if the payload has no `items` array at all.
    #[must_use]
    pub fn from_value_lenient(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };
        let Some(Value::Array(raw_items)) = map.remove("items") else {
            return None;
        };
        let items = raw_items
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<StructuredItem>(raw) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::debug!(error = %e, "dropping undecodable structured item");
                    None
                }
            })
            .collect();
        Some(Self { items })
    }
}
