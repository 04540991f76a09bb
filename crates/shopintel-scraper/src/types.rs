//! Wire shapes for the public `products.json` endpoint.
//!
//! ## Observed variation across storefronts
//!
//! ### `id`
//! Usually a JSON number (`6789012345678`), but some themes and proxies emit
//! it as a string (`"6789012345678"`). [`RawScalar`] accepts both and both
//! normalize to the same key.
//!
//! ### `tags`
//! Current Shopify returns a JSON array of strings. Older stores and some
//! apps return a single comma-separated string (`"red, summer"`). Modeled as
//! [`TagField`] so the shape is decided once, at decode time.
//!
//! ### `price`
//! A decimal string (`"30.00"`) on most stores; occasionally a bare number.
//!
//! ### Missing fields
//! Only `id` is required. Everything else defaults so one odd product does
//! not sink a whole page.

use serde::Deserialize;

/// A JSON scalar that may arrive as a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Number(serde_json::Number),
    Text(String),
}

impl RawScalar {
    /// Trimmed string form; `None` when blank.
    #[must_use]
    pub fn normalized(&self) -> Option<String> {
        let s = match self {
            RawScalar::Number(n) => n.to_string(),
            RawScalar::Text(s) => s.trim().to_owned(),
        };
        (!s.is_empty()).then_some(s)
    }
}

/// Product tags in either shape storefronts emit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagField {
    /// `"red, summer"`
    Delimited(String),
    /// `["red", "summer"]`
    List(Vec<String>),
}

impl Default for TagField {
    fn default() -> Self {
        TagField::List(Vec::new())
    }
}

/// A single catalog entry as decoded from `products.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub id: RawScalar,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub handle: Option<String>,

    /// Raw HTML description.
    #[serde(default)]
    pub body_html: Option<String>,

    #[serde(default)]
    pub vendor: Option<String>,

    /// May be an empty string; treated as absent.
    #[serde(default)]
    pub product_type: Option<String>,

    /// `null` is treated the same as missing.
    #[serde(default)]
    pub tags: Option<TagField>,

    #[serde(default)]
    pub variants: Vec<RawVariant>,

    #[serde(default)]
    pub images: Vec<RawImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawVariant {
    #[serde(default)]
    pub id: Option<RawScalar>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default)]
    pub price: Option<RawScalar>,

    /// `null` when the variant is not on sale.
    #[serde(default)]
    pub compare_at_price: Option<RawScalar>,

    /// Defaults to `true` when absent.
    #[serde(default = "default_available")]
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawImage {
    pub src: String,
}

fn default_available() -> bool {
    true
}
