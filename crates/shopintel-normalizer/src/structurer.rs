//! `TextStructurer` implementations.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shopintel_core::AppConfig;

use crate::category::categorize;
use crate::error::NormalizerError;
use crate::types::{FieldKey, StructureRequest, StructureResponse, StructuredItem};

/// Turns free text from a storefront into structured fields.
///
/// Responses are untrusted: items may be missing, partial, or keyed to
/// fields that were never requested. Callers validate before merging.
#[async_trait]
pub trait TextStructurer: Send + Sync {
    async fn structure(
        &self,
        request: StructureRequest,
    ) -> Result<StructureResponse, NormalizerError>;
}

/// Picks the collaborator for this configuration: the HTTP service when an
/// endpoint is set, otherwise the local keyword fallback.
///
/// # Errors
///
/// Returns [`NormalizerError::ClientBuild`] if the HTTP client cannot be built.
pub fn structurer_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn TextStructurer>, NormalizerError> {
    match config.normalizer_url.as_deref() {
        Some(url) => Ok(Arc::new(HttpStructurer::new(
            url,
            config.normalizer_api_key.clone(),
            Duration::from_secs(config.normalizer_timeout_secs),
        )?)),
        None => Ok(Arc::new(KeywordStructurer)),
    }
}

/// Client for an external text-structuring service.
///
/// Sends the request as JSON to a single endpoint and expects
/// `{"items": [...]}` back.
pub struct HttpStructurer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpStructurer {
    /// # Errors
    ///
    /// Returns [`NormalizerError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(
        url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NormalizerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(NormalizerError::ClientBuild)?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_owned(),
            api_key,
        })
    }
}

#[async_trait]
impl TextStructurer for HttpStructurer {
    async fn structure(
        &self,
        request: StructureRequest,
    ) -> Result<StructureResponse, NormalizerError> {
        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                NormalizerError::Timeout
            } else {
                NormalizerError::Unavailable(format!("request failed: {e}"))
            }
        })?;

        if !response.status().is_success() {
            return Err(NormalizerError::Unavailable(format!(
                "service returned status {}",
                response.status()
            )));
        }

        let value: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                NormalizerError::Timeout
            } else {
                NormalizerError::BadResponse(format!("response parse error: {e}"))
            }
        })?;

        StructureResponse::from_value_lenient(value)
            .ok_or_else(|| NormalizerError::BadResponse("response has no items array".to_owned()))
    }
}

/// Local fallback that needs no network.
///
/// Collapses whitespace in every item and categorizes each product by keyword
/// from its title, description, type and tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordStructurer;

#[async_trait]
impl TextStructurer for KeywordStructurer {
    async fn structure(
        &self,
        request: StructureRequest,
    ) -> Result<StructureResponse, NormalizerError> {
        let mut product_text: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for item in &request.items {
            if let FieldKey::ProductTitle { product_id }
            | FieldKey::ProductDescription { product_id } = &item.key
            {
                product_text
                    .entry(product_id.as_str())
                    .or_default()
                    .extend(
                        std::iter::once(item.text.as_str())
                            .chain(item.context.iter().map(String::as_str)),
                    );
            }
        }

        let items = request
            .items
            .iter()
            .map(|item| {
                let category = match &item.key {
                    FieldKey::ProductTitle { product_id } => product_text
                        .get(product_id.as_str())
                        .map(|texts| categorize(texts.iter().copied()).to_owned()),
                    _ => None,
                };
                StructuredItem {
                    key: item.key.clone(),
                    text: Some(collapse_whitespace(&item.text)),
                    category,
                }
            })
            .collect();

        Ok(StructureResponse { items })
    }
}

/// Stand-in for a collaborator that is switched off or unreachable.
#[derive(Debug, Clone, Default)]
pub struct UnavailableStructurer {
    pub reason: String,
}

#[async_trait]
impl TextStructurer for UnavailableStructurer {
    async fn structure(
        &self,
        _request: StructureRequest,
    ) -> Result<StructureResponse, NormalizerError> {
        let reason = if self.reason.is_empty() {
            "text structurer disabled"
        } else {
            self.reason.as_str()
        };
        Err(NormalizerError::Unavailable(reason.to_owned()))
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextItem;

    fn item(key: FieldKey, text: &str) -> TextItem {
        TextItem {
            key,
            text: text.to_owned(),
            context: Vec::new(),
        }
    }

    #[tokio::test]
    async fn keyword_structurer_categorizes_from_title_and_description() {
        let request = StructureRequest {
            items: vec![
                item(
                    FieldKey::ProductTitle {
                        product_id: "7".to_owned(),
                    },
                    "The  Runner",
                ),
                item(
                    FieldKey::ProductDescription {
                        product_id: "7".to_owned(),
                    },
                    "Lightweight sneakers\nfor every day.",
                ),
                item(FieldKey::BrandContext, "  We make   shoes. "),
            ],
            schema_hint: Vec::new(),
        };

        let response = KeywordStructurer.structure(request).await.unwrap();
        assert_eq!(response.items.len(), 3);
        assert_eq!(response.items[0].category.as_deref(), Some("footwear"));
        assert_eq!(response.items[0].text.as_deref(), Some("The Runner"));
        assert!(response.items[1].category.is_none());
        assert_eq!(
            response.items[1].text.as_deref(),
            Some("Lightweight sneakers for every day.")
        );
        assert_eq!(response.items[2].text.as_deref(), Some("We make shoes."));
    }

    #[tokio::test]
    async fn keyword_structurer_reads_type_and_tags() {
        let mut title = item(
            FieldKey::ProductTitle {
                product_id: "9".to_owned(),
            },
            "Tree Runner",
        );
        title.context = vec!["Shoes".to_owned()];
        let mut tagged = item(
            FieldKey::ProductTitle {
                product_id: "10".to_owned(),
            },
            "The Everyday",
        );
        tagged.context = vec!["new-arrivals".to_owned(), "tote bag".to_owned()];

        let response = KeywordStructurer
            .structure(StructureRequest {
                items: vec![title, tagged],
                schema_hint: Vec::new(),
            })
            .await
            .unwrap();
        assert_eq!(response.items[0].category.as_deref(), Some("footwear"));
        assert_eq!(response.items[0].text.as_deref(), Some("Tree Runner"));
        assert_eq!(response.items[1].category.as_deref(), Some("accessories"));
    }

    #[tokio::test]
    async fn unavailable_structurer_always_errors() {
        let err = UnavailableStructurer::default()
            .structure(StructureRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, NormalizerError::Unavailable(_)));
    }
}
