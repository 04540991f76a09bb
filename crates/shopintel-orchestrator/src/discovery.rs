//! Finding competitor storefronts for a primary brand.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shopintel_core::{BrandInsights, Product, Target};
use shopintel_normalizer::categorize;

use crate::error::DiscoveryError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Competitor {
    pub name: String,
    pub target: Target,
    pub category: String,
    /// Share of the primary's products that fall in this competitor's
    /// category, in `[0.0, 1.0]`.
    pub score: f64,
}

#[async_trait]
pub trait CompetitorDiscovery: Send + Sync {
    /// Returns at most `limit` competitors for the brand behind `primary`,
    /// best match first. The primary's own target is never returned.
    async fn discover(
        &self,
        primary: &BrandInsights,
        limit: usize,
    ) -> Result<Vec<Competitor>, DiscoveryError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorEntry {
    pub name: String,
    pub url: String,
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct CompetitorsFile {
    competitors: Vec<CompetitorEntry>,
}

/// Discovery over a fixed, curated catalog of storefronts.
#[derive(Debug, Clone, Default)]
pub struct CatalogDiscovery {
    entries: Vec<(CompetitorEntry, Target)>,
}

impl CatalogDiscovery {
    /// Load and validate a competitor catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError` if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self, DiscoveryError> {
        let content = std::fs::read_to_string(path).map_err(|e| DiscoveryError::CatalogIo {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: CompetitorsFile = serde_yaml::from_str(&content)?;
        Self::from_entries(file.competitors)
    }

    /// # Errors
    ///
    /// Returns [`DiscoveryError::Validation`] for blank names, unparseable
    /// URLs, or two entries for the same storefront.
    pub fn from_entries(entries: Vec<CompetitorEntry>) -> Result<Self, DiscoveryError> {
        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(entries.len());

        for mut entry in entries {
            if entry.name.trim().is_empty() {
                return Err(DiscoveryError::Validation(
                    "competitor name must be non-empty".to_string(),
                ));
            }
            let target = Target::parse(&entry.url).map_err(|e| {
                DiscoveryError::Validation(format!("competitor '{}': {e}", entry.name))
            })?;
            if !seen.insert(target.clone()) {
                return Err(DiscoveryError::Validation(format!(
                    "duplicate competitor storefront: '{target}'"
                )));
            }
            entry.category = entry.category.trim().to_lowercase();
            validated.push((entry, target));
        }

        Ok(Self { entries: validated })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scores every catalog entry against `primary`, excluding the primary
    /// itself. Ties keep catalog order.
    #[must_use]
    pub fn rank(&self, primary: &BrandInsights) -> Vec<Competitor> {
        let profiles: Vec<ProductProfile> = primary.products.iter().map(profile).collect();

        let mut ranked: Vec<Competitor> = self
            .entries
            .iter()
            .filter(|(_, target)| *target != primary.target)
            .map(|(entry, target)| Competitor {
                name: entry.name.clone(),
                target: target.clone(),
                category: entry.category.clone(),
                score: overlap(&profiles, &entry.category),
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }
}

#[async_trait]
impl CompetitorDiscovery for CatalogDiscovery {
    async fn discover(
        &self,
        primary: &BrandInsights,
        limit: usize,
    ) -> Result<Vec<Competitor>, DiscoveryError> {
        let mut ranked = self.rank(primary);
        ranked.truncate(limit);
        tracing::debug!(
            store = %primary.target,
            found = ranked.len(),
            "discovered competitors from catalog"
        );
        Ok(ranked)
    }
}

/// Lower-cased category words describing one product.
struct ProductProfile {
    category: String,
    words: Vec<String>,
}

fn profile(product: &Product) -> ProductProfile {
    let category = product.category.clone().unwrap_or_else(|| {
        let fragments = std::iter::once(product.title.as_str())
            .chain(product.product_type.as_deref())
            .chain(product.tags.iter().map(String::as_str));
        categorize(fragments).to_owned()
    });
    let words = product
        .product_type
        .iter()
        .map(|t| t.to_lowercase())
        .chain(product.tags.iter().cloned())
        .collect();
    ProductProfile { category, words }
}

#[allow(clippy::cast_precision_loss)]
fn overlap(profiles: &[ProductProfile], category: &str) -> f64 {
    if profiles.is_empty() {
        return 0.0;
    }
    let hits = profiles
        .iter()
        .filter(|p| p.category == category || p.words.iter().any(|w| w.contains(category)))
        .count();
    hits as f64 / profiles.len() as f64
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn entry(name: &str, url: &str, category: &str) -> CompetitorEntry {
        CompetitorEntry {
            name: name.to_owned(),
            url: url.to_owned(),
            category: category.to_owned(),
        }
    }

    fn catalog() -> CatalogDiscovery {
        CatalogDiscovery::from_entries(vec![
            entry("Gymshark", "https://row.gymshark.com", "fitness"),
            entry("Allbirds", "https://www.allbirds.com", "footwear"),
            entry("MVMT", "https://www.mvmt.com", "accessories"),
            entry("Pura Vida", "https://www.puravidabracelets.com", "jewelry"),
        ])
        .unwrap()
    }

    fn primary(url: &str, titles: &[&str]) -> BrandInsights {
        let mut insights = BrandInsights::new(Target::parse(url).unwrap());
        insights.products = titles
            .iter()
            .enumerate()
            .map(|(i, title)| Product {
                id: i.to_string(),
                title: (*title).to_owned(),
                handle: None,
                vendor: None,
                product_type: None,
                description: None,
                tags: BTreeSet::new(),
                variants: Vec::new(),
                images: Vec::new(),
                category: None,
            })
            .collect();
        insights
    }

    #[tokio::test]
    async fn best_category_overlap_ranks_first() {
        let insights = primary(
            "https://shoes.example.com",
            &["Trail Sneakers", "Wool Shoes", "Leather Watch"],
        );
        let found = catalog().discover(&insights, 2).await.unwrap();
        let names: Vec<_> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Allbirds", "MVMT"]);
        assert!(found[0].score > found[1].score);
    }

    #[tokio::test]
    async fn primary_is_never_its_own_competitor() {
        let insights = primary("https://WWW.ALLBIRDS.COM/collections", &["Runner Shoes"]);
        let found = catalog().discover(&insights, 10).await.unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|c| c.name != "Allbirds"));
    }

    #[tokio::test]
    async fn no_products_keeps_catalog_order() {
        let insights = primary("https://empty.example.com", &[]);
        let found = catalog().discover(&insights, 3).await.unwrap();
        let names: Vec<_> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Gymshark", "Allbirds", "MVMT"]);
    }

    #[test]
    fn duplicate_storefronts_are_rejected() {
        let err = CatalogDiscovery::from_entries(vec![
            entry("Bombas", "https://bombas.com", "apparel"),
            entry("Bombas Again", "bombas.com/", "apparel"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate competitor"));
    }

    #[test]
    fn blank_names_are_rejected() {
        let err = CatalogDiscovery::from_entries(vec![entry(" ", "https://x.com", "home")])
            .unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn load_competitors_from_real_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("competitors.yaml");
        let catalog = CatalogDiscovery::load(&path).expect("competitors.yaml loads");
        assert!(!catalog.is_empty());
    }
}
