//! Competitive run results.

use std::collections::BTreeMap;

use serde::Serialize;
use shopintel_core::{BrandInsights, Platform, Target, TargetStatus};

/// Outcome for one storefront in a competitive run.
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub target: Target,
    pub status: TargetStatus,
    pub insights: Option<Box<BrandInsights>>,
    pub error: Option<String>,
}

impl TargetReport {
    #[must_use]
    pub fn succeeded(insights: BrandInsights) -> Self {
        Self {
            target: insights.target.clone(),
            status: TargetStatus::Succeeded,
            insights: Some(Box::new(insights)),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(target: Target, error: String) -> Self {
        Self {
            target,
            status: TargetStatus::Failed,
            insights: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompetitiveReport {
    pub primary: Box<BrandInsights>,
    pub competitors: Vec<TargetReport>,
    pub summary: CompetitiveSummary,
}

impl CompetitiveReport {
    #[must_use]
    pub fn new(primary: BrandInsights, competitors: Vec<TargetReport>) -> Self {
        let summary = CompetitiveSummary::build(&primary, &competitors);
        Self {
            primary: Box::new(primary),
            competitors,
            summary,
        }
    }

    /// Every report in the run keyed by target, primary included.
    #[must_use]
    pub fn by_target(&self) -> BTreeMap<&Target, Option<&BrandInsights>> {
        std::iter::once((&self.primary.target, Some(self.primary.as_ref())))
            .chain(
                self.competitors
                    .iter()
                    .map(|r| (&r.target, r.insights.as_deref())),
            )
            .collect()
    }
}

/// Side-by-side counts for one storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    pub target: Target,
    /// Brand name guessed from the storefront host.
    pub brand: String,
    pub products: usize,
    pub hero_products: usize,
    pub currency: Option<String>,
    pub policies: usize,
    pub social_platforms: Vec<Platform>,
    pub faqs: usize,
    pub has_contact: bool,
    pub unavailable_signals: usize,
}

impl TargetSummary {
    fn of(insights: &BrandInsights) -> Self {
        Self {
            target: insights.target.clone(),
            brand: insights.target.brand_hint().to_owned(),
            products: insights.products.len(),
            hero_products: insights.hero_products.len(),
            currency: insights.currency.clone(),
            policies: insights.policies.len(),
            social_platforms: insights.social_handles.iter().map(|h| h.platform).collect(),
            faqs: insights.faqs.len(),
            has_contact: !insights.contact.is_empty(),
            unavailable_signals: insights.unavailable_signals().len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitiveSummary {
    pub competitors_analyzed: usize,
    pub competitors_failed: usize,
    pub primary: TargetSummary,
    /// Competitors that produced insights, in report order.
    pub competitors: Vec<TargetSummary>,
    /// Platforms where at least one competitor is present but the primary is not.
    pub social_gaps: Vec<Platform>,
    /// Mean product count over successful competitors.
    pub average_competitor_products: Option<f64>,
}

impl CompetitiveSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build(primary: &BrandInsights, reports: &[TargetReport]) -> Self {
        let primary = TargetSummary::of(primary);
        let competitors: Vec<TargetSummary> = reports
            .iter()
            .filter_map(|r| r.insights.as_deref())
            .map(TargetSummary::of)
            .collect();

        let social_gaps = Platform::ALL
            .into_iter()
            .filter(|p| !primary.social_platforms.contains(p))
            .filter(|p| competitors.iter().any(|c| c.social_platforms.contains(p)))
            .collect();

        let average_competitor_products = if competitors.is_empty() {
            None
        } else {
            let total: usize = competitors.iter().map(|c| c.products).sum();
            Some(total as f64 / competitors.len() as f64)
        };

        Self {
            competitors_analyzed: reports.len(),
            competitors_failed: reports.len() - competitors.len(),
            primary,
            competitors,
            social_gaps,
            average_competitor_products,
        }
    }
}

#[cfg(test)]
mod tests {
    use shopintel_core::SocialHandle;

    use super::*;

    fn insights(url: &str, products: usize, platforms: &[Platform]) -> BrandInsights {
        let mut insights = BrandInsights::new(Target::parse(url).unwrap());
        insights.products = (0..products)
            .map(|i| shopintel_core::Product {
                id: i.to_string(),
                title: format!("Item {i}"),
                handle: None,
                vendor: None,
                product_type: None,
                description: None,
                tags: Default::default(),
                variants: Vec::new(),
                images: Vec::new(),
                category: None,
            })
            .collect();
        insights.social_handles = platforms
            .iter()
            .map(|&platform| SocialHandle {
                platform,
                handle: "brand".to_owned(),
                url: format!("https://{platform}.com/brand"),
            })
            .collect();
        insights
    }

    #[test]
    fn summary_counts_and_gaps() {
        let primary = insights("https://a.example.com", 4, &[Platform::Instagram]);
        let reports = vec![
            TargetReport::succeeded(insights(
                "https://b.example.com",
                2,
                &[Platform::Instagram, Platform::TikTok],
            )),
            TargetReport::succeeded(insights("https://c.example.com", 6, &[Platform::YouTube])),
            TargetReport::failed(
                Target::parse("https://d.example.com").unwrap(),
                "unreachable".to_owned(),
            ),
        ];

        let summary = CompetitiveSummary::build(&primary, &reports);
        assert_eq!(summary.competitors_analyzed, 3);
        assert_eq!(summary.competitors_failed, 1);
        assert_eq!(summary.primary.products, 4);
        assert_eq!(summary.primary.brand, "a");
        assert_eq!(summary.competitors[1].target.as_str(), "https://c.example.com");
        assert_eq!(summary.social_gaps, vec![Platform::TikTok, Platform::YouTube]);
        assert_eq!(summary.average_competitor_products, Some(4.0));
    }

    #[test]
    fn target_summary_names_brand_and_counts_empty_signals() {
        let mut shop = insights("https://www.allbirds.com", 1, &[]);
        shop.currency = Some("USD".to_owned());
        shop.empty_signals.insert(shopintel_core::ExtractorName::Faq);
        shop.failures.insert(
            shopintel_core::ExtractorName::Policy,
            shopintel_core::FailureReason::Timeout,
        );

        let summary = TargetSummary::of(&shop);
        assert_eq!(summary.brand, "allbirds");
        assert_eq!(summary.currency.as_deref(), Some("USD"));
        assert_eq!(summary.unavailable_signals, 2);
    }

    #[test]
    fn report_is_keyed_by_target() {
        let primary = insights("https://a.example.com", 1, &[]);
        let failed = Target::parse("https://z.example.com").unwrap();
        let report = CompetitiveReport::new(
            primary,
            vec![TargetReport::failed(failed.clone(), "boom".to_owned())],
        );
        let keyed = report.by_target();
        assert_eq!(keyed.len(), 2);
        assert!(keyed[&failed].is_none());
    }
}
