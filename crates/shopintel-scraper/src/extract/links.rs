use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use shopintel_core::{LinkKind, Target};

use super::{homepage, ExtractorOutcome, Signal};
use crate::fetch::Fetcher;
use crate::html::anchors;

/// Matched against both the anchor text and its `href`.
static LINK_PATTERNS: LazyLock<Vec<(LinkKind, Regex)>> = LazyLock::new(|| {
    [
        (LinkKind::OrderTracking, r"track"),
        (LinkKind::ContactUs, r"contact"),
        (LinkKind::Blog, r"blog|news|articles"),
        (LinkKind::Support, r"support|help|customer.*service"),
        (
            LinkKind::StoreLocator,
            r"store.*locat|find.*store|locations",
        ),
        (LinkKind::SizeGuide, r"size.*(?:guide|chart)|sizing|fit.*guide"),
    ]
    .into_iter()
    .map(|(kind, pattern)| {
        let re = Regex::new(&format!("(?i){pattern}")).expect("valid regex");
        (kind, re)
    })
    .collect()
});

/// The first link per [`LinkKind`] on one page, as absolute URLs.
pub(super) fn links_from_page(target: &Target, html: &str) -> BTreeMap<LinkKind, String> {
    let page_anchors = anchors(html);
    LINK_PATTERNS
        .iter()
        .filter_map(|(kind, re)| {
            page_anchors
                .iter()
                .filter(|a| re.is_match(&a.text) || re.is_match(&a.href))
                .find_map(|a| target.resolve(&a.href))
                .map(|url| (*kind, url))
        })
        .collect()
}

pub(super) async fn extract(fetcher: &Fetcher) -> ExtractorOutcome {
    match homepage(fetcher).await {
        Ok(html) => ExtractorOutcome::Succeeded(Signal::ImportantLinks(links_from_page(
            fetcher.target(),
            &html,
        ))),
        Err(reason) => ExtractorOutcome::Failed(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::parse("https://shop.example.com").unwrap()
    }

    #[test]
    fn finds_each_kind_by_text_or_href() {
        let html = r#"<footer>
            <a href="/apps/parcel">Track your order</a>
            <a href="/pages/contact">Get in touch</a>
            <a href="/blogs/journal">Journal</a>
            <a href="https://help.example.com">FAQ &amp; Help</a>
            <a href="/pages/stores">Find a store</a>
            <a href="/pages/size-chart">Sizing</a>
        </footer>"#;
        let links = links_from_page(&target(), html);
        assert_eq!(links.len(), LinkKind::ALL.len());
        assert_eq!(
            links[&LinkKind::OrderTracking],
            "https://shop.example.com/apps/parcel"
        );
        assert_eq!(
            links[&LinkKind::ContactUs],
            "https://shop.example.com/pages/contact"
        );
        assert_eq!(
            links[&LinkKind::Blog],
            "https://shop.example.com/blogs/journal"
        );
        assert_eq!(links[&LinkKind::Support], "https://help.example.com/");
        assert_eq!(
            links[&LinkKind::StoreLocator],
            "https://shop.example.com/pages/stores"
        );
        assert_eq!(
            links[&LinkKind::SizeGuide],
            "https://shop.example.com/pages/size-chart"
        );
    }

    #[test]
    fn first_matching_link_wins_and_mailto_is_skipped() {
        let html = r#"<a href="mailto:help@shop.example.com">Contact</a>
            <a href="/pages/contact-us">Contact us</a>
            <a href="/contact">Contact</a>"#;
        let links = links_from_page(&target(), html);
        assert_eq!(
            links.get(&LinkKind::ContactUs).map(String::as_str),
            Some("https://shop.example.com/pages/contact-us")
        );
    }

    #[test]
    fn page_without_navigation_has_no_links() {
        assert!(links_from_page(&target(), "<main><p>Hello</p></main>").is_empty());
    }
}
