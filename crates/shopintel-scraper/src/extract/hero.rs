use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use shopintel_core::{HeroProduct, Target};

use super::{homepage, ExtractorOutcome, Signal};
use crate::fetch::Fetcher;
use crate::html::{anchors, clean_text, strip_noise};

const MAX_HEROES: usize = 12;

/// Longest stretch of markup read after a block's opening tag.
const MAX_BLOCK_BYTES: usize = 4_000;

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<(?:div|li|article|section)\b[^>]*\bclass\s*=\s*["'][^"']*(?:hero-product|featured-product|product-card|card--product|product-item|grid-product)[^"']*["'][^>]*>"#,
    )
    .expect("valid regex")
});
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h[1-6]\b[^>]*>(.*?)</h[1-6]\s*>").expect("valid regex"));
static TITLE_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bclass\s*=\s*["'][^"']*(?:title|name)[^"']*["'][^>]*>(.*?)</"#)
        .expect("valid regex")
});
static PRICE_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bclass\s*=\s*["'][^"']*(?:price|cost|amount)[^"']*["'][^>]*>(.*?)</"#)
        .expect("valid regex")
});
static IMG_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img\b[^>]*?\b(?:data-)?src\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

fn first_text(re: &Regex, markup: &str) -> Option<String> {
    re.captures_iter(markup)
        .filter_map(|cap| cap.get(1))
        .map(|m| clean_text(m.as_str()))
        .find(|text| !text.is_empty())
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn hero_from_block(target: &Target, block: &str) -> Option<HeroProduct> {
    let links = anchors(block);
    let title = first_text(&HEADING_RE, block)
        .or_else(|| first_text(&TITLE_CLASS_RE, block))
        .or_else(|| {
            links
                .iter()
                .map(|a| a.text.clone())
                .find(|t| !t.is_empty())
        });
    let url = links
        .iter()
        .find(|a| a.href.contains("/products/"))
        .or_else(|| links.first())
        .and_then(|a| target.resolve(&a.href));
    let image = IMG_SRC_RE
        .captures(block)
        .and_then(|cap| target.resolve(cap.get(1)?.as_str()));
    let price =
        first_text(&PRICE_CLASS_RE, block).filter(|p| p.chars().any(|c| c.is_ascii_digit()));

    (title.is_some() || url.is_some()).then_some(HeroProduct {
        title,
        url,
        image,
        price,
    })
}

/// Featured products on one page.
///
/// Reads product-card style blocks first; when the theme has none, falls back
/// to links into `/products/`.
pub(super) fn heroes_from_page(target: &Target, html: &str) -> Vec<HeroProduct> {
    let content = strip_noise(html);
    let blocks: Vec<(usize, usize)> = BLOCK_RE
        .find_iter(&content)
        .map(|m| (m.start(), m.end()))
        .collect();

    let mut candidates = Vec::new();
    for (i, &(_, start)) in blocks.iter().enumerate() {
        let next = blocks.get(i + 1).map_or(content.len(), |&(open, _)| open);
        let end = floor_char_boundary(&content, next.min(start + MAX_BLOCK_BYTES));
        if let Some(hero) = hero_from_block(target, &content[start..end]) {
            candidates.push(hero);
        }
    }

    if candidates.is_empty() {
        candidates = anchors(&content)
            .into_iter()
            .filter(|a| a.href.contains("/products/") && !a.text.is_empty())
            .filter_map(|a| {
                Some(HeroProduct {
                    url: Some(target.resolve(&a.href)?),
                    title: Some(a.text),
                    image: None,
                    price: None,
                })
            })
            .collect();
    }

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|hero| seen.insert(hero.key()))
        .take(MAX_HEROES)
        .collect()
}

pub(super) async fn extract(fetcher: &Fetcher) -> ExtractorOutcome {
    match homepage(fetcher).await {
        Ok(html) => ExtractorOutcome::Succeeded(Signal::HeroProducts(heroes_from_page(
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
    fn reads_product_cards() {
        let html = r#"<main>
            <div class="product-card featured">
              <a href="/products/wool-runner"><img src="//cdn.example.com/runner.jpg"></a>
              <h3>Wool Runner</h3>
              <span class="price">$98.00</span>
            </div>
            <div class="product-card">
              <a href="/products/tree-dasher">Tree Dasher</a>
              <span class="price price--sale">$125</span>
            </div>
        </main>"#;
        let heroes = heroes_from_page(&target(), html);
        assert_eq!(heroes.len(), 2);
        assert_eq!(heroes[0].title.as_deref(), Some("Wool Runner"));
        assert_eq!(
            heroes[0].url.as_deref(),
            Some("https://shop.example.com/products/wool-runner")
        );
        assert_eq!(
            heroes[0].image.as_deref(),
            Some("https://cdn.example.com/runner.jpg")
        );
        assert_eq!(heroes[0].price.as_deref(), Some("$98.00"));
        assert_eq!(heroes[1].title.as_deref(), Some("Tree Dasher"));
    }

    #[test]
    fn falls_back_to_product_links() {
        let html = r#"<a href="/collections/all">Shop all</a>
            <a href="/products/classic-tee">Classic Tee</a>
            <a href="/products/classic-tee">Classic Tee</a>"#;
        let heroes = heroes_from_page(&target(), html);
        assert_eq!(heroes.len(), 1);
        assert_eq!(heroes[0].title.as_deref(), Some("Classic Tee"));
    }

    #[test]
    fn page_without_products_yields_nothing() {
        assert!(heroes_from_page(&target(), "<main><p>Welcome</p></main>").is_empty());
    }
}
