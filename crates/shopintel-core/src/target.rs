//! Validated storefront origins.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::CoreError;

/// A storefront origin: scheme + lower-cased host (+ non-default port).
///
/// The canonical string (`https://shop.example.com`, no trailing slash, no
/// path) is what equality, ordering, and hashing use, so two inputs that
/// differ only in case, path, or trailing slash collapse to one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Target {
    origin: String,
    host: String,
}

impl Target {
    /// Parses and canonicalizes a storefront URL.
    ///
    /// Inputs without a scheme are treated as `https://`. Any path, query, or
    /// fragment is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTarget`] for empty input, unparseable URLs,
    /// non-HTTP(S) schemes, or URLs without a host.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidTarget {
            input: input.to_owned(),
            reason: reason.to_owned(),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty URL"));
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_owned()
        } else {
            format!("https://{trimmed}")
        };

        let url = Url::parse(&with_scheme).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host"))?
            .to_ascii_lowercase();

        Ok(Self {
            origin: url.origin().ascii_serialization(),
            host,
        })
    }

    /// Canonical origin string, e.g. `https://shop.example.com`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.origin
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Absolute URL for a root-relative `path` on this origin.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.origin)
        } else {
            format!("{}/{path}", self.origin)
        }
    }

    /// Resolves an `href` found on one of this origin's pages to an absolute
    /// HTTP(S) URL. Returns `None` for `mailto:`, `javascript:` and the like.
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<String> {
        let base = Url::parse(&self.origin).ok()?;
        let url = base.join(href.trim()).ok()?;
        matches!(url.scheme(), "http" | "https").then(|| url.to_string())
    }

    /// Best-guess brand name from the host: the first label that is not `www`.
    ///
    /// `https://www.allbirds.com` → `allbirds`.
    #[must_use]
    pub fn brand_hint(&self) -> &str {
        self.host
            .split('.')
            .find(|label| *label != "www" && !label.is_empty())
            .unwrap_or(&self.host)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.origin)
    }
}

impl std::str::FromStr for Target {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Target {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Target> for String {
    fn from(target: Target) -> Self {
        target.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_path_and_trailing_slash() {
        let target = Target::parse("https://Shop.Example.com/collections/all/").unwrap();
        assert_eq!(target.as_str(), "https://shop.example.com");
        assert_eq!(target.host(), "shop.example.com");
    }

    #[test]
    fn parse_adds_https_when_scheme_missing() {
        let target = Target::parse("allbirds.com").unwrap();
        assert_eq!(target.as_str(), "https://allbirds.com");
    }

    #[test]
    fn parse_keeps_non_default_port() {
        let target = Target::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(target.as_str(), "http://127.0.0.1:8080");
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert!(matches!(
            Target::parse("   "),
            Err(CoreError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn parse_rejects_non_http_scheme() {
        assert!(matches!(
            Target::parse("ftp://files.example.com"),
            Err(CoreError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn equivalent_inputs_share_a_key() {
        let a = Target::parse("https://SHOP.example.com").unwrap();
        let b = Target::parse("shop.example.com/pages/about").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn url_for_joins_paths() {
        let target = Target::parse("https://shop.example.com").unwrap();
        assert_eq!(
            target.url_for("/products.json?page=1"),
            "https://shop.example.com/products.json?page=1"
        );
        assert_eq!(
            target.url_for("pages/faq"),
            "https://shop.example.com/pages/faq"
        );
    }

    #[test]
    fn resolve_joins_relative_and_keeps_absolute_links() {
        let target = Target::parse("https://shop.example.com").unwrap();
        assert_eq!(
            target.resolve("/blogs/news").as_deref(),
            Some("https://shop.example.com/blogs/news")
        );
        assert_eq!(
            target.resolve("https://help.example.com/track").as_deref(),
            Some("https://help.example.com/track")
        );
        assert!(target.resolve("mailto:hi@shop.example.com").is_none());
        assert!(target.resolve("javascript:void(0)").is_none());
    }

    #[test]
    fn brand_hint_skips_www() {
        let target = Target::parse("https://www.allbirds.com").unwrap();
        assert_eq!(target.brand_hint(), "allbirds");
    }

    #[test]
    fn serde_round_trips_through_canonical_string() {
        let target = Target::parse("https://shop.example.com/").unwrap();
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(json, "\"https://shop.example.com\"");
        let back: Target = serde_json::from_str(&json).unwrap();
        assert_eq!(back, target);
    }
}
