use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use shopintel_core::{Platform, SocialHandle};

use super::{scan_candidates, ExtractorOutcome, Scan, Signal, ABOUT_PATHS};
use crate::fetch::Fetcher;
use crate::html::{anchor_hrefs, page_text};

/// Path segments that are site features, not accounts.
const IGNORED_SEGMENTS: &[&str] = &[
    "sharer",
    "sharer.php",
    "share",
    "share.php",
    "intent",
    "home",
    "p",
    "reel",
    "reels",
    "tv",
    "watch",
    "embed",
    "hashtag",
    "explore",
    "search",
    "results",
    "login",
    "signup",
    "plugins",
    "dialog",
    "tr",
    "pin",
    "policies",
    "privacy",
    "legal",
    "pages",
    "people",
    "groups",
    "profile.php",
    "events",
];

/// One `(prefix?, handle)` pattern per platform, checked against hrefs and
/// page text.
static PATTERNS: LazyLock<Vec<(Platform, Regex)>> = LazyLock::new(|| {
    let boundary = r"(?i)(?:^|[^a-z0-9.-])(?:[a-z0-9-]+\.)?";
    [
        (Platform::Instagram, r"instagram\.com/()([a-z0-9_.]+)"),
        (
            Platform::Facebook,
            r"(?:facebook|fb)\.com/(pages/|people/)?([a-z0-9_.-]+)",
        ),
        (Platform::Twitter, r"(?:twitter|x)\.com/()([a-z0-9_]+)"),
        (Platform::TikTok, r"tiktok\.com/()@([a-z0-9_.]+)"),
        (
            Platform::YouTube,
            r"youtube\.com/(channel/|user/|c/|@)?([a-z0-9_.-]+)",
        ),
        (Platform::LinkedIn, r"linkedin\.com/(company/|in/)?([a-z0-9_.-]+)"),
        (Platform::Pinterest, r"pinterest\.com/()([a-z0-9_.-]+)"),
    ]
    .into_iter()
    .map(|(platform, pattern)| {
        let re = Regex::new(&format!("{boundary}{pattern}")).expect("valid regex");
        (platform, re)
    })
    .collect()
});

fn profile_url(platform: Platform, prefix: &str, handle: &str) -> String {
    match platform {
        Platform::Instagram => format!("https://www.instagram.com/{handle}"),
        Platform::Facebook => format!("https://www.facebook.com/{handle}"),
        Platform::Twitter => format!("https://x.com/{handle}"),
        Platform::TikTok => format!("https://www.tiktok.com/@{handle}"),
        Platform::YouTube => {
            let prefix = if prefix.is_empty() { "@" } else { prefix };
            format!("https://www.youtube.com/{prefix}{handle}")
        }
        Platform::LinkedIn => {
            let prefix = if prefix.is_empty() { "company/" } else { prefix };
            format!("https://www.linkedin.com/{prefix}{handle}")
        }
        Platform::Pinterest => format!("https://www.pinterest.com/{handle}"),
    }
}

/// Every handle found in `haystack`, in platform declaration order.
pub(super) fn handles_in(haystack: &str) -> Vec<SocialHandle> {
    let mut found = Vec::new();
    for (platform, re) in PATTERNS.iter() {
        let hit = re.captures_iter(haystack).find_map(|cap| {
            let prefix = cap.get(1).map_or("", |m| m.as_str()).to_ascii_lowercase();
            let handle = cap.get(2)?.as_str().trim_end_matches(['.', '-']);
            let lower = handle.to_ascii_lowercase();
            if handle.is_empty()
                || IGNORED_SEGMENTS.contains(&lower.as_str())
                || !handle.chars().any(|c| c.is_ascii_alphanumeric())
            {
                return None;
            }
            Some((prefix, handle.to_owned()))
        });
        if let Some((prefix, handle)) = hit {
            found.push(SocialHandle {
                platform: *platform,
                url: profile_url(*platform, &prefix, &handle),
                handle,
            });
        }
    }
    found
}

/// Applies the page-text pass, then the anchor pass, to one page.
/// Later inserts replace earlier ones.
pub(super) fn collect_from_page(html: &str, into: &mut BTreeMap<Platform, SocialHandle>) {
    for handle in handles_in(&page_text(html)) {
        into.insert(handle.platform, handle);
    }
    for href in anchor_hrefs(html) {
        for handle in handles_in(&href) {
            into.insert(handle.platform, handle);
        }
    }
}

pub(super) async fn extract(fetcher: &Fetcher) -> ExtractorOutcome {
    let mut handles = BTreeMap::new();

    let home = fetcher.fetch_html("/").await;
    let home_err = match home {
        Ok(html) => {
            collect_from_page(&html, &mut handles);
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "homepage unavailable for social scan");
            Some(e)
        }
    };

    let about = scan_candidates(fetcher, ABOUT_PATHS, |_, html| Some(html.to_owned())).await;
    match (about, home_err) {
        (Scan::Found(html), _) => collect_from_page(&html, &mut handles),
        (Scan::AllFailed(e), Some(_)) => {
            return ExtractorOutcome::Failed(e.failure_reason());
        }
        _ => {}
    }

    ExtractorOutcome::Succeeded(Signal::Social(handles.into_values().collect()))
}
