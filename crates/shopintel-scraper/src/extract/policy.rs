use futures::future::join_all;
use shopintel_core::{PolicyDocument, PolicyKind};

use super::{scan_candidates, ExtractorOutcome, Scan, Signal};
use crate::fetch::Fetcher;
use crate::html::{main_text, truncate_chars};

const MIN_BODY_CHARS: usize = 100;
const MAX_BODY_CHARS: usize = 2000;

/// Candidate paths per kind. Shopify's built-in `/policies/*` pages first.
fn candidate_paths(kind: PolicyKind) -> &'static [&'static str] {
    match kind {
        PolicyKind::Privacy => &[
            "/policies/privacy-policy",
            "/pages/privacy-policy",
            "/privacy-policy",
            "/privacy",
        ],
        PolicyKind::Refund => &[
            "/policies/refund-policy",
            "/pages/refund-policy",
            "/refund-policy",
            "/refunds",
            "/pages/refunds",
        ],
        PolicyKind::Return => &[
            "/pages/return-policy",
            "/return-policy",
            "/returns",
            "/pages/returns",
        ],
        PolicyKind::Shipping => &[
            "/policies/shipping-policy",
            "/pages/shipping-policy",
            "/shipping-policy",
            "/shipping",
            "/pages/shipping",
        ],
        PolicyKind::Terms => &[
            "/policies/terms-of-service",
            "/pages/terms-of-service",
            "/terms-of-service",
            "/terms",
            "/pages/terms",
        ],
    }
}

/// Extracts a substantial policy body from one page, if it has one.
pub(super) fn policy_body(html: &str) -> Option<String> {
    let text = main_text(html);
    (text.chars().count() > MIN_BODY_CHARS).then(|| truncate_chars(&text, MAX_BODY_CHARS))
}

pub(super) async fn extract(fetcher: &Fetcher) -> ExtractorOutcome {
    let scans = join_all(PolicyKind::ALL.iter().map(|&kind| async move {
        let scan = scan_candidates(fetcher, candidate_paths(kind), |url, html| {
            policy_body(html).map(|body| PolicyDocument {
                kind,
                url: url.to_owned(),
                body,
            })
        })
        .await;
        (kind, scan)
    }))
    .await;

    let mut documents = Vec::new();
    let mut last_failure = None;
    let mut any_loaded = false;

    for (kind, scan) in scans {
        match scan {
            Scan::Found(doc) => {
                any_loaded = true;
                documents.push(doc);
            }
            Scan::Nothing => {
                any_loaded = true;
                tracing::debug!(kind = %kind, "no policy page with substantial content");
            }
            Scan::AllFailed(e) => last_failure = Some(e),
        }
    }

    match (any_loaded, last_failure) {
        (false, Some(e)) => ExtractorOutcome::Failed(e.failure_reason()),
        _ => ExtractorOutcome::Succeeded(Signal::Policies(documents)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_pages_are_not_policies() {
        assert!(policy_body("<main><p>Coming soon</p></main>").is_none());
    }

    #[test]
    fn long_bodies_are_truncated() {
        let html = format!("<main><p>{}</p></main>", "word ".repeat(1000));
        let body = policy_body(&html).expect("substantial body");
        assert!(body.chars().count() <= MAX_BODY_CHARS);
    }

    #[test]
    fn every_kind_tries_policies_path_or_pages_first() {
        for kind in PolicyKind::ALL {
            let first = candidate_paths(kind)[0];
            assert!(first.starts_with("/policies/") || first.starts_with("/pages/"));
        }
    }
}
