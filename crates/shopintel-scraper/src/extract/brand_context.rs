use super::{scan_candidates, ExtractorOutcome, Scan, Signal, ABOUT_PATHS};
use crate::fetch::Fetcher;
use crate::html::{main_text, truncate_chars};

const MIN_CHARS: usize = 100;
const MAX_CHARS: usize = 1500;

pub(super) fn about_text(html: &str) -> Option<String> {
    let text = main_text(html);
    (text.chars().count() > MIN_CHARS).then(|| truncate_chars(&text, MAX_CHARS))
}

pub(super) async fn extract(fetcher: &Fetcher) -> ExtractorOutcome {
    match scan_candidates(fetcher, ABOUT_PATHS, |_, html| about_text(html)).await {
        Scan::Found(text) => ExtractorOutcome::Succeeded(Signal::BrandContext(Some(text))),
        Scan::Nothing => ExtractorOutcome::Succeeded(Signal::BrandContext(None)),
        Scan::AllFailed(e) => ExtractorOutcome::Failed(e.failure_reason()),
    }
}
