use std::sync::LazyLock;

use regex::Regex;
use shopintel_core::ContactInfo;

use super::{scan_candidates, ExtractorOutcome, Scan, Signal};
use crate::fetch::Fetcher;
use crate::html::{anchor_hrefs, clean_text, page_text, strip_noise};

const CONTACT_PATHS: &[&str] = &[
    "/pages/contact",
    "/pages/contact-us",
    "/contact",
    "/contact-us",
];

const MAX_PER_KIND: usize = 5;
const MIN_ADDRESS_CHARS: usize = 10;
const ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});
static EMAIL_EXACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}$").expect("valid regex")
});
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}\b").expect("valid regex")
});
static ADDRESS_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<address\b[^>]*>(.*?)</address\s*>").expect("valid regex")
});
static ADDRESS_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<(?:div|p|span|li|section)\b[^>]*class\s*=\s*["'][^"']*address[^"']*["'][^>]*>(.*?)</(?:div|p|span|li|section)\s*>"#,
    )
    .expect("valid regex")
});

/// Lower-cases and validates an email address.
pub(super) fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().trim_end_matches('.').to_lowercase();
    if ASSET_SUFFIXES.iter().any(|ext| email.ends_with(ext)) {
        return None;
    }
    EMAIL_EXACT_RE.is_match(&email).then_some(email)
}

/// Reduces a phone number to `+` and digits; 7 to 15 digits required.
pub(super) fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if !(7..=15).contains(&digits.len()) {
        return None;
    }
    if trimmed.starts_with('+') {
        Some(format!("+{digits}"))
    } else {
        Some(digits)
    }
}

fn push_capped(set: &mut std::collections::BTreeSet<String>, value: String) {
    if set.len() < MAX_PER_KIND {
        set.insert(value);
    }
}

/// Collects contact entries from one page.
pub(super) fn contact_from_page(html: &str) -> ContactInfo {
    let mut info = ContactInfo::default();

    for href in anchor_hrefs(html) {
        let lower = href.to_ascii_lowercase();
        if let Some(rest) = lower.strip_prefix("mailto:") {
            let addr = rest.split('?').next().unwrap_or_default();
            if let Some(email) = normalize_email(addr) {
                push_capped(&mut info.emails, email);
            }
        } else if let Some(rest) = lower.strip_prefix("tel:") {
            if let Some(phone) = normalize_phone(rest) {
                push_capped(&mut info.phones, phone);
            }
        }
    }

    let text = page_text(html);
    for m in EMAIL_RE.find_iter(&text) {
        if let Some(email) = normalize_email(m.as_str()) {
            push_capped(&mut info.emails, email);
        }
    }
    for m in PHONE_RE.find_iter(&text) {
        if let Some(phone) = normalize_phone(m.as_str()) {
            push_capped(&mut info.phones, phone);
        }
    }

    let content = strip_noise(html);
    for re in [&*ADDRESS_TAG_RE, &*ADDRESS_CLASS_RE] {
        for cap in re.captures_iter(&content) {
            let address = cap.get(1).map(|m| clean_text(m.as_str())).unwrap_or_default();
            if address.chars().count() > MIN_ADDRESS_CHARS
                && info.addresses.len() < MAX_PER_KIND
                && !info.addresses.contains(&address)
            {
                info.addresses.push(address);
            }
        }
    }

    info
}

pub(super) async fn extract(fetcher: &Fetcher) -> ExtractorOutcome {
    let scan = scan_candidates(fetcher, CONTACT_PATHS, |_, html| {
        let info = contact_from_page(html);
        (!info.is_empty()).then_some(info)
    })
    .await;

    match scan {
        Scan::Found(info) => ExtractorOutcome::Succeeded(Signal::Contact(info)),
        Scan::Nothing => ExtractorOutcome::Succeeded(Signal::Contact(ContactInfo::default())),
        Scan::AllFailed(e) => ExtractorOutcome::Failed(e.failure_reason()),
    }
}
