use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use shopintel_core::FaqEntry;

use super::{scan_candidates, ExtractorOutcome, Scan, Signal};
use crate::fetch::Fetcher;
use crate::html::{clean_text, json_ld_blocks, strip_noise};

const FAQ_PATHS: &[&str] = &[
    "/pages/faq",
    "/pages/faqs",
    "/faq",
    "/pages/frequently-asked-questions",
    "/help",
];

const MAX_ENTRIES: usize = 20;
const MIN_PART_CHARS: usize = 5;

static DETAILS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<details\b[^>]*>\s*<summary\b[^>]*>(.*?)</summary\s*>(.*?)</details\s*>")
        .expect("valid regex")
});
static HEADING_ANSWER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<h[2-6]\b[^>]*>(.*?)</h[2-6]\s*>\s*(?:<div\b[^>]*>\s*)*<p\b[^>]*>(.*?)</p\s*>",
    )
    .expect("valid regex")
});

/// Deduplicates by lower-cased question, keeping the first occurrence.
struct Collector {
    seen: HashSet<String>,
    entries: Vec<FaqEntry>,
}

impl Collector {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            entries: Vec::new(),
        }
    }

    fn push(&mut self, question: &str, answer: &str) {
        if self.entries.len() >= MAX_ENTRIES {
            return;
        }
        let question = clean_text(question);
        let answer = clean_text(answer);
        if question.chars().count() <= MIN_PART_CHARS || answer.chars().count() <= MIN_PART_CHARS
        {
            return;
        }
        if self.seen.insert(question.to_lowercase()) {
            self.entries.push(FaqEntry { question, answer });
        }
    }
}

fn is_question_type(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(s)) => s == "Question",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Question")),
        _ => false,
    }
}

fn collect_json_ld_questions(value: &Value, out: &mut Collector) {
    match value {
        Value::Object(map) => {
            if is_question_type(value) {
                let question = map.get("name").and_then(Value::as_str);
                let answer = map
                    .get("acceptedAnswer")
                    .and_then(|a| match a {
                        Value::Array(items) => items.first(),
                        other => Some(other),
                    })
                    .and_then(|a| a.get("text"))
                    .and_then(Value::as_str);
                if let (Some(q), Some(a)) = (question, answer) {
                    out.push(q, a);
                }
            }
            for child in map.values() {
                collect_json_ld_questions(child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_json_ld_questions(child, out);
            }
        }
        _ => {}
    }
}

/// Extracts question/answer pairs from one page.
pub(super) fn faqs_from_page(html: &str) -> Vec<FaqEntry> {
    let mut collector = Collector::new();

    for block in json_ld_blocks(html) {
        collect_json_ld_questions(&block, &mut collector);
    }

    let content = strip_noise(html);
    for cap in DETAILS_RE.captures_iter(&content) {
        let q = cap.get(1).map_or("", |m| m.as_str());
        let a = cap.get(2).map_or("", |m| m.as_str());
        collector.push(q, a);
    }

    for cap in HEADING_ANSWER_RE.captures_iter(&content) {
        let q = cap.get(1).map_or("", |m| m.as_str());
        if !clean_text(q).ends_with('?') {
            continue;
        }
        let a = cap.get(2).map_or("", |m| m.as_str());
        collector.push(q, a);
    }

    collector.entries
}

pub(super) async fn extract(fetcher: &Fetcher) -> ExtractorOutcome {
    let scan = scan_candidates(fetcher, FAQ_PATHS, |_, html| {
        let faqs = faqs_from_page(html);
        (!faqs.is_empty()).then_some(faqs)
    })
    .await;

    match scan {
        Scan::Found(faqs) => ExtractorOutcome::Succeeded(Signal::Faqs(faqs)),
        Scan::Nothing => ExtractorOutcome::Succeeded(Signal::Faqs(Vec::new())),
        Scan::AllFailed(e) => ExtractorOutcome::Failed(e.failure_reason()),
    }
}
