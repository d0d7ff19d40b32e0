use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::lexicon::Lexicon;
use crate::models::{Document, StylometryMetrics};
use crate::text::{self, content_tokens, split_sentences};

/// Raw counts behind the sentence-level ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceCounts {
    pub sentences: usize,
    pub words: usize,
    pub questions: usize,
    pub imperatives: usize,
}

pub fn sentence_counts(raw: &str, imperative_verbs: &BTreeSet<String>) -> SentenceCounts {
    let mut sentences = split_sentences(raw);
    if sentences.is_empty() {
        sentences.push(raw);
    }

    let mut counts = SentenceCounts {
        sentences: sentences.len(),
        words: 0,
        questions: 0,
        imperatives: 0,
    };
    for sentence in &sentences {
        let words = text::words(sentence);
        counts.words += words.len();
        if sentence.ends_with('?') {
            counts.questions += 1;
        }
        if let Some(first) = words.first() {
            if imperative_verbs.contains(&first.to_lowercase()) {
                counts.imperatives += 1;
            }
        }
    }
    counts
}

pub fn document_metrics(doc: &Document, lexicon: &Lexicon) -> StylometryMetrics {
    let c = sentence_counts(&doc.text, &lexicon.imperative_verbs);
    let tokens = content_tokens(&doc.text, &lexicon.stopwords);
    let unique: BTreeSet<&String> = tokens.iter().collect();
    let sentences = c.sentences.max(1) as f64;

    StylometryMetrics {
        avg_sentence_len: c.words as f64 / sentences,
        emoji_per_100w: text::count_emojis(&doc.text) as f64 / c.words.max(1) as f64 * 100.0,
        questions_rate: c.questions as f64 / sentences,
        imperative_rate: c.imperatives as f64 / sentences,
        tt_ratio: unique.len() as f64 / tokens.len().max(1) as f64,
    }
}

/// Arithmetic mean of each metric; all zeros for an empty slice.
pub fn aggregate(values: &[StylometryMetrics]) -> StylometryMetrics {
    if values.is_empty() {
        return StylometryMetrics::default();
    }
    let n = values.len() as f64;
    let sum = |f: fn(&StylometryMetrics) -> f64| values.iter().map(f).sum::<f64>() / n;
    StylometryMetrics {
        avg_sentence_len: sum(|m| m.avg_sentence_len),
        emoji_per_100w: sum(|m| m.emoji_per_100w),
        questions_rate: sum(|m| m.questions_rate),
        imperative_rate: sum(|m| m.imperative_rate),
        tt_ratio: sum(|m| m.tt_ratio),
    }
}

impl StylometryMetrics {
    pub fn rounded(&self) -> Self {
        Self {
            avg_sentence_len: text::round2(self.avg_sentence_len),
            emoji_per_100w: text::round2(self.emoji_per_100w),
            questions_rate: text::round2(self.questions_rate),
            imperative_rate: text::round2(self.imperative_rate),
            tt_ratio: text::round2(self.tt_ratio),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StylometryReport {
    pub global: StylometryMetrics,
    pub per_platform: BTreeMap<String, StylometryMetrics>,
    pub per_document: BTreeMap<String, StylometryMetrics>,
}

pub fn analyze(documents: &[Document], lexicon: &Lexicon) -> StylometryReport {
    let mut buckets: BTreeMap<String, Vec<StylometryMetrics>> = BTreeMap::new();
    let mut all = Vec::with_capacity(documents.len());
    let mut per_document = BTreeMap::new();

    for doc in documents {
        let m = document_metrics(doc, lexicon);
        buckets.entry(doc.platform.to_lowercase()).or_default().push(m);
        per_document.insert(doc.id.clone(), m);
        all.push(m);
    }

    let report = StylometryReport {
        global: aggregate(&all),
        per_platform: buckets.iter().map(|(p, v)| (p.clone(), aggregate(v))).collect(),
        per_document,
    };
    info!(
        "Stylometry completed - documents={}, platforms={}, avg_sentence_len={:.2}",
        documents.len(),
        report.per_platform.len(),
        report.global.avg_sentence_len
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn question_and_imperative_counts() {
        let lex = Lexicon::default();
        let c = sentence_counts("Fai questo! Funziona?", &lex.imperative_verbs);
        assert_eq!(
            c,
            SentenceCounts { sentences: 2, words: 3, questions: 1, imperatives: 1 }
        );
    }

    #[test]
    fn empty_text_never_divides_by_zero() {
        let lex = Lexicon::default();
        let d = Document::new("e", "u", Utc::now(), "x", "");
        let m = document_metrics(&d, &lex);
        assert_eq!(m, StylometryMetrics::default());
    }

    #[test]
    fn platform_buckets_are_averaged() {
        let lex = Lexicon::default();
        let docs = vec![
            Document::new("a", "u", Utc::now(), "Instagram", "Fai questo! Funziona?"),
            Document::new("b", "u", Utc::now(), "instagram", "Oggi corsa lunga."),
            Document::new("c", "u", Utc::now(), "youtube", "Prova anche tu 🔥"),
        ];
        let r = analyze(&docs, &lex);
        assert_eq!(r.per_platform.len(), 2);
        let ig = r.per_platform["instagram"];
        assert!((ig.questions_rate - 0.25).abs() < 1e-9);
        let yt = r.per_platform["youtube"];
        assert!((yt.emoji_per_100w - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(yt.imperative_rate, 1.0);
        assert_eq!(r.per_document.len(), 3);
        assert!((r.global.imperative_rate - 0.5).abs() < 1e-9);
    }
}
