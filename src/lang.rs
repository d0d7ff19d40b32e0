//! Stop-word language detection and conservative mixed-language normalization.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

use crate::lexicon::Lexicon;
use crate::models::Document;
use crate::text;

static PROTECTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#@][\w_]+").expect("tag pattern"));
static LATIN_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z']+").expect("latin word pattern"));
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"§(\d+)§").expect("placeholder pattern"));

const MIXED_CONFIDENCE: f64 = 0.9;
const MIXED_SECONDARY_SHARE: f64 = 0.15;

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageDetection {
    pub lang: String,
    pub confidence: f64,
    pub secondary_share: f64,
}

impl LanguageDetection {
    pub fn is_mixed(&self) -> bool {
        self.confidence < MIXED_CONFIDENCE || self.secondary_share > MIXED_SECONDARY_SHARE
    }
}

/// Pick the language whose marker words cover the most tokens.
pub fn detect_language(text: &str, lexicon: &Lexicon, fallback: &str) -> LanguageDetection {
    let tokens = text::lower_words(text);
    let total = tokens.len().max(1) as f64;

    let mut ranked: Vec<(&str, usize)> = lexicon
        .languages
        .iter()
        .map(|p| {
            let n = tokens.iter().filter(|t| p.markers.contains(t.as_str())).count();
            (p.code.as_str(), n)
        })
        .collect();

    // stable: earlier language wins a tie
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    match ranked.first() {
        Some(&(code, n)) if n > 0 => {
            let runner_up = ranked.get(1).map(|r| r.1).unwrap_or(0);
            LanguageDetection {
                lang: code.to_string(),
                confidence: (n as f64 / total).min(1.0),
                secondary_share: runner_up as f64 / total,
            }
        }
        _ => LanguageDetection {
            lang: fallback.to_string(),
            confidence: 0.5,
            secondary_share: 0.0,
        },
    }
}

pub fn detect_slang(tokens: &[String], raw: &str, lexicon: &Lexicon) -> bool {
    tokens.iter().any(|t| lexicon.slang.contains(t))
        || text::has_repeated_run(raw, 3)
        || text::has_emoji(raw)
}

/// Swap glossary words, leaving hashtags and @-mentions untouched.
pub fn conservative_translate(raw: &str, glossary: &BTreeMap<String, String>) -> String {
    let mut protected: Vec<String> = Vec::new();
    let masked = PROTECTED_RE.replace_all(raw, |caps: &Captures| {
        protected.push(caps[0].to_string());
        format!("§{}§", protected.len() - 1)
    });

    let translated = LATIN_WORD_RE.replace_all(&masked, |caps: &Captures| {
        let word = &caps[0];
        match glossary.get(&word.to_lowercase()) {
            Some(repl) if word.chars().next().is_some_and(char::is_uppercase) => capitalize(repl),
            Some(repl) => repl.clone(),
            None => word.to_string(),
        }
    });

    PLACEHOLDER_RE
        .replace_all(&translated, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| protected.get(i).cloned())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Detect language and slang on `doc`, filling in its normalized text.
pub fn normalize(doc: &mut Document, target_language: &str, lexicon: &Lexicon) {
    let detection = detect_language(&doc.text, lexicon, target_language);
    let tokens = text::lower_words(&doc.text);
    let mixed = detection.is_mixed();

    let normalized = match lexicon.glossary(target_language) {
        Some(glossary) if mixed => conservative_translate(&doc.text, glossary),
        _ => doc.text.clone(),
    };

    doc.slang = detect_slang(&tokens, &doc.text, lexicon);
    doc.lang = Some(detection.lang);
    doc.lang_conf = Some(detection.confidence);
    doc.mixed_lang = mixed;
    doc.text_norm = Some(normalized);
}
