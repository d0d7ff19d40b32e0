//! Curated word lists and patterns driving every heuristic stage.
//!
//! Stages never reach for module-level constants; they receive a [`Lexicon`]
//! so tests can swap in tiny fixture lists and new locales can be added from
//! a JSON file without touching stage code.

use regex::{RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::ConfigError;

/// Stop-word markers used to recognise one source language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageProfile {
    pub code: String,
    pub markers: BTreeSet<String>,
}

/// Case-insensitive claim trigger patterns, compiled once at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TriggerSet {
    patterns: Vec<String>,
    set: RegexSet,
}

impl TriggerSet {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let set = RegexSetBuilder::new(&patterns)
            .case_insensitive(true)
            .build()?;
        Ok(Self { patterns, set })
    }

    pub fn is_match(&self, sentence: &str) -> bool {
        self.set.is_match(sentence)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl TryFrom<Vec<String>> for TriggerSet {
    type Error = regex::Error;

    fn try_from(patterns: Vec<String>) -> Result<Self, Self::Error> {
        TriggerSet::new(patterns)
    }
}

impl From<TriggerSet> for Vec<String> {
    fn from(t: TriggerSet) -> Self {
        t.patterns
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Detection order matters: on equal hit counts the earlier language wins.
    pub languages: Vec<LanguageProfile>,
    pub slang: BTreeSet<String>,
    /// target language -> (source word -> replacement)
    pub glossaries: BTreeMap<String, BTreeMap<String, String>>,
    pub stopwords: BTreeSet<String>,
    pub claim_triggers: TriggerSet,
    pub pro_keywords: BTreeSet<String>,
    pub con_keywords: BTreeSet<String>,
    pub imperative_verbs: BTreeSet<String>,
    /// Openers counted by the evolution style proxy; narrower than `imperative_verbs`.
    pub drift_imperative_verbs: BTreeSet<String>,
    pub ad_hashtags: BTreeSet<String>,
    pub paid_partnership_phrases: Vec<String>,
    pub discount_keywords: BTreeSet<String>,
    pub affiliate_domains: BTreeSet<String>,
    pub promo_topics: BTreeSet<String>,
    pub taboos: Vec<String>,
    pub red_lines: Vec<String>,
}

fn set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn list(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        let italian = LanguageProfile {
            code: "it".into(),
            markers: set(&[
                "e", "che", "non", "per", "con", "sono", "fare", "allenamento", "ciao",
                "ragazzi", "consiglio", "evito", "sempre", "giorno", "grande", "bene",
            ]),
        };
        let english = LanguageProfile {
            code: "en".into(),
            markers: set(&[
                "and", "the", "for", "with", "are", "workout", "hello", "guys", "tip",
                "avoid", "always", "day", "great",
            ]),
        };

        let mut it_glossary = BTreeMap::new();
        for (from, to) in [
            ("workout", "allenamento"),
            ("training", "allenamento"),
            ("tip", "consiglio"),
            ("avoid", "evita"),
            ("healthy", "sano"),
            ("mindset", "mentalità"),
            ("focus", "focus"),
        ] {
            it_glossary.insert(from.to_string(), to.to_string());
        }
        let mut glossaries = BTreeMap::new();
        glossaries.insert("it".to_string(), it_glossary);

        // Built-in patterns are known to compile.
        let claim_triggers = TriggerSet::new([
            r"\bcredo\b",
            r"\bconsiglio\b",
            r"\bevito\b",
            r"\bdevi\b",
            r"\bdovresti\b",
            r"\bmai\s+più\b",
            r"\bnon\s+fare\b",
        ])
        .expect("built-in claim triggers compile");

        Self {
            languages: vec![italian, english],
            slang: set(&["lol", "lmao", "haha", "ahah", "omg", "raga", "tipo", "yolo"]),
            glossaries,
            stopwords: set(&[
                "e", "che", "con", "per", "the", "and", "una", "del", "della", "di", "un", "lo",
                "la", "gli", "le", "a", "da", "su",
            ]),
            claim_triggers,
            pro_keywords: set(&["amo", "adoro", "ottimo", "pro", "favore", "consiglio", "vale"]),
            con_keywords: set(&["odio", "sconsiglio", "contro", "evito", "male", "no"]),
            imperative_verbs: set(&["fai", "usa", "prova", "ricorda", "evita", "sii", "vai"]),
            drift_imperative_verbs: set(&["fai", "usa", "prova", "ricorda", "evita", "sii"]),
            ad_hashtags: set(&[
                "#ad", "#adv", "#sponsored", "#sponsorizzato", "#collaborazione", "#partner",
            ]),
            paid_partnership_phrases: list(&[
                "paid partnership",
                "partnership a pagamento",
                "in collaborazione con",
                "collaborazione con",
                "in partnership con",
            ]),
            discount_keywords: set(&["codice", "code", "sconto", "discount", "promo"]),
            affiliate_domains: set(&[
                "amzn.to", "bit.ly", "go.magik.ly", "shopstyle.it", "rstyle.me",
            ]),
            promo_topics: set(&["promo", "brand"]),
            taboos: list(&["no miracle promises"]),
            red_lines: list(&["no medical advice"]),
        }
    }
}

impl Lexicon {
    /// Load a lexicon from JSON. Missing sections fall back to the built-in lists.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_claim_triggers<I, S>(mut self, patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.claim_triggers = TriggerSet::new(patterns)?;
        Ok(self)
    }

    pub fn glossary(&self, target: &str) -> Option<&BTreeMap<String, String>> {
        self.glossaries.get(target)
    }
}
