//! Topical and stylistic drift between an older and a recent time window.

use chrono::Duration;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::lexicon::Lexicon;
use crate::models::{Document, EvolutionFlag, EvolutionResult};
use crate::text::{self, content_tokens, split_sentences};

#[derive(Debug, Clone, Copy)]
pub struct EvolutionParams {
    pub window_days: i64,          // 180
    pub high_at: f64,              // 0.65
    pub moderate_at: f64,          // 0.35
    pub emerging_recent_share: f64, // 0.12
    pub emerging_past_share: f64,  // 0.05
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            window_days: 180,
            high_at: 0.65,
            moderate_at: 0.35,
            emerging_recent_share: 0.12,
            emerging_past_share: 0.05,
        }
    }
}

const STYLE_METRICS: usize = 5;

/// Single-text proxies: words per sentence, emoji per 100 words, ends with "?",
/// starts with an imperative verb, type-token ratio.
type StyleVector = [f64; STYLE_METRICS];

#[derive(Debug, Default)]
struct Window {
    topics: BTreeMap<u32, usize>,
    style: Vec<StyleVector>,
}

fn style_vector(raw: &str, lexicon: &Lexicon) -> StyleVector {
    let sentences = split_sentences(raw).len().max(1) as f64;
    let words = text::words(raw);
    let tokens = content_tokens(raw, &lexicon.stopwords);
    let unique: std::collections::BTreeSet<&String> = tokens.iter().collect();

    let question = if raw.trim().ends_with('?') { 1.0 } else { 0.0 };
    let imperative = match words.first() {
        Some(w) if lexicon.drift_imperative_verbs.contains(&w.to_lowercase()) => 1.0,
        _ => 0.0,
    };
    [
        words.len() as f64 / sentences,
        text::count_emojis(raw) as f64 / words.len().max(1) as f64 * 100.0,
        question,
        imperative,
        unique.len() as f64 / tokens.len().max(1) as f64,
    ]
}

fn collect(docs: &[&Document], lexicon: &Lexicon) -> Window {
    let mut w = Window::default();
    for doc in docs {
        if let Some(cid) = doc.cluster_id {
            *w.topics.entry(cid).or_insert(0) += 1;
        }
        w.style.push(style_vector(&doc.text, lexicon));
    }
    w
}

/// Counts to probabilities; an all-zero map when there is nothing to count.
pub fn probabilities<K: Ord + Clone>(counts: &BTreeMap<K, usize>) -> BTreeMap<K, f64> {
    let total: usize = counts.values().sum();
    counts
        .iter()
        .map(|(k, &v)| {
            let p = if total == 0 { 0.0 } else { v as f64 / total as f64 };
            (k.clone(), p)
        })
        .collect()
}

/// Jensen-Shannon divergence in bits. Symmetric and bounded by 1.
pub fn jensen_shannon<K: Ord + Clone>(p: &BTreeMap<K, f64>, q: &BTreeMap<K, f64>) -> f64 {
    let keys: Vec<&K> = {
        let mut ks: Vec<&K> = p.keys().chain(q.keys()).collect();
        ks.sort();
        ks.dedup();
        ks
    };
    let get = |m: &BTreeMap<K, f64>, k: &K| m.get(k).copied().unwrap_or(0.0);

    let kl_to_mid = |a: &BTreeMap<K, f64>| -> f64 {
        keys.iter()
            .map(|&k| {
                let v = get(a, k);
                if v == 0.0 {
                    return 0.0;
                }
                let mid = 0.5 * (get(p, k) + get(q, k));
                v * (v / mid.max(1e-12)).log2()
            })
            .sum()
    };
    0.5 * (kl_to_mid(p) + kl_to_mid(q))
}

/// Mean absolute gap between the two windows' z-scores, pooled per metric.
fn style_delta(past: &[StyleVector], recent: &[StyleVector]) -> f64 {
    if past.is_empty() || recent.is_empty() {
        return 0.0;
    }
    let mut total = 0.0;
    for m in 0..STYLE_METRICS {
        let pooled: Vec<f64> = past.iter().chain(recent).map(|v| v[m]).collect();
        let mu = text::mean(&pooled);
        let sigma = text::pstdev(&pooled);
        if sigma == 0.0 {
            continue;
        }
        let past_mean = text::mean(&past.iter().map(|v| v[m]).collect::<Vec<_>>());
        let recent_mean = text::mean(&recent.iter().map(|v| v[m]).collect::<Vec<_>>());
        let z_past = (past_mean - mu) / sigma;
        let z_recent = (recent_mean - mu) / sigma;
        total += (z_recent - z_past).abs();
    }
    total / STYLE_METRICS as f64
}

pub fn track(documents: &[Document], lexicon: &Lexicon, params: &EvolutionParams) -> EvolutionResult {
    let mut sorted: Vec<&Document> = documents.iter().collect();
    sorted.sort_by_key(|d| d.ts);
    let Some(latest) = sorted.last().map(|d| d.ts) else {
        return EvolutionResult::quiet();
    };
    let cutoff = latest - Duration::days(params.window_days);

    let (past_docs, recent_docs): (Vec<&Document>, Vec<&Document>) =
        sorted.into_iter().partition(|d| d.ts < cutoff);
    let past = collect(&past_docs, lexicon);
    let recent = collect(&recent_docs, lexicon);
    debug!(
        "Evolution windows - cutoff={}, past_docs={}, recent_docs={}",
        cutoff,
        past_docs.len(),
        recent_docs.len()
    );

    if past.topics.is_empty() && recent.topics.is_empty() {
        return EvolutionResult::quiet();
    }

    let past_p = probabilities(&past.topics);
    let recent_p = probabilities(&recent.topics);

    let jsd = if past_p.is_empty() || recent_p.is_empty() {
        0.0
    } else {
        jensen_shannon(&past_p, &recent_p)
    };
    let delta = style_delta(&past.style, &recent.style);
    let score = (0.5 * jsd + 0.5 * delta).clamp(0.0, 1.0);

    let flag = if score >= params.high_at {
        EvolutionFlag::High
    } else if score >= params.moderate_at {
        EvolutionFlag::Moderate
    } else {
        EvolutionFlag::Low
    };

    let change_points: Vec<u32> = recent_p
        .iter()
        .filter(|&(cid, &share)| {
            share >= params.emerging_recent_share
                && past_p.get(cid).copied().unwrap_or(0.0) < params.emerging_past_share
        })
        .map(|(cid, _)| *cid)
        .collect();

    info!(
        "Evolution tracking completed - jsd={:.3}, style_delta={:.3}, score={:.2}, flag={:?}, change_points={}",
        jsd,
        delta,
        score,
        flag,
        change_points.len()
    );

    EvolutionResult {
        evolution_score: text::round2(score),
        evolution_flag: flag,
        change_points,
    }
}
