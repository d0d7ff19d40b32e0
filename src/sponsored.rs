//! Ad / affiliate signal scoring. Works on the raw text so markers are never
//! translated away by normalization.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use url::Url;

use crate::lexicon::Lexicon;
use crate::models::{Document, SponsoredLabel};
use crate::text;

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"codice\s+\w+").expect("code pattern"));
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[\w./%-]+").expect("url pattern"));

#[derive(Debug, Clone, Copy)]
pub struct SponsoredParams {
    pub ad_hashtag: f64,           // 0.6
    pub partnership_flag: f64,     // 0.3
    pub discount_or_affiliate: f64, // 0.2
    pub partnership_phrase: f64,   // 0.3
    pub sponsored_at: f64,         // 0.75
    pub uncertain_at: f64,         // 0.5
}

impl Default for SponsoredParams {
    fn default() -> Self {
        Self {
            ad_hashtag: 0.6,
            partnership_flag: 0.3,
            discount_or_affiliate: 0.2,
            partnership_phrase: 0.3,
            sponsored_at: 0.75,
            uncertain_at: 0.5,
        }
    }
}

// Substring match, so "#adv" and "#ad_campaign" count as well.
fn has_ad_hashtag(lower: &str, lexicon: &Lexicon) -> bool {
    lexicon.ad_hashtags.iter().any(|tag| lower.contains(tag.as_str()))
}

/// `paid_partnership` (or `partnership`) set to true / "true" / "1" / "yes".
pub fn has_partnership_flag(meta: &Map<String, Value>) -> bool {
    let flag = ["paid_partnership", "partnership"]
        .iter()
        .filter_map(|k| meta.get(*k))
        .find(|v| match v {
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            _ => false,
        });
    match flag {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}

// Inflected forms ("promozione", "codes") count too.
fn has_discount_code(lower: &str, lexicon: &Lexicon) -> bool {
    lexicon
        .discount_keywords
        .iter()
        .any(|k| lower.contains(k.as_str()))
        || CODE_RE.is_match(lower)
}

fn has_affiliate_url(lower: &str, lexicon: &Lexicon) -> bool {
    URL_RE.find_iter(lower).any(|m| {
        let raw = m.as_str();
        match Url::parse(raw).ok().and_then(|u| u.host_str().map(str::to_string)) {
            Some(host) => lexicon
                .affiliate_domains
                .iter()
                .any(|d| host == *d || host.ends_with(&format!(".{d}"))),
            None => lexicon.affiliate_domains.iter().any(|d| raw.contains(d.as_str())),
        }
    })
}

/// Additive score in [0, 1], rounded to two decimals.
pub fn sponsored_score(raw_text: &str, meta: &Map<String, Value>, lexicon: &Lexicon, params: &SponsoredParams) -> f64 {
    let lower = raw_text.to_lowercase();
    let mut score = 0.0;
    if has_ad_hashtag(&lower, lexicon) {
        score += params.ad_hashtag;
    }
    if has_partnership_flag(meta) {
        score += params.partnership_flag;
    }
    if has_discount_code(&lower, lexicon) || has_affiliate_url(&lower, lexicon) {
        score += params.discount_or_affiliate;
    }
    if lexicon
        .paid_partnership_phrases
        .iter()
        .any(|p| lower.contains(p.as_str()))
    {
        score += params.partnership_phrase;
    }
    text::round2(f64::min(score, 1.0))
}

pub fn label_for(score: f64, params: &SponsoredParams) -> SponsoredLabel {
    if score >= params.sponsored_at {
        SponsoredLabel::Sponsored
    } else if score >= params.uncertain_at {
        SponsoredLabel::Uncertain
    } else {
        SponsoredLabel::Organic
    }
}

/// Score `doc` and set its sponsored label, score and kind.
pub fn detect(doc: &mut Document, lexicon: &Lexicon, params: &SponsoredParams) {
    let score = sponsored_score(&doc.text, &doc.meta, lexicon, params);
    doc.sponsored_label = Some(label_for(score, params));
    doc.sponsored_score = Some(score);

    // kind keeps its own thresholds so it can be retuned apart from the label
    doc.kind = if score >= params.sponsored_at {
        "sponsored".to_string()
    } else if score >= params.uncertain_at && score < params.sponsored_at {
        "uncertain".to_string()
    } else {
        "organic".to_string()
    };
}
