//! Fuses stage outputs into the persona profile, the content blueprint and
//! the per-document export.

use std::collections::{BTreeMap, BTreeSet};

use crate::lexicon::Lexicon;
use crate::models::{Claim, Document, EvolutionResult, SponsoredLabel, StylometryMetrics, TopicCluster};
use crate::orchestrator::RunOptions;
use crate::out_models::*;
use crate::stylometry::StylometryReport;
use crate::text::{mean, round2};

// Shared by tone labels and voice guardrails.
const LONG_SENTENCE_WORDS: f64 = 15.0;
const QUESTION_RATE: f64 = 0.2;
const EMOJI_PER_100W: f64 = 1.0;
const IMPERATIVE_RATE: f64 = 0.2;

const CORE_VALUE_MIN_COVERAGE: f64 = 0.15;
const DEFAULT_CONFIDENCE: f64 = 0.6;
const ADS_CONTENT_SHARE: f64 = 0.3;
const SNIPPET_CHARS: usize = 140;

fn claims_by_topic(claims: &[Claim]) -> BTreeMap<&str, Vec<&Claim>> {
    let mut map: BTreeMap<&str, Vec<&Claim>> = BTreeMap::new();
    for c in claims {
        map.entry(c.topic.as_str()).or_default().push(c);
    }
    map
}

/// Cluster coverage renormalized over the surviving clusters.
pub fn topics_distribution(clusters: &[TopicCluster]) -> Vec<TopicWeight> {
    let total: f64 = clusters.iter().map(|c| c.coverage).sum();
    let total = if total > 0.0 { total } else { 1.0 };
    clusters
        .iter()
        .map(|c| TopicWeight {
            topic: c.topic().to_string(),
            weight: round2(c.coverage / total),
        })
        .collect()
}

pub fn tone_labels(m: &StylometryMetrics) -> Vec<String> {
    let mut labels = Vec::new();
    if m.questions_rate > QUESTION_RATE {
        labels.push("engaging");
    }
    if m.emoji_per_100w > EMOJI_PER_100W {
        labels.push("informal");
    }
    if m.avg_sentence_len > LONG_SENTENCE_WORDS {
        labels.push("in-depth");
    } else {
        labels.push("direct");
    }
    if m.imperative_rate > IMPERATIVE_RATE {
        labels.push("motivational");
    }
    labels.into_iter().map(String::from).collect()
}

pub fn core_values(clusters: &[TopicCluster], claims: &[Claim]) -> Vec<CoreValue> {
    let by_topic = claims_by_topic(claims);
    let mut values = Vec::new();

    for cluster in clusters {
        let Some(topic) = cluster.top_terms.first() else {
            continue;
        };
        let associated = by_topic.get(topic.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        if cluster.coverage < CORE_VALUE_MIN_COVERAGE && associated.is_empty() {
            continue;
        }

        let confidence = if associated.is_empty() {
            DEFAULT_CONFIDENCE
        } else {
            mean(&associated.iter().map(|c| c.confidence).collect::<Vec<_>>())
        };
        let coverage = associated
            .iter()
            .map(|c| c.coverage)
            .reduce(f64::max)
            .unwrap_or(cluster.coverage);
        let source_ids: BTreeSet<&String> = associated.iter().flat_map(|c| c.evidence_ids.iter()).collect();

        values.push(CoreValue {
            value: topic.clone(),
            confidence: round2(confidence),
            coverage: round2(coverage),
            source_ids: source_ids.into_iter().cloned().collect(),
        });
    }
    values
}

pub fn beliefs_positions(claims: &[Claim]) -> Vec<BeliefPosition> {
    claims
        .iter()
        .map(|c| BeliefPosition {
            topic: c.topic.clone(),
            text: c.text.clone(),
            stance: c.stance,
            confidence: c.confidence,
            coverage: c.coverage,
            evidence_ids: c.evidence_ids.clone(),
            controversial: c.controversial,
        })
        .collect()
}

pub fn evidence(documents: &[Document]) -> Vec<EvidenceEntry> {
    documents
        .iter()
        .map(|d| EvidenceEntry {
            id: d.id.clone(),
            url: d.url.clone(),
            snippet: d
                .text
                .trim()
                .split('\n')
                .next()
                .unwrap_or("")
                .chars()
                .take(SNIPPET_CHARS)
                .collect(),
            kind: d.kind.clone(),
            lang: d.lang.clone(),
            mixed_lang: d.mixed_lang,
        })
        .collect()
}

pub fn sponsored_share(documents: &[Document]) -> f64 {
    if documents.is_empty() {
        return 0.0;
    }
    let n = documents
        .iter()
        .filter(|d| d.sponsored_label == Some(SponsoredLabel::Sponsored))
        .count();
    n as f64 / documents.len() as f64
}

fn mixed_lang_ratio(documents: &[Document]) -> f64 {
    let n = documents.iter().filter(|d| d.mixed_lang).count();
    n as f64 / documents.len().max(1) as f64
}

/// Date of the newest post, `None` for an empty batch.
pub fn last_updated(documents: &[Document]) -> Option<String> {
    documents
        .iter()
        .map(|d| d.ts)
        .max()
        .map(|ts| ts.date_naive().format("%Y-%m-%d").to_string())
}

pub struct ProfileInputs<'a> {
    pub documents: &'a [Document],
    pub clusters: &'a [TopicCluster],
    pub claims: &'a [Claim],
    pub stylometry: &'a StylometryReport,
    pub evolution: &'a EvolutionResult,
}

pub fn build_persona_profile(
    inputs: &ProfileInputs<'_>,
    options: &RunOptions,
    target_language: &str,
    lexicon: &Lexicon,
) -> PersonaProfile {
    let docs = inputs.documents;

    let platforms = match &options.platforms {
        Some(p) if !p.is_empty() => p.clone(),
        _ => docs
            .iter()
            .map(|d| d.platform.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    };
    let languages = match &options.languages {
        Some(l) if !l.is_empty() => l.clone(),
        _ => vec![target_language.to_string()],
    };

    PersonaProfile {
        influencer: Influencer {
            handle: options.handle.clone(),
            platforms,
            languages,
        },
        data_quality: DataQuality {
            docs_total: docs.len(),
            mixed_lang_docs: round2(mixed_lang_ratio(docs)),
            sponsored_share: round2(sponsored_share(docs)),
            evolution_score: inputs.evolution.evolution_score,
            evolution_flag: inputs.evolution.evolution_flag,
        },
        core_values: core_values(inputs.clusters, inputs.claims),
        beliefs_positions: beliefs_positions(inputs.claims),
        voice_style: VoiceStyle {
            metrics: inputs.stylometry.global.rounded(),
            platform_metrics: inputs
                .stylometry
                .per_platform
                .iter()
                .map(|(p, m)| (p.clone(), m.rounded()))
                .collect(),
            tone_labels: tone_labels(&inputs.stylometry.global),
            taboos_redlines: lexicon.taboos.clone(),
        },
        topics_distribution: topics_distribution(inputs.clusters),
        evidence: evidence(docs),
        last_updated: last_updated(docs),
    }
}

/* Blueprint */

/// Top three topics by coverage; promo-like topics count half when the batch carries ads.
pub fn pillars(clusters: &[TopicCluster], sponsored_share: f64, lexicon: &Lexicon) -> Vec<String> {
    let mut weighted: Vec<(&str, f64)> = clusters
        .iter()
        .map(|c| {
            let topic = c.topic();
            let damp = if sponsored_share > 0.0 && lexicon.promo_topics.contains(topic) { 0.5 } else { 1.0 };
            (topic, c.coverage * damp)
        })
        .collect();
    weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
    weighted.into_iter().take(3).map(|(t, _)| t.to_string()).collect()
}

pub fn angle_options(clusters: &[TopicCluster], claims: &[Claim]) -> Vec<AngleOption> {
    let by_topic = claims_by_topic(claims);
    let mut angles = Vec::new();

    for cluster in clusters {
        let Some(topic) = cluster.top_terms.first() else {
            continue;
        };
        let associated = by_topic.get(topic.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        if associated.iter().any(|c| c.controversial) {
            continue;
        }
        let min_conf = associated
            .iter()
            .map(|c| c.confidence)
            .reduce(f64::min)
            .unwrap_or(DEFAULT_CONFIDENCE);
        let angle = if cluster.top_terms.iter().any(|t| t == "dati") {
            "data-driven"
        } else if cluster.coverage < 0.2 {
            "counterintuitive"
        } else {
            "best-practice"
        };
        angles.push(AngleOption {
            angle: angle.to_string(),
            min_conf: round2(min_conf),
            from_topic: topic.clone(),
        });
    }
    angles
}

pub fn voice_guardrails(m: &StylometryMetrics) -> VoiceGuardrails {
    let must = if m.avg_sentence_len > LONG_SENTENCE_WORDS {
        "go deeper with examples"
    } else {
        "hook within 3s"
    };
    let avoid = if m.questions_rate > QUESTION_RATE {
        "excessive rhetorical questions"
    } else {
        "unverifiable claims"
    };
    VoiceGuardrails {
        must: vec![must.to_string()],
        avoid: vec![avoid.to_string()],
    }
}

pub fn sponsored_policy(share: f64) -> SponsoredPolicy {
    let use_ads = share >= ADS_CONTENT_SHARE;
    SponsoredPolicy {
        use_ads_content: use_ads,
        reason: if use_ads {
            "enough sponsored material".to_string()
        } else {
            "training copy on organic only".to_string()
        },
    }
}

pub fn build_content_blueprint(
    documents: &[Document],
    clusters: &[TopicCluster],
    claims: &[Claim],
    profile: &PersonaProfile,
    lexicon: &Lexicon,
) -> ContentBlueprint {
    let share = sponsored_share(documents);
    ContentBlueprint {
        persona_ref: PersonaRef {
            handle: profile.influencer.handle.clone(),
            version: profile.last_updated.clone(),
        },
        pillars: pillars(clusters, share, lexicon),
        angle_options: angle_options(clusters, claims),
        voice_guardrails: voice_guardrails(&profile.voice_style.metrics),
        compliance: Compliance {
            red_lines: lexicon.red_lines.clone(),
        },
        sponsored_policy: sponsored_policy(share),
    }
}

pub fn annotate(doc: &Document) -> AnnotatedDocument {
    AnnotatedDocument {
        id: doc.id.clone(),
        url: doc.url.clone(),
        ts: doc.ts.to_rfc3339(),
        platform: doc.platform.clone(),
        lang: doc.lang.clone(),
        lang_conf: doc.lang_conf,
        mixed_lang: doc.mixed_lang,
        slang: doc.slang,
        kind: doc.kind.clone(),
        sponsored_label: doc.sponsored_label,
        sponsored_score: doc.sponsored_score,
        text: doc.text.clone(),
        text_norm: doc.text_norm.clone(),
        cluster_id: doc.cluster_id,
    }
}
