use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{EvolutionFlag, SponsoredLabel, Stance, StylometryMetrics};

/* Persona profile */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub influencer: Influencer,
    pub data_quality: DataQuality,
    pub core_values: Vec<CoreValue>,
    pub beliefs_positions: Vec<BeliefPosition>,
    pub voice_style: VoiceStyle,
    pub topics_distribution: Vec<TopicWeight>,
    pub evidence: Vec<EvidenceEntry>,
    /// YYYY-MM-DD of the newest post; null for an empty batch
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Influencer {
    pub handle: String,
    pub platforms: Vec<String>,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQuality {
    pub docs_total: usize,
    pub mixed_lang_docs: f64, // ratio
    pub sponsored_share: f64,
    pub evolution_score: f64,
    pub evolution_flag: EvolutionFlag,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreValue {
    pub value: String,
    pub confidence: f64,
    pub coverage: f64,
    pub source_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefPosition {
    pub topic: String,
    pub text: String,
    pub stance: Stance,
    pub confidence: f64,
    pub coverage: f64,
    pub evidence_ids: Vec<String>,
    pub controversial: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceStyle {
    pub metrics: StylometryMetrics,
    pub platform_metrics: BTreeMap<String, StylometryMetrics>,
    pub tone_labels: Vec<String>,
    pub taboos_redlines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicWeight {
    pub topic: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub id: String,
    pub url: String,
    pub snippet: String,
    pub kind: String,
    pub lang: Option<String>,
    pub mixed_lang: bool,
}

/* Content blueprint */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlueprint {
    pub persona_ref: PersonaRef,
    pub pillars: Vec<String>,
    pub angle_options: Vec<AngleOption>,
    pub voice_guardrails: VoiceGuardrails,
    pub compliance: Compliance,
    pub sponsored_policy: SponsoredPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaRef {
    pub handle: String,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AngleOption {
    pub angle: String, // data-driven | counterintuitive | best-practice
    pub min_conf: f64,
    pub from_topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceGuardrails {
    pub must: Vec<String>,
    pub avoid: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compliance {
    pub red_lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SponsoredPolicy {
    pub use_ads_content: bool,
    pub reason: String,
}

/* Per-document export */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub id: String,
    pub url: String,
    pub ts: String, // RFC 3339
    pub platform: String,
    pub lang: Option<String>,
    pub lang_conf: Option<f64>,
    pub mixed_lang: bool,
    pub slang: bool,
    pub kind: String,
    pub sponsored_label: Option<SponsoredLabel>,
    pub sponsored_score: Option<f64>,
    pub text: String,
    pub text_norm: Option<String>,
    pub cluster_id: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub persona_profile: PersonaProfile,
    pub content_blueprint: ContentBlueprint,
    pub annotated_documents: Vec<AnnotatedDocument>,
}
