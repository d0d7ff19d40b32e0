use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One ingested social post, progressively enriched by the pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub url: String,
    pub ts: DateTime<Utc>,
    pub platform: String,
    pub text: String,
    pub kind: String,
    pub meta: Map<String, Value>,

    // enrichment
    pub lang: Option<String>,
    pub lang_conf: Option<f64>,
    pub mixed_lang: bool,
    pub slang: bool,
    pub text_norm: Option<String>,
    pub sponsored_label: Option<SponsoredLabel>,
    pub sponsored_score: Option<f64>,
    pub cluster_id: Option<u32>,
}

impl Document {
    /// Build a document from already-typed values (native date-time input).
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        ts: DateTime<Utc>,
        platform: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            ts,
            platform: platform.into().to_lowercase(),
            text: text.into(),
            kind: "unknown".into(),
            meta: Map::new(),
            lang: None,
            lang_conf: None,
            mixed_lang: false,
            slang: false,
            text_norm: None,
            sponsored_label: None,
            sponsored_score: None,
            cluster_id: None,
        }
    }

    /// Text used for clustering: normalized when available.
    pub fn analysis_text(&self) -> &str {
        self.text_norm.as_deref().unwrap_or(&self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SponsoredLabel {
    Sponsored,
    Uncertain,
    Organic,
}

impl SponsoredLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sponsored => "sponsored",
            Self::Uncertain => "uncertain",
            Self::Organic => "organic",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicCluster {
    pub id: u32,
    pub size: usize,
    pub top_terms: Vec<String>,
    pub exemplar_ids: Vec<String>,
    pub coverage: f64,
}

impl TopicCluster {
    /// Leading term, "vario" for a cluster without terms.
    pub fn topic(&self) -> &str {
        self.top_terms.first().map(String::as_str).unwrap_or("vario")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Pro,
    Contra,
    Neutro,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub topic: String,
    pub text: String,
    pub stance: Stance,
    pub confidence: f64,
    pub coverage: f64,
    pub evidence_ids: Vec<String>,
    pub controversial: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StylometryMetrics {
    pub avg_sentence_len: f64,
    pub emoji_per_100w: f64,
    pub questions_rate: f64,
    pub imperative_rate: f64,
    pub tt_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvolutionFlag {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    pub evolution_score: f64,
    pub evolution_flag: EvolutionFlag,
    pub change_points: Vec<u32>,
}

impl EvolutionResult {
    pub fn quiet() -> Self {
        Self {
            evolution_score: 0.0,
            evolution_flag: EvolutionFlag::Low,
            change_points: Vec::new(),
        }
    }
}
