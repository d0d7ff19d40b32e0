use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::claims::{extract_claims, ClaimParams};
use crate::cluster::{cluster_documents, ClusterParams};
use crate::consolidate::{annotate, build_content_blueprint, build_persona_profile, ProfileInputs};
use crate::error::IngestError;
use crate::evolution::{self, EvolutionParams};
use crate::ingest::{ensure_unique_ids, ingest_batch};
use crate::lang;
use crate::lexicon::Lexicon;
use crate::models::Document;
use crate::out_models::PipelineResult;
use crate::sponsored::{self, SponsoredParams};
use crate::stylometry;

/// Every tunable of a run. `Default` reproduces the stock Italian/English setup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub target_language: String,
    pub lexicon: Lexicon,
    pub cluster: ClusterParams,
    pub claims: ClaimParams,
    pub evolution: EvolutionParams,
    pub sponsored: SponsoredParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_language: "it".to_string(),
            lexicon: Lexicon::default(),
            cluster: ClusterParams::default(),
            claims: ClaimParams::default(),
            evolution: EvolutionParams::default(),
            sponsored: SponsoredParams::default(),
        }
    }
}

/// Caller-supplied identity for the profile.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub handle: String,
    pub platforms: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            handle: "unknown".to_string(),
            platforms: None,
            languages: None,
        }
    }
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validate raw records, then run every stage.
    pub fn run(&self, records: &[Value], options: &RunOptions) -> Result<PipelineResult, IngestError> {
        let documents = ingest_batch(records)?;
        self.run_documents(documents, options)
    }

    /// Run the stages over typed documents. Ids must be unique; any
    /// `cluster_id` they carry is recomputed.
    pub fn run_documents(
        &self,
        mut documents: Vec<Document>,
        options: &RunOptions,
    ) -> Result<PipelineResult, IngestError> {
        ensure_unique_ids(&documents)?;
        let pipeline_start = std::time::Instant::now();
        let cfg = &self.config;
        let lexicon = &cfg.lexicon;
        info!(
            "Pipeline started - handle={}, documents={}, target_language={}",
            options.handle,
            documents.len(),
            cfg.target_language
        );
        if documents.is_empty() {
            warn!("Empty batch - producing empty profile");
        }

        // 1) per-document passes are independent
        let normalize_start = std::time::Instant::now();
        documents.par_iter_mut().for_each(|doc| {
            lang::normalize(doc, &cfg.target_language, lexicon);
            sponsored::detect(doc, lexicon, &cfg.sponsored);
        });
        let mixed = documents.iter().filter(|d| d.mixed_lang).count();
        info!(
            "Normalization and sponsored scoring completed - duration={:.2}s, mixed_lang={}",
            normalize_start.elapsed().as_secs_f32(),
            mixed
        );

        // 2) cluster
        let cluster_start = std::time::Instant::now();
        let clusters = cluster_documents(&mut documents, &lexicon.stopwords, &cfg.cluster);
        info!(
            "Clustering completed - duration={:.2}s, clusters={}",
            cluster_start.elapsed().as_secs_f32(),
            clusters.len()
        );

        // 3) claims, style, drift
        let claims = extract_claims(&clusters, &documents, lexicon, &cfg.claims);
        let style = stylometry::analyze(&documents, lexicon);
        let evolution = evolution::track(&documents, lexicon, &cfg.evolution);
        debug!(
            "Analysis stages done - claims={}, evolution_score={}",
            claims.len(),
            evolution.evolution_score
        );

        // 4) consolidate
        let consolidate_start = std::time::Instant::now();
        let inputs = ProfileInputs {
            documents: &documents,
            clusters: &clusters,
            claims: &claims,
            stylometry: &style,
            evolution: &evolution,
        };
        let persona_profile = build_persona_profile(&inputs, options, &cfg.target_language, lexicon);
        let content_blueprint =
            build_content_blueprint(&documents, &clusters, &claims, &persona_profile, lexicon);
        let annotated_documents = documents.iter().map(annotate).collect();
        debug!(
            "Consolidation completed - duration={:.2}s",
            consolidate_start.elapsed().as_secs_f32()
        );

        info!(
            "Pipeline completed successfully - total_duration={:.2}s, documents={}, clusters={}, claims={}",
            pipeline_start.elapsed().as_secs_f32(),
            documents.len(),
            clusters.len(),
            claims.len()
        );

        Ok(PipelineResult {
            persona_profile,
            content_blueprint,
            annotated_documents,
        })
    }
}
