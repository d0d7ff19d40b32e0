use chrono::{TimeZone, Utc};
use persona_vibes::models::{EvolutionFlag, SponsoredLabel, Stance};
use persona_vibes::{Document, IngestError, Pipeline, PipelineConfig, RunOptions};
use serde_json::{json, Value};

fn fitness_batch() -> Vec<Value> {
    let mut records = Vec::new();
    for i in 0..6 {
        records.push(json!({
            "id": format!("ig_{i}"),
            "url": format!("https://instagram.com/p/{i}"),
            "ts": format!("2024-04-{:02}T10:00:00Z", 1 + i * 5),
            "platform": "Instagram",
            "text": "Credo nel workout HIIT, ragazzi!",
        }));
    }
    for i in 0..5 {
        records.push(json!({
            "id": format!("yt_{i}"),
            "url": format!("https://youtube.com/watch?v={i}"),
            "ts": format!("2024-04-{:02}T12:00:00+00:00", 3 + i * 5),
            "platform": "youtube",
            "text": "Consiglio una dieta bilanciata con esempi pratici.",
        }));
    }
    records
}

fn options(handle: &str) -> RunOptions {
    RunOptions {
        handle: handle.to_string(),
        ..RunOptions::default()
    }
}

#[test]
fn end_to_end_profile_and_blueprint() {
    let result = Pipeline::new(PipelineConfig::default())
        .run(&fitness_batch(), &options("@fit_coach"))
        .unwrap();
    let p = &result.persona_profile;
    let b = &result.content_blueprint;

    assert_eq!(p.influencer.handle, "@fit_coach");
    assert_eq!(p.influencer.platforms, vec!["instagram", "youtube"]);
    assert_eq!(p.influencer.languages, vec!["it"]);
    assert_eq!(p.data_quality.docs_total, 11);
    // marker hits cover few tokens in either post shape
    assert_eq!(p.data_quality.mixed_lang_docs, 1.0);
    assert_eq!(p.data_quality.sponsored_share, 0.0);
    assert_eq!(p.last_updated.as_deref(), Some("2024-04-26"));

    let topics: Vec<(&str, f64)> = p
        .topics_distribution
        .iter()
        .map(|t| (t.topic.as_str(), t.weight))
        .collect();
    assert_eq!(topics, vec![("credo", 0.55), ("consiglio", 0.45)]);

    assert_eq!(p.beliefs_positions.len(), 2);
    let advice = &p.beliefs_positions[1];
    assert_eq!(advice.topic, "consiglio");
    assert_eq!(advice.stance, Stance::Pro);
    assert_eq!(advice.confidence, 0.9);
    assert_eq!(advice.evidence_ids.len(), 5);
    assert_eq!(p.core_values.len(), 2);
    assert_eq!(p.voice_style.platform_metrics.len(), 2);
    assert_eq!(p.evidence.len(), 11);

    assert_eq!(b.pillars, vec!["credo", "consiglio"]);
    assert_eq!(b.persona_ref.version, p.last_updated);
    assert!(b.angle_options.iter().all(|a| a.angle == "best-practice"));
    assert!(!b.sponsored_policy.use_ads_content);
    assert_eq!(b.compliance.red_lines, vec!["no medical advice"]);

    assert_eq!(result.annotated_documents.len(), 11);
    let ig = &result.annotated_documents[0];
    assert!(ig.mixed_lang);
    assert_eq!(ig.cluster_id, Some(1));
    assert_eq!(ig.kind, "organic");
    assert!(ig.text_norm.as_deref().unwrap().contains("allenamento"));
    assert_eq!(ig.ts, "2024-04-01T10:00:00+00:00");
    let yt = &result.annotated_documents[6];
    assert_eq!(yt.cluster_id, Some(2));
    assert_eq!(yt.text_norm.as_deref(), Some(yt.text.as_str()));
}

#[test]
fn short_history_is_low_drift_with_emerging_topics() {
    let result = Pipeline::new(PipelineConfig::default())
        .run(&fitness_batch(), &RunOptions::default())
        .unwrap();
    let q = &result.persona_profile.data_quality;
    assert_eq!(q.evolution_score, 0.0);
    assert_eq!(q.evolution_flag, EvolutionFlag::Low);
    assert_eq!(result.persona_profile.influencer.handle, "unknown");
}

#[test]
fn missing_required_fields_abort_the_run() {
    let records = vec![json!({ "id": "x1", "ts": "2024-01-01T00:00:00Z", "text": "ciao" })];
    let err = Pipeline::new(PipelineConfig::default())
        .run(&records, &RunOptions::default())
        .unwrap_err();
    match err {
        IngestError::MissingFields { id, fields } => {
            assert_eq!(id, "x1");
            assert_eq!(fields, vec!["platform", "url"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut records = fitness_batch();
    records.push(records[0].clone());
    let err = Pipeline::new(PipelineConfig::default())
        .run(&records, &RunOptions::default())
        .unwrap_err();
    assert!(matches!(err, IngestError::DuplicateId(id) if id == "ig_0"));
}

#[test]
fn empty_batch_yields_empty_state() {
    let result = Pipeline::new(PipelineConfig::default())
        .run(&[], &options("@nobody"))
        .unwrap();
    let p = &result.persona_profile;
    assert_eq!(p.data_quality.docs_total, 0);
    assert_eq!(p.data_quality.mixed_lang_docs, 0.0);
    assert!(p.last_updated.is_none());
    assert!(p.topics_distribution.is_empty());
    assert!(result.content_blueprint.pillars.is_empty());
    assert!(result.content_blueprint.persona_ref.version.is_none());
    assert!(result.annotated_documents.is_empty());
}

#[test]
fn sponsored_majority_enables_ads_content() {
    let mut records = Vec::new();
    for i in 0..3 {
        records.push(json!({
            "id": format!("ad_{i}"),
            "url": "https://instagram.com/p/ad",
            "ts": "2024-03-01T09:00:00Z",
            "platform": "instagram",
            "text": "In collaborazione con Brand #ad, codice RUN10",
            "meta": { "paid_partnership": true },
        }));
    }
    for i in 0..2 {
        records.push(json!({
            "id": format!("org_{i}"),
            "url": "https://instagram.com/p/org",
            "ts": "2024-03-02T09:00:00Z",
            "platform": "instagram",
            "text": "Oggi corsa al parco.",
        }));
    }
    let result = Pipeline::new(PipelineConfig::default())
        .run(&records, &RunOptions::default())
        .unwrap();

    assert_eq!(result.persona_profile.data_quality.sponsored_share, 0.6);
    let policy = &result.content_blueprint.sponsored_policy;
    assert!(policy.use_ads_content);
    assert_eq!(policy.reason, "enough sponsored material");
    let ad = &result.annotated_documents[0];
    assert_eq!(ad.sponsored_label, Some(SponsoredLabel::Sponsored));
    assert_eq!(ad.sponsored_score, Some(1.0));
    assert_eq!(ad.kind, "sponsored");
}

#[test]
fn typed_documents_skip_ingestion() {
    let docs: Vec<Document> = (0..5)
        .map(|i| {
            Document::new(
                format!("d{i}"),
                "https://example.com",
                Utc.with_ymd_and_hms(2024, 6, 1 + i, 8, 0, 0).unwrap(),
                "TikTok",
                "Prova questo esercizio!",
            )
        })
        .collect();
    let options = RunOptions {
        handle: "@tt".into(),
        platforms: Some(vec!["tiktok".into(), "instagram".into()]),
        languages: Some(vec!["it".into(), "en".into()]),
    };
    let result = Pipeline::new(PipelineConfig::default())
        .run_documents(docs, &options)
        .unwrap();
    let p = &result.persona_profile;
    assert_eq!(p.influencer.platforms, vec!["tiktok", "instagram"]);
    assert_eq!(p.influencer.languages, vec!["it", "en"]);
    assert_eq!(p.last_updated.as_deref(), Some("2024-06-05"));
    assert_eq!(p.voice_style.metrics.imperative_rate, 1.0);
    assert!(p.voice_style.tone_labels.contains(&"motivational".to_string()));
}

#[test]
fn target_without_glossary_keeps_text() {
    let config = PipelineConfig {
        target_language: "fr".into(),
        ..PipelineConfig::default()
    };
    let result = Pipeline::new(config)
        .run(&fitness_batch(), &RunOptions::default())
        .unwrap();
    let ig = &result.annotated_documents[0];
    assert_eq!(ig.text_norm.as_deref(), Some(ig.text.as_str()));
    assert_eq!(result.persona_profile.influencer.languages, vec!["fr"]);
}

fn typed(id: &str, day: u32, text: &str) -> Document {
    Document::new(
        id,
        "https://example.com",
        Utc.with_ymd_and_hms(2024, 6, day, 8, 0, 0).unwrap(),
        "instagram",
        text,
    )
}

#[test]
fn typed_documents_with_shared_id_are_rejected() {
    let docs: Vec<Document> = (1..=6).map(|d| typed("same", d, "Credo nella corsa.")).collect();
    let err = Pipeline::new(PipelineConfig::default())
        .run_documents(docs, &RunOptions::default())
        .unwrap_err();
    assert!(matches!(err, IngestError::DuplicateId(id) if id == "same"));
}

#[test]
fn stale_cluster_ids_are_cleared() {
    let mut docs: Vec<Document> = (0..200)
        .map(|i| typed(&format!("d{i}"), 1 + i % 28, "Dieta sana ogni giorno"))
        .collect();
    let mut lone = typed("lone", 2, "Viaggio solitario");
    lone.cluster_id = Some(99);
    docs.push(lone);

    let result = Pipeline::new(PipelineConfig::default())
        .run_documents(docs, &RunOptions::default())
        .unwrap();
    assert_eq!(result.persona_profile.topics_distribution.len(), 1);
    let lone = result.annotated_documents.iter().find(|d| d.id == "lone").unwrap();
    assert_eq!(lone.cluster_id, None);
    assert!(result.persona_profile.data_quality.evolution_score == 0.0);
}
