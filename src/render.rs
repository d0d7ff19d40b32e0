// src/render.rs
use crate::out_models::{ContentBlueprint, PersonaProfile};

/// Human-readable companion to the two JSON artifacts.
pub fn render_persona_markdown(p: &PersonaProfile, b: &ContentBlueprint) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Persona: {}\n\n", p.influencer.handle));

    if !p.influencer.platforms.is_empty() {
        md.push_str(&format!("Platforms: {}\n", p.influencer.platforms.join(", ")));
    }
    md.push_str(&format!("Languages: {}\n", p.influencer.languages.join(", ")));
    match &p.last_updated {
        Some(d) => md.push_str(&format!("Last updated: {}\n\n", d)),
        None => md.push_str("Last updated: n/a\n\n"),
    }

    let q = &p.data_quality;
    md.push_str("## Data Quality\n");
    md.push_str(&format!("- Documents: {}\n", q.docs_total));
    md.push_str(&format!("- Mixed-language share: {:.2}\n", q.mixed_lang_docs));
    md.push_str(&format!("- Sponsored share: {:.2}\n", q.sponsored_share));
    md.push_str(&format!(
        "- Evolution: {:.2} ({:?})\n\n",
        q.evolution_score, q.evolution_flag
    ));

    if !p.core_values.is_empty() {
        md.push_str("## Core Values\n");
        for v in &p.core_values {
            md.push_str(&format!(
                "- **{}** (confidence {:.2}, coverage {:.2})\n",
                v.value, v.confidence, v.coverage
            ));
        }
        md.push('\n');
    }

    if !p.beliefs_positions.is_empty() {
        md.push_str("## Beliefs\n");
        for c in &p.beliefs_positions {
            let flag = if c.controversial { " ⚠ controversial" } else { "" };
            md.push_str(&format!("- [{}] {}{}\n", c.topic, c.text, flag));
        }
        md.push('\n');
    }

    let m = &p.voice_style.metrics;
    md.push_str("## Voice\n");
    if !p.voice_style.tone_labels.is_empty() {
        md.push_str(&format!("Tone: {}\n\n", p.voice_style.tone_labels.join(", ")));
    }
    md.push_str("| metric | value |\n|---|---|\n");
    md.push_str(&format!("| avg_sentence_len | {:.2} |\n", m.avg_sentence_len));
    md.push_str(&format!("| emoji_per_100w | {:.2} |\n", m.emoji_per_100w));
    md.push_str(&format!("| questions_rate | {:.2} |\n", m.questions_rate));
    md.push_str(&format!("| imperative_rate | {:.2} |\n", m.imperative_rate));
    md.push_str(&format!("| tt_ratio | {:.2} |\n\n", m.tt_ratio));

    if !p.topics_distribution.is_empty() {
        md.push_str("## Topics\n");
        for t in &p.topics_distribution {
            md.push_str(&format!("- {}: {:.2}\n", t.topic, t.weight));
        }
        md.push('\n');
    }

    md.push_str("## Content Blueprint\n");
    if !b.pillars.is_empty() {
        md.push_str(&format!("Pillars: {}\n\n", b.pillars.join(", ")));
    }
    for a in &b.angle_options {
        md.push_str(&format!("- {} → {} (min conf {:.2})\n", a.from_topic, a.angle, a.min_conf));
    }
    if !b.angle_options.is_empty() {
        md.push('\n');
    }
    md.push_str(&format!("Must: {}\n", b.voice_guardrails.must.join("; ")));
    md.push_str(&format!("Avoid: {}\n", b.voice_guardrails.avoid.join("; ")));
    md.push_str(&format!("Red lines: {}\n", b.compliance.red_lines.join("; ")));
    md.push_str(&format!(
        "Sponsored content: {} ({})\n",
        if b.sponsored_policy.use_ads_content { "use" } else { "skip" },
        b.sponsored_policy.reason
    ));

    md
}
