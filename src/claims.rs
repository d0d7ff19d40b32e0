//! Stance-bearing sentence mining per topic cluster.

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use crate::lexicon::Lexicon;
use crate::models::{Claim, Document, Stance, TopicCluster};
use crate::text::{self, content_tokens, split_sentences};

#[derive(Debug, Clone, Copy)]
pub struct ClaimParams {
    pub min_support: usize,  // 2
    pub min_coverage: f64,   // 0.15
    pub max_confidence: f64, // 0.9
}

impl Default for ClaimParams {
    fn default() -> Self {
        Self {
            min_support: 2,
            min_coverage: 0.15,
            max_confidence: 0.9,
        }
    }
}

/// One unique candidate sentence (keyed by its lowercase form) and what backs it.
#[derive(Debug, Clone)]
struct ClaimCandidate {
    text: String,
    support_docs: BTreeSet<String>,
    pro: usize,
    contra: usize,
}

impl ClaimCandidate {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            support_docs: BTreeSet::new(),
            pro: 0,
            contra: 0,
        }
    }

    fn stance(&self) -> Stance {
        use std::cmp::Ordering;
        match self.pro.cmp(&self.contra) {
            Ordering::Greater => Stance::Pro,
            Ordering::Less => Stance::Contra,
            Ordering::Equal => Stance::Neutro,
        }
    }
}

pub fn paraphrase(sentence: &str, stance: Stance) -> String {
    let verb = match stance {
        Stance::Pro => "claim",
        Stance::Contra => "warn",
        Stance::Neutro => "observe",
    };
    format!("The authors {} that {}", verb, sentence.trim())
}

fn extract_candidates(members: &[&Document], lexicon: &Lexicon) -> Vec<ClaimCandidate> {
    let mut order: Vec<ClaimCandidate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for doc in members {
        for sentence in split_sentences(&doc.text) {
            if !lexicon.claim_triggers.is_match(sentence) {
                continue;
            }
            let key = sentence.to_lowercase();
            let slot = *index.entry(key).or_insert_with(|| {
                order.push(ClaimCandidate::new(sentence));
                order.len() - 1
            });
            let entry = &mut order[slot];
            entry.support_docs.insert(doc.id.clone());

            let tokens = content_tokens(sentence, &lexicon.stopwords);
            if tokens.iter().any(|t| lexicon.pro_keywords.contains(t)) {
                entry.pro += 1;
            }
            if tokens.iter().any(|t| lexicon.con_keywords.contains(t)) {
                entry.contra += 1;
            }
        }
    }
    order
}

/// Mine claims cluster by cluster, in cluster order.
pub fn extract_claims(
    clusters: &[TopicCluster],
    documents: &[Document],
    lexicon: &Lexicon,
    params: &ClaimParams,
) -> Vec<Claim> {
    let mut by_id: HashMap<u32, Vec<&Document>> = HashMap::new();
    for doc in documents {
        if let Some(cid) = doc.cluster_id {
            by_id.entry(cid).or_default().push(doc);
        }
    }

    let mut claims = Vec::new();
    for cluster in clusters {
        let Some(members) = by_id.get(&cluster.id) else {
            continue;
        };
        let candidates = extract_candidates(members, lexicon);
        debug!(
            "Claim candidates - cluster={}, topic={}, candidates={}",
            cluster.id,
            cluster.topic(),
            candidates.len()
        );

        for cand in candidates {
            let support = cand.support_docs.len();
            let coverage = support as f64 / members.len().max(1) as f64;
            if support < params.min_support && coverage < params.min_coverage {
                continue;
            }
            let stance = cand.stance();
            let confidence = f64::min(params.max_confidence, 0.5 + 0.1 * support as f64 + 0.3 * coverage);
            claims.push(Claim {
                topic: cluster.topic().to_string(),
                text: paraphrase(&cand.text, stance),
                stance,
                confidence: text::round2(confidence),
                coverage: text::round2(coverage),
                evidence_ids: cand.support_docs.into_iter().collect(),
                controversial: cand.pro > 0 && cand.contra > 0,
            });
        }
    }

    info!(
        "Claim extraction completed - clusters={}, claims={}",
        clusters.len(),
        claims.len()
    );
    claims
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn clustered(id: &str, cid: u32, text: &str) -> Document {
        let mut d = Document::new(id, "https://example.com", Utc::now(), "youtube", text);
        d.cluster_id = Some(cid);
        d
    }

    fn cluster(id: u32, topic: &str, size: usize) -> TopicCluster {
        TopicCluster {
            id,
            size,
            top_terms: vec![topic.to_string()],
            exemplar_ids: vec![],
            coverage: 1.0,
        }
    }

    #[test]
    fn repeated_advice_becomes_one_pro_claim() {
        let lex = Lexicon::default();
        let docs: Vec<Document> = (0..5)
            .map(|i| clustered(&format!("yt_{i}"), 1, "Consiglio una dieta bilanciata. Ciao a tutti!"))
            .collect();
        let claims = extract_claims(&[cluster(1, "consiglio", 5)], &docs, &lex, &ClaimParams::default());
        assert_eq!(claims.len(), 1);
        let c = &claims[0];
        assert_eq!(c.stance, Stance::Pro);
        assert_eq!(c.confidence, 0.9);
        assert_eq!(c.coverage, 1.0);
        assert_eq!(c.evidence_ids, vec!["yt_0", "yt_1", "yt_2", "yt_3", "yt_4"]);
        assert!(c.text.starts_with("The authors claim that Consiglio"));
        assert!(!c.controversial);
        assert_eq!(c.topic, "consiglio");
    }

    #[test]
    fn dedup_is_case_insensitive_and_mixed_hits_are_controversial() {
        let lex = Lexicon::default();
        let docs = vec![
            clustered("a", 1, "Evito il glutine ma adoro il pane!"),
            clustered("b", 1, "evito il glutine ma adoro il pane!"),
            clustered("c", 1, "Oggi palestra."),
        ];
        let claims = extract_claims(&[cluster(1, "evito", 3)], &docs, &lex, &ClaimParams::default());
        assert_eq!(claims.len(), 1);
        let c = &claims[0];
        assert!(c.controversial);
        assert_eq!(c.stance, Stance::Neutro);
        assert!(c.text.starts_with("The authors observe that Evito"));
        assert_eq!(c.coverage, 0.67);
    }

    #[test]
    fn weak_candidates_are_dropped() {
        let lex = Lexicon::default();
        let mut docs: Vec<Document> = (0..9).map(|i| clustered(&format!("n{i}"), 1, "Solo foto.")).collect();
        docs.push(clustered("x", 1, "Credo nei miracoli."));
        let claims = extract_claims(&[cluster(1, "solo", 10)], &docs, &lex, &ClaimParams::default());
        assert!(claims.is_empty());
    }

    #[test]
    fn paraphrase_templates() {
        assert_eq!(paraphrase(" non fare cardio ", Stance::Contra), "The authors warn that non fare cardio");
    }
}
