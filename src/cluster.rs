use itertools::Itertools;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use crate::models::{Document, TopicCluster};
use crate::text::content_tokens;

#[derive(Debug, Clone, Copy)]
pub struct ClusterParams {
    pub min_members: usize,   // e.g., 5
    pub min_coverage: f64,    // e.g., 0.01
    pub max_top_terms: usize, // 6
    pub max_exemplars: usize, // 3
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            min_members: 5,
            min_coverage: 0.01,
            max_top_terms: 6,
            max_exemplars: 3,
        }
    }
}

/// Insertion-ordered counter: ties keep first-seen order.
#[derive(Default)]
struct TermCounter {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl TermCounter {
    fn update(&mut self, tokens: &[String]) {
        for t in tokens {
            let n = self.counts.entry(t.clone()).or_insert(0);
            if *n == 0 {
                self.order.push(t.clone());
            }
            *n += 1;
        }
    }

    fn most_common(&self, n: usize) -> Vec<String> {
        self.order
            .iter()
            .map(|t| (t, self.counts.get(t).copied().unwrap_or(0)))
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .take(n)
            .map(|(t, _)| t.clone())
            .collect()
    }
}

/// Group documents by their first content token and write cluster ids back.
///
/// Surviving clusters are sorted by size (largest first, stable) and numbered
/// from 1. Documents in discarded groups end with `cluster_id = None`, even if
/// they arrived with one set.
pub fn cluster_documents(
    documents: &mut [Document],
    stopwords: &BTreeSet<String>,
    params: &ClusterParams,
) -> Vec<TopicCluster> {
    debug!(
        "Clustering started - documents={}, min_members={}, min_coverage={}",
        documents.len(),
        params.min_members,
        params.min_coverage
    );

    for doc in documents.iter_mut() {
        doc.cluster_id = None;
    }

    let tokenised: Vec<Vec<String>> = documents
        .iter()
        .map(|d| content_tokens(d.analysis_text(), stopwords))
        .collect();

    // key -> member indices, keys in first-seen order
    let mut keys: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, tokens) in tokenised.iter().enumerate() {
        let key = tokens.first().cloned().unwrap_or_else(|| "vario".to_string());
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                keys.push(key);
                Vec::new()
            })
            .push(idx);
    }

    let total = documents.len().max(1) as f64;
    let mut provisional: Vec<(Vec<usize>, TopicCluster)> = Vec::new();
    let mut discarded = 0usize;

    for key in &keys {
        let members = &groups[key];
        let size = members.len();
        let coverage = size as f64 / total;
        if size < params.min_members && coverage < params.min_coverage {
            discarded += 1;
            continue;
        }

        let mut counter = TermCounter::default();
        for &idx in members {
            counter.update(&tokenised[idx]);
        }

        let exemplar_ids: Vec<String> = members
            .iter()
            .sorted_by(|&&a, &&b| {
                documents[b]
                    .text
                    .chars()
                    .count()
                    .cmp(&documents[a].text.chars().count())
            })
            .take(params.max_exemplars)
            .map(|&idx| documents[idx].id.clone())
            .collect();

        provisional.push((
            members.clone(),
            TopicCluster {
                id: 0,
                size,
                top_terms: counter.most_common(params.max_top_terms),
                exemplar_ids,
                coverage,
            },
        ));
    }

    provisional.sort_by(|a, b| b.1.size.cmp(&a.1.size));

    let mut clusters = Vec::with_capacity(provisional.len());
    for (n, (members, mut cluster)) in provisional.into_iter().enumerate() {
        cluster.id = n as u32 + 1;
        for idx in members {
            documents[idx].cluster_id = Some(cluster.id);
        }
        clusters.push(cluster);
    }

    if !clusters.is_empty() {
        let sizes: Vec<usize> = clusters.iter().map(|c| c.size).collect();
        let max_size = sizes.iter().max().copied().unwrap_or(0);
        let min_size = sizes.iter().min().copied().unwrap_or(0);
        let avg_size = sizes.iter().sum::<usize>() as f32 / sizes.len() as f32;
        debug!("Cluster size distribution - min={}, max={}, avg={:.1}", min_size, max_size, avg_size);
    }
    info!(
        "Clustering completed - clusters={}, discarded_groups={}",
        clusters.len(),
        discarded
    );

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn docs(texts: &[&str]) -> Vec<Document> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Document::new(format!("d{i}"), "https://example.com", Utc::now(), "instagram", *t))
            .collect()
    }

    fn stop() -> BTreeSet<String> {
        ["con", "per", "the"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn shared_leading_token_forms_one_cluster() {
        let mut batch = docs(&[
            "Allenamento gambe oggi",
            "Allenamento spalle e braccia",
            "Allenamento veloce",
            "Allenamento HIIT con amici per tutti",
            "Allenamento cardio",
            "Allenamento mattutino",
        ]);
        let clusters = cluster_documents(&mut batch, &stop(), &ClusterParams::default());
        assert_eq!(clusters.len(), 1);
        let c = &clusters[0];
        assert_eq!(c.id, 1);
        assert_eq!(c.size, 6);
        assert_eq!(c.coverage, 1.0);
        assert_eq!(c.top_terms[0], "allenamento");
        assert!(c.top_terms.len() <= 6);
        assert_eq!(c.exemplar_ids[0], "d3");
        assert_eq!(c.exemplar_ids.len(), 3);
        assert!(batch.iter().all(|d| d.cluster_id == Some(1)));
    }

    #[test]
    fn small_groups_in_large_batches_are_dropped() {
        // 200 docs share "dieta"; one doc stands alone (coverage 0.5%)
        let mut texts: Vec<String> = (0..200).map(|i| format!("dieta giorno {i}")).collect();
        texts.push("viaggio solitario".to_string());
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let mut batch = docs(&refs);
        let clusters = cluster_documents(&mut batch, &stop(), &ClusterParams::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].top_terms[0], "dieta");
        assert!(batch.last().unwrap().cluster_id.is_none());
    }

    #[test]
    fn preassigned_ids_do_not_survive_reclustering() {
        let mut texts: Vec<String> = (0..200).map(|i| format!("dieta giorno {i}")).collect();
        texts.push("viaggio solitario".to_string());
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let mut batch = docs(&refs);
        batch[0].cluster_id = Some(7);
        batch[200].cluster_id = Some(99);

        let clusters = cluster_documents(&mut batch, &stop(), &ClusterParams::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(batch[0].cluster_id, Some(1));
        assert_eq!(batch[200].cluster_id, None);
    }

    #[test]
    fn ids_follow_size_order_and_empty_text_is_vario() {
        let mut batch = docs(&["yoga uno", "", "corsa uno", "corsa due", "yoga due", "corsa tre"]);
        let clusters = cluster_documents(&mut batch, &stop(), &ClusterParams::default());
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].topic(), "corsa");
        assert_eq!(clusters[0].id, 1);
        assert_eq!(clusters[1].topic(), "yoga");
        assert_eq!(clusters[2].topic(), "vario");
        assert!(clusters[2].top_terms.is_empty());
        assert_eq!(batch[1].cluster_id, Some(3));
    }
}
