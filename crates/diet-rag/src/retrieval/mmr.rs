//! Maximal Marginal Relevance selection
//!
//! MMR = λ × sim(query, doc) − (1 − λ) × max(sim(doc, selected))
//!
//! λ = 1.0 is plain relevance order, λ = 0.0 is pure diversity.

use crate::providers::Candidate;
use crate::types::RetrievedDocument;

/// Cosine similarity; 0.0 when either vector has zero magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Greedily pick up to `k` candidates, returned in selection order
///
/// Candidates without a stored vector cannot be compared, so if any is
/// missing one the first `k` candidates are returned in index order.
pub fn mmr_select(
    query: &[f32],
    candidates: Vec<Candidate>,
    k: usize,
    lambda: f32,
) -> Vec<RetrievedDocument> {
    if candidates.iter().any(|c| c.embedding.is_none()) {
        tracing::warn!("MMR candidates lack stored vectors; using similarity order");
        return candidates.into_iter().take(k).map(|c| c.document).collect();
    }

    let mut remaining: Vec<(Candidate, Vec<f32>)> = candidates
        .into_iter()
        .filter_map(|mut c| c.embedding.take().map(|e| (c, e)))
        .collect();
    let mut selected: Vec<(Candidate, Vec<f32>)> = Vec::with_capacity(k.min(remaining.len()));

    while selected.len() < k && !remaining.is_empty() {
        let mut best_idx = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (idx, (_, vector)) in remaining.iter().enumerate() {
            let relevance = cosine_similarity(query, vector);
            let redundancy = selected
                .iter()
                .map(|(_, chosen)| cosine_similarity(vector, chosen))
                .fold(f32::NEG_INFINITY, f32::max);
            let redundancy = if selected.is_empty() { 0.0 } else { redundancy };
            let score = lambda * relevance - (1.0 - lambda) * redundancy;

            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }

        selected.push(remaining.remove(best_idx));
    }

    selected.into_iter().map(|(c, _)| c.document).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, vector: Option<Vec<f32>>) -> Candidate {
        Candidate {
            document: RetrievedDocument::with_source(name, format!("{}.pdf", name)),
            embedding: vector,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_pure_relevance_keeps_best_first() {
        let candidates = vec![
            candidate("far", Some(vec![0.0, 1.0])),
            candidate("near", Some(vec![1.0, 0.0])),
        ];
        let picked = mmr_select(&[1.0, 0.0], candidates, 1, 1.0);
        assert_eq!(picked[0].content, "near");
    }

    #[test]
    fn test_diversity_skips_duplicate() {
        let candidates = vec![
            candidate("a", Some(vec![1.0, 0.0])),
            candidate("a-copy", Some(vec![1.0, 0.01])),
            candidate("b", Some(vec![0.8, 0.6])),
        ];
        let picked = mmr_select(&[1.0, 0.0], candidates, 2, 0.3);
        let names: Vec<&str> = picked.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_never_exceeds_k() {
        let candidates = (0..5)
            .map(|i| candidate(&format!("d{}", i), Some(vec![1.0, i as f32])))
            .collect();
        assert_eq!(mmr_select(&[1.0, 0.0], candidates, 3, 0.5).len(), 3);
    }

    #[test]
    fn test_missing_vectors_fall_back_to_index_order() {
        let candidates = vec![
            candidate("first", None),
            candidate("second", Some(vec![1.0, 0.0])),
            candidate("third", None),
        ];
        let picked = mmr_select(&[1.0, 0.0], candidates, 2, 0.5);
        let names: Vec<&str> = picked.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
