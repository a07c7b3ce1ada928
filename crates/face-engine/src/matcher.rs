//! Similarity scoring and best-candidate selection.

use uuid::Uuid;

use crate::prototype::PersonPrototype;

/// A candidate accepted by the matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceMatch {
    pub person_id: Uuid,
    /// Cosine similarity against the person's prototype, in [-1, 1].
    pub score: f32,
}

/// Cosine similarity between two raw embedding vectors, clamped to
/// [-1, 1].
///
/// Returns 0.0 when either vector has zero norm or the lengths differ;
/// never divides by zero, never panics.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    let denom = norm_a * norm_b;
    if denom == 0.0 {
        return 0.0;
    }
    // Rounding can push the raw quotient marginally past 1
    (dot / denom).clamp(-1.0, 1.0)
}

/// Select the person whose prototype scores strictly highest against the
/// candidate, accepting only when the score reaches `threshold`
/// (inclusive). Equal top scores keep the earlier prototype, and since
/// prototypes arrive in person creation order the tie-break is
/// deterministic: the earliest-created person wins.
///
/// An empty prototype list yields `None`.
pub fn best_match(
    candidate: &[f32],
    prototypes: &[PersonPrototype],
    threshold: f32,
) -> Option<FaceMatch> {
    let mut best: Option<FaceMatch> = None;
    for prototype in prototypes {
        let score = cosine_similarity(candidate, &prototype.vector);
        let is_better = match &best {
            None => true,
            Some(current) => score > current.score,
        };
        if is_better {
            best = Some(FaceMatch {
                person_id: prototype.person_id,
                score,
            });
        }
    }
    best.filter(|m| m.score >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proto(person_id: Uuid, vector: Vec<f32>) -> PersonPrototype {
        PersonPrototype {
            person_id,
            vector,
            face_count: 1,
        }
    }

    #[test]
    fn cosine_is_symmetric() {
        let a = [0.3, 0.7, -0.2];
        let b = [0.9, 0.1, 0.4];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn cosine_of_self_is_one() {
        let a = [0.6, 0.8];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        let zero = [0.0, 0.0];
        let b = [1.0, 0.0];
        assert_eq!(cosine_similarity(&zero, &b), 0.0);
        assert_eq!(cosine_similarity(&b, &zero), 0.0);
    }

    #[test]
    fn cosine_of_mismatched_lengths_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn cosine_never_leaves_unit_range() {
        // Self-similarity of awkwardly scaled vectors can round past 1.0
        // before clamping
        let vectors: Vec<Vec<f32>> = vec![
            vec![0.1; 7],
            vec![1e-7, 3e-7, 4e-7],
            vec![0.123_456_79, 0.987_654_3, 0.555_555_6],
            vec![-0.3, 0.7, -0.2, 0.6],
        ];
        for v in &vectors {
            let score = cosine_similarity(v, v);
            assert!((-1.0..=1.0).contains(&score), "score {score} out of range");
            let flipped: Vec<f32> = v.iter().map(|x| -x).collect();
            let score = cosine_similarity(v, &flipped);
            assert!((-1.0..=1.0).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn cosine_of_opposite_vectors_is_negative_one() {
        let a = [1.0, 0.0];
        let b = [-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn best_match_selects_highest_scorer() {
        let near = Uuid::new_v4();
        let far = Uuid::new_v4();
        let prototypes = vec![proto(far, vec![0.0, 1.0]), proto(near, vec![1.0, 0.1])];

        let m = best_match(&[1.0, 0.0], &prototypes, 0.5).unwrap();
        assert_eq!(m.person_id, near);
    }

    #[test]
    fn threshold_is_inclusive() {
        let person = Uuid::new_v4();
        let prototypes = vec![proto(person, vec![1.0, 0.0])];

        // cosine([1,0],[1,0]) == 1.0, threshold 1.0 must still assign
        let m = best_match(&[1.0, 0.0], &prototypes, 1.0);
        assert!(m.is_some());
    }

    #[test]
    fn below_threshold_yields_none() {
        let person = Uuid::new_v4();
        let prototypes = vec![proto(person, vec![1.0, 0.0])];

        // orthogonal: score 0.0
        assert!(best_match(&[0.0, 1.0], &prototypes, 0.7).is_none());
    }

    #[test]
    fn empty_prototypes_yield_none() {
        assert!(best_match(&[1.0, 0.0], &[], 0.0).is_none());
    }

    #[test]
    fn ties_keep_the_earlier_prototype() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        // Identical prototypes produce identical scores
        let prototypes = vec![proto(first, vec![1.0, 0.0]), proto(second, vec![1.0, 0.0])];

        let m = best_match(&[1.0, 0.0], &prototypes, 0.5).unwrap();
        assert_eq!(m.person_id, first);

        // Order reversed, the other one wins: first-seen semantics
        let reversed = vec![proto(second, vec![1.0, 0.0]), proto(first, vec![1.0, 0.0])];
        let m = best_match(&[1.0, 0.0], &reversed, 0.5).unwrap();
        assert_eq!(m.person_id, second);
    }

    #[test]
    fn mean_prototype_boundary_case() {
        // Two faces [1,0] and [0,1] average to [0.5,0.5];
        // cosine([1,0],[0.5,0.5]) = 1/sqrt(2) ~ 0.7071
        let person = Uuid::new_v4();
        let prototypes = vec![proto(person, vec![0.5, 0.5])];

        assert!(best_match(&[1.0, 0.0], &prototypes, 0.70).is_some());
        assert!(best_match(&[1.0, 0.0], &prototypes, 0.71).is_none());
    }
}
