use crate::models::ServiceMatch;

/// Sort services by similarity (descending).
///
/// The sort is stable, so rows with equal similarity keep the order the store
/// returned them in. NaN similarities sort last.
pub fn rank_by_similarity(matches: &mut [ServiceMatch]) {
    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or_else(|| a.similarity.is_nan().cmp(&b.similarity.is_nan()))
    });
}
