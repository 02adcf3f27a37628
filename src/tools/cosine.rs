//! Cosine similarity and distance between vectors.

/// cosine of the angle between v1 and v2. Returns 0. if one of them is null.
pub fn cosine_similarity(v1 : &[f64], v2 : &[f64]) -> f64 {
    assert_eq!(v1.len(), v2.len());
    let (dot, norm1, norm2) = v1.iter().zip(v2.iter()).fold((0., 0., 0.), |acc, (a, b)| {
        (acc.0 + a * b, acc.1 + a * a, acc.2 + b * b)
    });
    if norm1 <= 0. || norm2 <= 0. {
        return 0.;
    }
    dot / (norm1.sqrt() * norm2.sqrt())
} // end of cosine_similarity


/// 1. - cosine_similarity, in \[0, 2\]
pub fn cosine_distance(v1 : &[f64], v2 : &[f64]) -> f64 {
    1. - cosine_similarity(v1, v2)
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_cosine() {
        assert!((cosine_similarity(&[1., 0.], &[3., 0.]) - 1.).abs() < 1.0e-12);
        assert!(cosine_similarity(&[1., 0.], &[0., 2.]).abs() < 1.0e-12);
        assert!((cosine_distance(&[1., 1.], &[-1., -1.]) - 2.).abs() < 1.0e-12);
        assert_eq!(cosine_similarity(&[0., 0.], &[1., 2.]), 0.);
    }
} // end of mod tests
