//! Cosine similarity

use crate::{Result, ThirdPlacesError};

/// Cosine similarity between `query` and a candidate embedding
///
/// Vectors of different length are rejected with
/// [`ThirdPlacesError::DimensionMismatch`]. If either vector has zero
/// magnitude the similarity is 0.
pub fn cosine_similarity(query: &[f32], candidate: &[f32], place_id: i64) -> Result<f32> {
    if query.len() != candidate.len() {
        return Err(ThirdPlacesError::dimension_mismatch(
            query.len(),
            candidate.len(),
            place_id,
        ));
    }

    let mut dot = 0.0f64;
    let mut norm_q = 0.0f64;
    let mut norm_c = 0.0f64;
    for (&q, &c) in query.iter().zip(candidate) {
        let (q, c) = (q as f64, c as f64);
        dot += q * c;
        norm_q += q * q;
        norm_c += c * c;
    }

    let denom = norm_q.sqrt() * norm_c.sqrt();
    if denom == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / denom).clamp(-1.0, 1.0) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let v = vec![0.3, -1.2, 4.0];
        let sim = cosine_similarity(&v, &v, 1).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0], 1).unwrap(), 0.0);
        let sim = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0], 1).unwrap();
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_magnitude_is_ignored() {
        let a = cosine_similarity(&[1.0, 1.0], &[2.0, 0.0], 1).unwrap();
        let b = cosine_similarity(&[10.0, 10.0], &[0.5, 0.0], 1).unwrap();
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            (vec![0.1, 0.7, -0.2], vec![0.9, -0.3, 0.4]),
            (vec![5.0, 0.0, 1.0], vec![0.0, 0.0, 3.0]),
            (vec![-2.5, 1.5, 0.25], vec![1.0, 1.0, 1.0]),
        ];
        for (a, b) in pairs {
            assert_eq!(
                cosine_similarity(&a, &b, 1).unwrap(),
                cosine_similarity(&b, &a, 1).unwrap()
            );
        }
    }

    #[test]
    fn test_zero_magnitude_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0], 1).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0], 1).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[], &[], 1).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0], 42).unwrap_err();
        match err {
            ThirdPlacesError::DimensionMismatch {
                expected,
                actual,
                place_id,
            } => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
                assert_eq!(place_id, 42);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
