pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine distance `1 - cos(a, b)` in `[0, 2]`, with precomputed magnitudes.
///
/// A zero-magnitude side has no direction; it is treated as orthogonal to
/// everything (distance 1.0).
pub fn cosine_distance(a: &[f32], b: &[f32], mag_a: f32, mag_b: f32) -> f32 {
    if mag_a == 0.0 || mag_b == 0.0 {
        return 1.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let similarity = (dot / (mag_a * mag_b)).clamp(-1.0, 1.0);
    1.0 - similarity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(a: &[f32], b: &[f32]) -> f32 {
        cosine_distance(a, b, magnitude(a), magnitude(b))
    }

    #[test]
    fn identical_direction_is_zero() {
        assert!(dist(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_is_one() {
        assert!((dist(&[1.0, 0.0], &[0.0, 5.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn opposite_is_two() {
        assert!((dist(&[1.0, 1.0], &[-1.0, -1.0]) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_is_orthogonal() {
        assert_eq!(dist(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(magnitude(&[3.0, 4.0]), 5.0);
    }
}
