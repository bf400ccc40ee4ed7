pub mod batch;
pub mod policy;
pub mod text_similarity;

pub use batch::{grade_request, GradeRequest};
pub use policy::GradingPolicy;
pub use text_similarity::TextSimilarityCalculator;

/// Rounds a points or score value to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(6.666), 6.67);
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(0.0), 0.0);
    }
}
