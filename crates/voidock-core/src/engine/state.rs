use crate::core::models::complex::Complex;

/// A docked complex together with the fitness it was ranked by.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub score: f64,
    pub complex: Complex,
}

impl Candidate {
    pub fn new(score: f64, complex: Complex) -> Self {
        Self { score, complex }
    }

    /// Accepted candidates have a non-negative score.
    pub fn is_accepted(&self) -> bool {
        self.score >= 0.0
    }
}
