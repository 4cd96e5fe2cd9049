use super::{Fitness, FitnessError, REJECTED, SharedFitness};

/// Collapses a score to a hard gate: `0` when strictly positive, [`REJECTED`] otherwise.
#[inline]
pub fn step_normalize(value: f64) -> f64 {
    if value > 0.0 { 0.0 } else { REJECTED }
}

/// Step-normalized view of another fitness.
///
/// Inside a [`CompositeFitness`] a failing gate contributes negative infinity,
/// which dominates every finite term of the weighted sum.
pub struct Stepped<S: ?Sized> {
    inner: SharedFitness<S>,
}

impl<S: ?Sized> Stepped<S> {
    pub fn new(inner: SharedFitness<S>) -> Self {
        Self { inner }
    }
}

impl<S: ?Sized> Fitness<S> for Stepped<S> {
    fn score(&self, state: &S) -> Result<f64, FitnessError> {
        Ok(step_normalize(self.inner.evaluate(state)))
    }
}

/// Weighted sum `Σ wᵢ·fᵢ(s)` over an ordered list of fitness terms.
pub struct CompositeFitness<S: ?Sized> {
    terms: Vec<SharedFitness<S>>,
    weights: Vec<f64>,
}

impl<S: ?Sized> CompositeFitness<S> {
    /// Composite with every weight set to one.
    pub fn new(terms: Vec<SharedFitness<S>>) -> Self {
        let weights = vec![1.0; terms.len()];
        Self { terms, weights }
    }

    /// Returns `None` when the number of weights does not match the number of terms.
    pub fn with_weights(terms: Vec<SharedFitness<S>>, weights: Vec<f64>) -> Option<Self> {
        (terms.len() == weights.len()).then_some(Self { terms, weights })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl<S: ?Sized> Fitness<S> for CompositeFitness<S> {
    fn score(&self, state: &S) -> Result<f64, FitnessError> {
        // Zero-weight terms are skipped so a rejected term cannot turn 0 * -inf into NaN.
        Ok(self
            .terms
            .iter()
            .zip(&self.weights)
            .filter(|&(_, &w)| w != 0.0)
            .map(|(term, &w)| w * term.evaluate(state))
            .sum())
    }
}
