use crate::core::fitness::Fitness;
use crate::core::models::complex::Complex;
use crate::engine::state::Candidate;
use std::cmp::Ordering;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Scores every complex once, drops the rejected ones and sorts the rest by
/// descending fitness. Equal scores keep their input order.
pub fn rank(fitness: &dyn Fitness<Complex>, complexes: Vec<Complex>) -> Vec<Candidate> {
    #[cfg(not(feature = "parallel"))]
    let iterator = complexes.into_iter();

    #[cfg(feature = "parallel")]
    let iterator = complexes.into_par_iter();

    let scored: Vec<Candidate> = iterator
        .map(|complex| Candidate::new(fitness.evaluate(&complex), complex))
        .collect();
    rerank(scored)
}

/// Ranks candidates by their cached scores.
pub fn rerank(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut accepted: Vec<Candidate> = candidates
        .into_iter()
        .filter(Candidate::is_accepted)
        .collect();
    accepted.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    accepted
}
