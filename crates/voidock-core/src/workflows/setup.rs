use crate::core::fitness::SharedFitness;
use crate::core::fitness::cation_anion::{
    BondValenceLocator, CationAnionFitness, ChargeSiteLocator, ExplicitChargeSites,
};
use crate::core::fitness::composite::{CompositeFitness, Stepped};
use crate::core::fitness::target::TargetFitness;
use crate::core::fitness::threshold::ThresholdFitness;
use crate::core::models::complex::Complex;
use crate::core::samplers::{FixedPointsSampler, OriginSampler, RandomSampler, Sampler};
use crate::engine::config::{
    ChargeSiteSelection, ConfigError, FitnessKind, FitnessTerm, SamplerConfig, TemperatureSchedule,
};
use crate::engine::mcmc::temperature::TemperatureProfile;
use nalgebra::Point3;
use std::sync::Arc;

pub fn build_term(term: &FitnessTerm) -> SharedFitness<Complex> {
    let threshold = |f: ThresholdFitness| f.with_scope(term.scope);
    let target = |f: TargetFitness| f.with_scope(term.scope);

    let fitness: SharedFitness<Complex> = match term.kind {
        FitnessKind::MinDistance => Arc::new(threshold(ThresholdFitness::min_distance(term.threshold))),
        FitnessKind::MeanDistance => {
            Arc::new(threshold(ThresholdFitness::mean_distance(term.threshold)))
        }
        FitnessKind::SumDistance => {
            Arc::new(threshold(ThresholdFitness::sum_inverse_distance(term.threshold)))
        }
        FitnessKind::MinDistanceTarget => {
            Arc::new(target(TargetFitness::min_distance(term.target, term.tolerance)))
        }
        FitnessKind::MeanDistanceTarget => {
            Arc::new(target(TargetFitness::mean_distance(term.target, term.tolerance)))
        }
        FitnessKind::MaxDistanceTarget => {
            Arc::new(target(TargetFitness::max_distance(term.target, term.tolerance)))
        }
        FitnessKind::MinCatanDistance => {
            let locator: Arc<dyn ChargeSiteLocator> = match &term.charge_sites {
                ChargeSiteSelection::BondValence => Arc::new(BondValenceLocator::default()),
                ChargeSiteSelection::Explicit {
                    cation,
                    anion_groups,
                } => Arc::new(ExplicitChargeSites::new(*cation, anion_groups.clone())),
            };
            let inner = threshold(ThresholdFitness::min_distance(term.threshold));
            Arc::new(
                CationAnionFitness::new(locator, inner).with_contact_distance(term.contact_distance),
            )
        }
    };

    if term.step {
        Arc::new(Stepped::new(fitness))
    } else {
        fitness
    }
}

/// Weighted sum of the configured terms. A single unit-weight term is used as is.
pub fn build_fitness(terms: &[FitnessTerm]) -> Result<SharedFitness<Complex>, ConfigError> {
    match terms {
        [] => Err(ConfigError::MissingParameter("fitness")),
        [term] if term.weight == 1.0 => Ok(build_term(term)),
        _ => {
            let fitnesses = terms.iter().map(build_term).collect();
            let weights = terms.iter().map(|t| t.weight).collect();
            let composite = CompositeFitness::with_weights(fitnesses, weights).ok_or(
                ConfigError::InvalidValue {
                    parameter: "fitness",
                    reason: "number of weights does not match number of terms".to_string(),
                },
            )?;
            Ok(Arc::new(composite))
        }
    }
}

pub fn build_sampler(config: &SamplerConfig) -> Arc<dyn Sampler> {
    match config {
        SamplerConfig::Origin => Arc::new(OriginSampler),
        SamplerConfig::Random { num_samples } => Arc::new(RandomSampler {
            num_samples: *num_samples,
        }),
        SamplerConfig::Points { points } => Arc::new(FixedPointsSampler::new(
            points.iter().map(|&[x, y, z]| Point3::new(x, y, z)).collect(),
        )),
    }
}

pub fn build_profile(schedule: &TemperatureSchedule, temperature: f64, trials: usize) -> TemperatureProfile {
    match *schedule {
        TemperatureSchedule::Constant => TemperatureProfile::Constant(temperature),
        TemperatureSchedule::Linear { final_temperature } => TemperatureProfile::Linear {
            start: temperature,
            end: final_temperature,
            steps: trials,
        },
        TemperatureSchedule::Exponential { decay } => TemperatureProfile::Exponential {
            start: temperature,
            decay,
        },
    }
}
