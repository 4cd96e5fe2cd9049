use crate::core::fitness::Scope;
use crate::core::fitness::cation_anion::DEFAULT_CONTACT_DISTANCE;
use crate::core::fitness::target::{DEFAULT_TARGET, DEFAULT_TOLERANCE};
use crate::core::fitness::threshold::DEFAULT_THRESHOLD;
use crate::core::samplers::DEFAULT_NUM_SAMPLES;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_ATTEMPTS: usize = 100;
pub const DEFAULT_MAX_SUBDOCK: usize = 1;
pub const DEFAULT_TEMPERATURE: f64 = 0.1;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },

    #[error("Unknown {kind} '{name}'. Expected one of: {expected}")]
    UnknownName {
        kind: &'static str,
        name: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessKind {
    MinDistance,
    MeanDistance,
    SumDistance,
    MinDistanceTarget,
    MeanDistanceTarget,
    MaxDistanceTarget,
    MinCatanDistance,
}

impl FitnessKind {
    pub const NAMES: &'static str = "min_distance, mean_distance, sum_distance, \
        min_distance_target, mean_distance_target, max_distance_target, min_catan_distance";

    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessKind::MinDistance => "min_distance",
            FitnessKind::MeanDistance => "mean_distance",
            FitnessKind::SumDistance => "sum_distance",
            FitnessKind::MinDistanceTarget => "min_distance_target",
            FitnessKind::MeanDistanceTarget => "mean_distance_target",
            FitnessKind::MaxDistanceTarget => "max_distance_target",
            FitnessKind::MinCatanDistance => "min_catan_distance",
        }
    }
}

impl fmt::Display for FitnessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FitnessKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min_distance" => Ok(FitnessKind::MinDistance),
            "mean_distance" => Ok(FitnessKind::MeanDistance),
            "sum_distance" => Ok(FitnessKind::SumDistance),
            "min_distance_target" => Ok(FitnessKind::MinDistanceTarget),
            "mean_distance_target" => Ok(FitnessKind::MeanDistanceTarget),
            "max_distance_target" => Ok(FitnessKind::MaxDistanceTarget),
            "min_catan_distance" => Ok(FitnessKind::MinCatanDistance),
            other => Err(ConfigError::UnknownName {
                kind: "fitness",
                name: other.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

/// How the cation-anion fitness finds its charged sites.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum ChargeSiteSelection {
    #[default]
    BondValence,
    Explicit {
        cation: usize,
        anion_groups: Vec<Vec<usize>>,
    },
}

/// One weighted term of the docking fitness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitnessTerm {
    pub kind: FitnessKind,
    pub threshold: f64,
    pub scope: Scope,
    /// Collapse the term to `{0, -inf}` before weighting.
    pub step: bool,
    pub target: f64,
    pub tolerance: f64,
    pub weight: f64,
    pub contact_distance: f64,
    pub charge_sites: ChargeSiteSelection,
}

#[derive(Default)]
pub struct FitnessTermBuilder {
    kind: Option<FitnessKind>,
    threshold: Option<f64>,
    scope: Option<Scope>,
    step: Option<bool>,
    target: Option<f64>,
    tolerance: Option<f64>,
    weight: Option<f64>,
    contact_distance: Option<f64>,
    charge_sites: Option<ChargeSiteSelection>,
}

impl FitnessTermBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: FitnessKind) -> Self {
        self.kind = Some(kind);
        self
    }
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }
    pub fn step(mut self, step: bool) -> Self {
        self.step = Some(step);
        self
    }
    pub fn target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
    pub fn contact_distance(mut self, distance: f64) -> Self {
        self.contact_distance = Some(distance);
        self
    }
    pub fn charge_sites(mut self, selection: ChargeSiteSelection) -> Self {
        self.charge_sites = Some(selection);
        self
    }

    pub fn build(self) -> Result<FitnessTerm, ConfigError> {
        let term = FitnessTerm {
            kind: self.kind.ok_or(ConfigError::MissingParameter("kind"))?,
            threshold: self.threshold.unwrap_or(DEFAULT_THRESHOLD),
            scope: self.scope.unwrap_or_default(),
            step: self.step.unwrap_or(false),
            target: self.target.unwrap_or(DEFAULT_TARGET),
            tolerance: self.tolerance.unwrap_or(DEFAULT_TOLERANCE),
            weight: self.weight.unwrap_or(1.0),
            contact_distance: self.contact_distance.unwrap_or(DEFAULT_CONTACT_DISTANCE),
            charge_sites: self.charge_sites.unwrap_or_default(),
        };

        for (parameter, value) in [
            ("threshold", term.threshold),
            ("target", term.target),
            ("weight", term.weight),
            ("contact_distance", term.contact_distance),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    parameter,
                    reason: format!("expected a finite number, got {value}"),
                });
            }
        }
        if !(term.tolerance > 0.0 && term.tolerance.is_finite()) {
            return Err(ConfigError::InvalidValue {
                parameter: "tolerance",
                reason: format!("must be positive, got {}", term.tolerance),
            });
        }
        Ok(term)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SamplerConfig {
    Origin,
    Random { num_samples: usize },
    Points { points: Vec<[f64; 3]> },
}

impl SamplerConfig {
    pub const NAMES: &'static str = "origin, random, points";

    /// Resolves a sampler by name. `num_samples` and `points` are only read by the
    /// samplers that need them.
    pub fn from_name(
        name: &str,
        num_samples: Option<usize>,
        points: Vec<[f64; 3]>,
    ) -> Result<Self, ConfigError> {
        match name {
            "origin" => Ok(SamplerConfig::Origin),
            "random" => {
                let num_samples = num_samples.unwrap_or(DEFAULT_NUM_SAMPLES);
                if num_samples == 0 {
                    return Err(ConfigError::InvalidValue {
                        parameter: "num_samples",
                        reason: "must be at least 1".to_string(),
                    });
                }
                Ok(SamplerConfig::Random { num_samples })
            }
            "points" => {
                if points.is_empty() {
                    return Err(ConfigError::MissingParameter("points"));
                }
                Ok(SamplerConfig::Points { points })
            }
            other => Err(ConfigError::UnknownName {
                kind: "sampler",
                name: other.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockingStrategy {
    /// All rotations of one anchor point in a single batch.
    #[default]
    Batch,
    /// One candidate at a time.
    Serial,
    /// Stops at the first candidate with non-negative fitness.
    Success,
}

impl DockingStrategy {
    pub const NAMES: &'static str = "batch, serial, success";
}

impl fmt::Display for DockingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DockingStrategy::Batch => "batch",
            DockingStrategy::Serial => "serial",
            DockingStrategy::Success => "success",
        };
        f.write_str(name)
    }
}

impl FromStr for DockingStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batch" => Ok(DockingStrategy::Batch),
            "serial" => Ok(DockingStrategy::Serial),
            "success" => Ok(DockingStrategy::Success),
            other => Err(ConfigError::UnknownName {
                kind: "docking strategy",
                name: other.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdockConfig {
    /// Number of top candidates of a round that seed the next round.
    pub max_subdock: usize,
    /// Maximum loading level; unbounded when `None`.
    pub max_loading: Option<usize>,
}

impl Default for SubdockConfig {
    fn default() -> Self {
        Self {
            max_subdock: DEFAULT_MAX_SUBDOCK,
            max_loading: None,
        }
    }
}

impl SubdockConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_subdock == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "max_subdock",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_loading == Some(0) {
            return Err(ConfigError::InvalidValue {
                parameter: "max_loading",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DockingConfig {
    pub strategy: DockingStrategy,
    pub sampler: SamplerConfig,
    pub fitness: Vec<FitnessTerm>,
    pub attempts: usize,
    pub subdock: Option<SubdockConfig>,
    pub seed: Option<u64>,
}

#[derive(Default)]
pub struct DockingConfigBuilder {
    strategy: Option<DockingStrategy>,
    sampler: Option<SamplerConfig>,
    fitness: Vec<FitnessTerm>,
    attempts: Option<usize>,
    subdock: Option<SubdockConfig>,
    seed: Option<u64>,
}

impl DockingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, strategy: DockingStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
    pub fn sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = Some(sampler);
        self
    }
    pub fn fitness_term(mut self, term: FitnessTerm) -> Self {
        self.fitness.push(term);
        self
    }
    pub fn fitness_terms(mut self, terms: Vec<FitnessTerm>) -> Self {
        self.fitness.extend(terms);
        self
    }
    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = Some(attempts);
        self
    }
    pub fn subdock(mut self, subdock: Option<SubdockConfig>) -> Self {
        self.subdock = subdock;
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<DockingConfig, ConfigError> {
        if self.fitness.is_empty() {
            return Err(ConfigError::MissingParameter("fitness"));
        }
        let attempts = self
            .attempts
            .ok_or(ConfigError::MissingParameter("attempts"))?;
        validate_attempts(attempts)?;
        if let Some(subdock) = &self.subdock {
            subdock.validate()?;
        }
        Ok(DockingConfig {
            strategy: self
                .strategy
                .ok_or(ConfigError::MissingParameter("strategy"))?,
            sampler: self
                .sampler
                .ok_or(ConfigError::MissingParameter("sampler"))?,
            fitness: self.fitness,
            attempts,
            subdock: self.subdock,
            seed: self.seed,
        })
    }
}

/// Temperature schedule of the Monte Carlo docker, relative to its initial temperature.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TemperatureSchedule {
    #[default]
    Constant,
    /// Linear ramp to `final_temperature` over the trial budget.
    Linear { final_temperature: f64 },
    /// `T(step) = T0 * decay^step`.
    Exponential { decay: f64 },
}

impl TemperatureSchedule {
    pub const NAMES: &'static str = "constant, linear, exponential";

    /// Resolves a schedule by name. `final_temperature` is required by `linear` and
    /// `decay` by `exponential`.
    pub fn from_name(
        name: &str,
        final_temperature: Option<f64>,
        decay: Option<f64>,
    ) -> Result<Self, ConfigError> {
        match name {
            "constant" => Ok(TemperatureSchedule::Constant),
            "linear" => {
                let final_temperature =
                    final_temperature.ok_or(ConfigError::MissingParameter("final_temperature"))?;
                if !(final_temperature >= 0.0 && final_temperature.is_finite()) {
                    return Err(ConfigError::InvalidValue {
                        parameter: "final_temperature",
                        reason: format!("must be a non-negative number, got {final_temperature}"),
                    });
                }
                Ok(TemperatureSchedule::Linear { final_temperature })
            }
            "exponential" => {
                let decay = decay.ok_or(ConfigError::MissingParameter("decay"))?;
                if !(decay > 0.0 && decay <= 1.0) {
                    return Err(ConfigError::InvalidValue {
                        parameter: "decay",
                        reason: format!("must lie in (0, 1], got {decay}"),
                    });
                }
                Ok(TemperatureSchedule::Exponential { decay })
            }
            other => Err(ConfigError::UnknownName {
                kind: "temperature schedule",
                name: other.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloConfig {
    pub fitness: Vec<FitnessTerm>,
    pub temperature: f64,
    pub schedule: TemperatureSchedule,
    /// Metropolis trials per docking call.
    pub attempts: usize,
    /// Stop at the first trial whose fitness is non-negative.
    pub early_exit: bool,
    pub subdock: Option<SubdockConfig>,
    pub seed: Option<u64>,
}

#[derive(Default)]
pub struct MonteCarloConfigBuilder {
    fitness: Vec<FitnessTerm>,
    temperature: Option<f64>,
    schedule: Option<TemperatureSchedule>,
    attempts: Option<usize>,
    early_exit: Option<bool>,
    subdock: Option<SubdockConfig>,
    seed: Option<u64>,
}

impl MonteCarloConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fitness_term(mut self, term: FitnessTerm) -> Self {
        self.fitness.push(term);
        self
    }
    pub fn fitness_terms(mut self, terms: Vec<FitnessTerm>) -> Self {
        self.fitness.extend(terms);
        self
    }
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
    pub fn schedule(mut self, schedule: TemperatureSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }
    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = Some(attempts);
        self
    }
    pub fn early_exit(mut self, early_exit: bool) -> Self {
        self.early_exit = Some(early_exit);
        self
    }
    pub fn subdock(mut self, subdock: Option<SubdockConfig>) -> Self {
        self.subdock = subdock;
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<MonteCarloConfig, ConfigError> {
        if self.fitness.is_empty() {
            return Err(ConfigError::MissingParameter("fitness"));
        }
        let attempts = self
            .attempts
            .ok_or(ConfigError::MissingParameter("attempts"))?;
        validate_attempts(attempts)?;
        let temperature = self.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !(temperature >= 0.0 && temperature.is_finite()) {
            return Err(ConfigError::InvalidValue {
                parameter: "temperature",
                reason: format!("must be a non-negative number, got {temperature}"),
            });
        }
        if let Some(subdock) = &self.subdock {
            subdock.validate()?;
        }
        Ok(MonteCarloConfig {
            fitness: self.fitness,
            temperature,
            schedule: self.schedule.unwrap_or_default(),
            attempts,
            early_exit: self.early_exit.unwrap_or(false),
            subdock: self.subdock,
            seed: self.seed,
        })
    }
}

fn validate_attempts(attempts: usize) -> Result<(), ConfigError> {
    if attempts == 0 {
        return Err(ConfigError::InvalidValue {
            parameter: "attempts",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
