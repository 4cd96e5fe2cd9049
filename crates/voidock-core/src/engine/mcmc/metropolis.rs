use super::actions::ActionRegistry;
use super::chain::{MarkovChain, seeded_rng};
use super::temperature::TemperatureProfile;
use crate::core::fitness::SharedFitness;
use rand::Rng;
use rand::rngs::StdRng;

/// Metropolis-Hastings engine. Fitness is maximized.
///
/// A candidate is accepted when `exp(-Δ/T)` exceeds a uniform draw, with
/// `Δ = f(current) - f(candidate)`. At `T = 0` only strict improvements are accepted.
/// The temperature is refreshed from the profile at the end of every trial.
pub struct Metropolis<S> {
    registry: ActionRegistry<S>,
    rng: StdRng,
    fitness: SharedFitness<S>,
    temperature: f64,
    profile: TemperatureProfile,
}

impl<S> Metropolis<S> {
    pub fn new(
        registry: ActionRegistry<S>,
        fitness: SharedFitness<S>,
        temperature: f64,
        seed: Option<u64>,
    ) -> Self {
        Self {
            registry,
            rng: seeded_rng(seed),
            fitness,
            temperature,
            profile: TemperatureProfile::Constant(temperature),
        }
    }

    pub fn with_profile(mut self, profile: TemperatureProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn fitness(&self) -> &SharedFitness<S> {
        &self.fitness
    }

    pub fn profile(&self) -> &TemperatureProfile {
        &self.profile
    }

    pub fn update_temperature(&mut self, step: usize) -> f64 {
        self.temperature = self.profile.at(step);
        self.temperature
    }
}

impl<S: Clone> MarkovChain<S> for Metropolis<S> {
    fn registry(&self) -> &ActionRegistry<S> {
        &self.registry
    }

    fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    fn accept(&mut self, candidate: &S, current: &S) -> bool {
        let delta = self.fitness.evaluate(current) - self.fitness.evaluate(candidate);
        if self.temperature == 0.0 {
            return delta < 0.0;
        }
        (-delta / self.temperature).exp() > self.rng.r#gen::<f64>()
    }

    fn on_trial_end(&mut self, step: usize) {
        self.update_temperature(step);
    }
}
