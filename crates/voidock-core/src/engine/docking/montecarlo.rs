use super::{Docker, ranking};
use crate::core::fitness::SharedFitness;
use crate::core::models::body::Body;
use crate::core::models::complex::Complex;
use crate::core::models::traits::Perturbable;
use crate::core::utils::geometry;
use crate::engine::error::EngineError;
use crate::engine::mcmc::actions::ActionRegistry;
use crate::engine::mcmc::chain::{MarkovChain, seeded_rng};
use crate::engine::mcmc::metropolis::Metropolis;
use crate::engine::mcmc::temperature::TemperatureProfile;
use crate::engine::state::Candidate;
use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, instrument};

/// Docks by refining a single pose with Metropolis moves of the guest.
///
/// Each docking call starts from the guest placed at a uniformly random point of the
/// host cell and applies `attempts` trials of the `translate` and `rotate` actions.
/// Accepted moves keep the guest centroid inside the cell; returned poses have every
/// guest site mapped into the cell.
pub struct MonteCarloDocker {
    host: Body,
    guest: Body,
    temperature: f64,
    early_exit: bool,
    engine: Metropolis<Complex>,
}

impl MonteCarloDocker {
    pub fn new(
        host: Body,
        guest: Body,
        fitness: SharedFitness<Complex>,
        temperature: f64,
        seed: Option<u64>,
    ) -> Self {
        Self {
            host,
            guest: guest.centered(),
            temperature,
            early_exit: false,
            engine: Metropolis::new(Self::actions(), fitness, temperature, seed),
        }
    }

    pub fn with_profile(mut self, profile: TemperatureProfile) -> Self {
        self.engine = self.engine.with_profile(profile);
        self
    }

    /// Stop at the first trial that reaches a non-negative fitness.
    pub fn with_early_exit(mut self, early_exit: bool) -> Self {
        self.early_exit = early_exit;
        self
    }

    pub fn actions() -> ActionRegistry<Complex> {
        ActionRegistry::new()
            .with("translate", |mut cpx: Complex, rng: &mut StdRng| {
                let displacement = geometry::random_displacement(rng);
                cpx.translate_guest(&displacement);
                cpx
            })
            .with("rotate", |mut cpx: Complex, rng: &mut StdRng| {
                let (axis, angle) = geometry::random_axis_angle(rng);
                cpx.rotate_guest(&axis, angle, None);
                cpx
            })
    }

    pub fn engine(&self) -> &Metropolis<Complex> {
        &self.engine
    }

    fn initial_complex(&self) -> Complex {
        Complex::new(self.host.clone(), self.guest.clone())
    }

    fn dock_until_success(&mut self, attempts: usize) -> Result<Vec<Candidate>, EngineError> {
        let mut cpx = self.initial_complex();
        self.on_start(&mut cpx);
        for trial in 0..attempts {
            self.on_trial_start(trial);
            cpx = self.trial(cpx)?;
            self.on_trial_end(trial);

            let score = self.engine.fitness().evaluate(&cpx);
            if score >= 0.0 {
                debug!(attempts = trial + 1, "Found a valid pose.");
                self.on_end(&cpx);
                cpx.wrap_guest_sites_into_cell();
                return Ok(vec![Candidate::new(score, cpx)]);
            }
        }
        self.on_end(&cpx);
        debug!(attempts, "No valid pose within the trial budget.");
        Ok(Vec::new())
    }
}

impl MarkovChain<Complex> for MonteCarloDocker {
    fn registry(&self) -> &ActionRegistry<Complex> {
        self.engine.registry()
    }

    fn rng_mut(&mut self) -> &mut StdRng {
        self.engine.rng_mut()
    }

    fn accept(&mut self, candidate: &Complex, current: &Complex) -> bool {
        self.engine.accept(candidate, current)
    }

    fn trial(&mut self, state: Complex) -> Result<Complex, EngineError> {
        let mut candidate = self.propose(&state)?;
        if self.accept(&candidate, &state) {
            candidate.wrap_guest_into_cell();
            Ok(candidate)
        } else {
            Ok(state)
        }
    }

    /// Moves the guest to a random point of the host cell and restarts the schedule.
    fn on_start(&mut self, state: &mut Complex) {
        self.engine.update_temperature(0);
        let frac = geometry::random_fractional(self.engine.rng_mut());
        let target = geometry::fractional_to_cartesian(&frac, state.host().lattice());
        state.translate_guest(&target.coords);
    }

    fn on_trial_end(&mut self, step: usize) {
        self.engine.on_trial_end(step);
    }
}

impl Docker for MonteCarloDocker {
    #[instrument(skip_all, name = "monte_carlo_dock")]
    fn dock(&mut self, attempts: usize) -> Result<Vec<Candidate>, EngineError> {
        if self.early_exit {
            return self.dock_until_success(attempts);
        }
        let start = self.initial_complex();
        let mut cpx = self.run(start, attempts)?;
        cpx.wrap_guest_sites_into_cell();
        Ok(ranking::rank(self.engine.fitness().as_ref(), vec![cpx]))
    }

    fn spawn(&mut self, host: Body) -> Box<dyn Docker> {
        let rng = seeded_rng(Some(self.engine.rng_mut().r#gen()));
        let engine = Metropolis::new(
            self.engine.registry().clone(),
            self.engine.fitness().clone(),
            self.temperature,
            None,
        )
        .with_profile(self.engine.profile().clone())
        .with_rng(rng);
        Box::new(MonteCarloDocker {
            host,
            guest: self.guest.clone(),
            temperature: self.temperature,
            early_exit: self.early_exit,
            engine,
        })
    }

    fn fitness(&self) -> &SharedFitness<Complex> {
        self.engine.fitness()
    }

    fn host(&self) -> &Body {
        &self.host
    }
}
