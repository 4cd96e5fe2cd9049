use super::dock::dock_once;
use super::setup::{build_fitness, build_profile};
use super::{DockingResult, validate_bodies};
use crate::core::models::body::Body;
use crate::engine::config::MonteCarloConfig;
use crate::engine::docking::montecarlo::MonteCarloDocker;
use crate::engine::docking::subdock::Subdocker;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

#[instrument(skip_all, name = "monte_carlo_workflow")]
pub fn run(
    host: &Body,
    guest: &Body,
    config: &MonteCarloConfig,
    reporter: &ProgressReporter,
) -> Result<DockingResult, EngineError> {
    // === Phase 0: Preparation ===
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    validate_bodies(host, guest)?;
    let fitness = build_fitness(&config.fitness)?;
    let profile = build_profile(&config.schedule, config.temperature, config.attempts);
    info!(
        temperature = config.temperature,
        ?profile,
        trials = config.attempts,
        early_exit = config.early_exit,
        "Prepared Monte Carlo run."
    );
    let docker = MonteCarloDocker::new(
        host.clone(),
        guest.clone(),
        fitness,
        config.temperature,
        config.seed,
    )
    .with_profile(profile)
    .with_early_exit(config.early_exit);
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Monte Carlo docking ===
    reporter.report(Progress::PhaseStart {
        name: "Monte Carlo docking",
    });
    let history = match config.subdock {
        Some(subdock) => Subdocker::new(Box::new(docker), subdock).dock(config.attempts, reporter)?,
        None => dock_once(Box::new(docker), config.attempts, reporter)?,
    };
    reporter.report(Progress::PhaseFinish);

    let result = DockingResult { history };
    info!(
        loading = result.loading(),
        poses = result.candidates().len(),
        "Monte Carlo workflow complete."
    );
    Ok(result)
}
