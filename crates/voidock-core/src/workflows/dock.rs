use super::setup::{build_fitness, build_sampler};
use super::{DockingResult, validate_bodies};
use crate::core::models::body::Body;
use crate::engine::config::DockingConfig;
use crate::engine::docking::subdock::{LoadingHistory, Subdocker};
use crate::engine::docking::{Docker, PointDocker, strategy_for};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

#[instrument(skip_all, name = "docking_workflow")]
pub fn run(
    host: &Body,
    guest: &Body,
    config: &DockingConfig,
    reporter: &ProgressReporter,
) -> Result<DockingResult, EngineError> {
    // === Phase 0: Preparation ===
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    validate_bodies(host, guest)?;
    let fitness = build_fitness(&config.fitness)?;
    let sampler = build_sampler(&config.sampler);
    info!(
        strategy = %config.strategy,
        sampler = sampler.name(),
        terms = config.fitness.len(),
        attempts = config.attempts,
        "Prepared docking run."
    );
    let docker = PointDocker::new(
        host.clone(),
        guest.clone(),
        sampler,
        fitness,
        strategy_for(config.strategy),
        config.seed,
    );
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Docking ===
    reporter.report(Progress::PhaseStart { name: "Docking" });
    let history = match config.subdock {
        Some(subdock) => Subdocker::new(Box::new(docker), subdock).dock(config.attempts, reporter)?,
        None => dock_once(Box::new(docker), config.attempts, reporter)?,
    };
    reporter.report(Progress::PhaseFinish);

    let result = DockingResult { history };
    info!(
        loading = result.loading(),
        poses = result.candidates().len(),
        "Docking workflow complete."
    );
    Ok(result)
}

/// A single docking round reported as loading level one.
pub(crate) fn dock_once(
    mut docker: Box<dyn Docker>,
    attempts: usize,
    reporter: &ProgressReporter,
) -> Result<LoadingHistory, EngineError> {
    let ranked = docker.dock(attempts)?;
    reporter.report(Progress::LoadingLevel {
        level: 1,
        candidates: ranked.len(),
    });
    Ok(LoadingHistory::from_rounds(vec![ranked]))
}
