//! One-shot docking and the recursive loading loop.
//!
//! A [`PointDocker`] asks its sampler for anchor points, builds candidate complexes at
//! each point with a [`PlacementStrategy`] and ranks the union. The three strategies
//! ([`batch`], [`serial`], [`success`]) only differ in how many candidates they build
//! and when they stop. Anything implementing [`Docker`] can seed a
//! [`Subdocker`](subdock::Subdocker), including the Metropolis-driven
//! [`MonteCarloDocker`](montecarlo::MonteCarloDocker).

pub mod batch;
pub mod montecarlo;
pub mod ranking;
pub mod serial;
pub mod subdock;
pub mod success;

use crate::core::fitness::{Fitness, SharedFitness};
use crate::core::models::body::Body;
use crate::core::models::complex::Complex;
use crate::core::samplers::Sampler;
use crate::engine::config::DockingStrategy;
use crate::engine::error::EngineError;
use crate::engine::mcmc::chain::seeded_rng;
use crate::engine::state::Candidate;
use nalgebra::Point3;
use rand::Rng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tracing::{debug, instrument};

pub trait Docker: Send {
    /// Docks with the given attempt budget and returns ranked, accepted candidates.
    fn dock(&mut self, attempts: usize) -> Result<Vec<Candidate>, EngineError>;

    /// Independent copy of this docker with `host` substituted. The copy gets its own
    /// generator, seeded from this one.
    fn spawn(&mut self, host: Body) -> Box<dyn Docker>;

    fn fitness(&self) -> &SharedFitness<Complex>;

    fn host(&self) -> &Body;
}

/// Everything a strategy needs to build candidates at one anchor point.
pub struct PlacementContext<'a> {
    pub host: &'a Body,
    /// Guest centred on the origin.
    pub guest: &'a Body,
    pub fitness: &'a dyn Fitness<Complex>,
}

pub trait PlacementStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn dock_at_point(
        &self,
        context: &PlacementContext<'_>,
        point: &Point3<f64>,
        attempts: usize,
        rng: &mut StdRng,
    ) -> Vec<Complex>;
}

pub fn strategy_for(kind: DockingStrategy) -> Arc<dyn PlacementStrategy> {
    match kind {
        DockingStrategy::Batch => Arc::new(batch::BatchStrategy),
        DockingStrategy::Serial => Arc::new(serial::SerialStrategy),
        DockingStrategy::Success => Arc::new(success::SuccessStrategy),
    }
}

/// Host with the anchor point moved to the origin, where the guest sits. A periodic
/// host is wrapped back into its cell.
pub(crate) fn translated_host_positions(host: &Body, point: &Point3<f64>) -> Vec<Point3<f64>> {
    let cell = host.cell();
    host.positions()
        .into_iter()
        .map(|p| {
            let shifted = Point3::from(p - point);
            match &cell {
                Some(cell) => cell.wrap(&shifted),
                None => shifted,
            }
        })
        .collect()
}

pub struct PointDocker {
    host: Body,
    guest: Body,
    sampler: Arc<dyn Sampler>,
    fitness: SharedFitness<Complex>,
    strategy: Arc<dyn PlacementStrategy>,
    rng: StdRng,
}

impl PointDocker {
    /// The guest is centred on its centroid before any rotation is applied.
    pub fn new(
        host: Body,
        guest: Body,
        sampler: Arc<dyn Sampler>,
        fitness: SharedFitness<Complex>,
        strategy: Arc<dyn PlacementStrategy>,
        seed: Option<u64>,
    ) -> Self {
        Self {
            host,
            guest: guest.centered(),
            sampler,
            fitness,
            strategy,
            rng: seeded_rng(seed),
        }
    }

    pub fn guest(&self) -> &Body {
        &self.guest
    }

    pub fn strategy(&self) -> &dyn PlacementStrategy {
        self.strategy.as_ref()
    }

    pub fn dock_at_point(&mut self, point: &Point3<f64>, attempts: usize) -> Vec<Complex> {
        let context = PlacementContext {
            host: &self.host,
            guest: &self.guest,
            fitness: self.fitness.as_ref(),
        };
        self.strategy
            .dock_at_point(&context, point, attempts, &mut self.rng)
    }

    /// Unranked candidates over every anchor point, in sampler order.
    pub fn candidates(&mut self, attempts: usize) -> Vec<Complex> {
        let points = self.sampler.get_points(&self.host, &mut self.rng);
        debug!(
            sampler = self.sampler.name(),
            strategy = self.strategy.name(),
            points = points.len(),
            "Docking at sampled anchor points."
        );
        points
            .iter()
            .flat_map(|point| self.dock_at_point(point, attempts))
            .collect()
    }
}

impl Docker for PointDocker {
    #[instrument(skip_all, name = "point_dock")]
    fn dock(&mut self, attempts: usize) -> Result<Vec<Candidate>, EngineError> {
        let complexes = self.candidates(attempts);
        let total = complexes.len();
        let ranked = ranking::rank(self.fitness.as_ref(), complexes);
        debug!(total, accepted = ranked.len(), "Ranked docking candidates.");
        Ok(ranked)
    }

    fn spawn(&mut self, host: Body) -> Box<dyn Docker> {
        Box::new(PointDocker {
            host,
            guest: self.guest.clone(),
            sampler: Arc::clone(&self.sampler),
            fitness: Arc::clone(&self.fitness),
            strategy: Arc::clone(&self.strategy),
            rng: seeded_rng(Some(self.rng.r#gen())),
        })
    }

    fn fitness(&self) -> &SharedFitness<Complex> {
        &self.fitness
    }

    fn host(&self) -> &Body {
        &self.host
    }
}
