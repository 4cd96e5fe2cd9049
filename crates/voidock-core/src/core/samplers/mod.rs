//! Anchor-point samplers. A sampler proposes the points of the host at which a
//! guest is docked; any implementation of [`Sampler`] is interchangeable.

use crate::core::models::body::Body;
use crate::core::utils::geometry;
use nalgebra::Point3;
use rand::RngCore;

pub const DEFAULT_NUM_SAMPLES: usize = 10;

pub trait Sampler: Send + Sync {
    fn get_points(&self, host: &Body, rng: &mut dyn RngCore) -> Vec<Point3<f64>>;

    fn name(&self) -> &'static str;
}

/// Docks only at the Cartesian origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OriginSampler;

impl Sampler for OriginSampler {
    fn get_points(&self, _host: &Body, _rng: &mut dyn RngCore) -> Vec<Point3<f64>> {
        vec![Point3::origin()]
    }

    fn name(&self) -> &'static str {
        "origin"
    }
}

/// Uniform points inside the host cell, or the unit cube when the host has no lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomSampler {
    pub num_samples: usize,
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self {
            num_samples: DEFAULT_NUM_SAMPLES,
        }
    }
}

impl Sampler for RandomSampler {
    fn get_points(&self, host: &Body, rng: &mut dyn RngCore) -> Vec<Point3<f64>> {
        (0..self.num_samples)
            .map(|_| {
                let frac = geometry::random_fractional(rng);
                geometry::fractional_to_cartesian(&frac, host.lattice())
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Caller-supplied anchor points, returned unchanged for every host.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPointsSampler {
    points: Vec<Point3<f64>>,
}

impl FixedPointsSampler {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }
}

impl Sampler for FixedPointsSampler {
    fn get_points(&self, _host: &Body, _rng: &mut dyn RngCore) -> Vec<Point3<f64>> {
        self.points.clone()
    }

    fn name(&self) -> &'static str {
        "points"
    }
}
