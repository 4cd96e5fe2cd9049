use super::{PlacementContext, PlacementStrategy, translated_host_positions};
use crate::core::models::body::Body;
use crate::core::models::complex::Complex;
use crate::core::utils::geometry;
use nalgebra::{Point3, Rotation3};
use rand::rngs::StdRng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Host coordinates shifted so that `point` lands on the origin, repeated `attempts` times.
/// Shape `(attempts, host_sites)`.
pub fn translate_host(host: &Body, point: &Point3<f64>, attempts: usize) -> Vec<Vec<Point3<f64>>> {
    let translated = translated_host_positions(host, point);
    vec![translated; attempts]
}

/// Guest coordinates under each rotation. Shape `(rotations, guest_sites)`.
///
/// Rotations are drawn by the caller, so the transform itself is pure and may run in
/// parallel without affecting reproducibility.
pub fn rotate_guest(guest: &Body, rotations: &[Rotation3<f64>]) -> Vec<Vec<Point3<f64>>> {
    let coords = guest.positions();

    #[cfg(not(feature = "parallel"))]
    let iterator = rotations.iter();

    #[cfg(feature = "parallel")]
    let iterator = rotations.par_iter();

    iterator
        .map(|rotation| coords.iter().map(|p| rotation * p).collect())
        .collect()
}

/// Builds every attempt at once; no candidate is scored here.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchStrategy;

impl PlacementStrategy for BatchStrategy {
    fn name(&self) -> &'static str {
        "batch"
    }

    fn dock_at_point(
        &self,
        context: &PlacementContext<'_>,
        point: &Point3<f64>,
        attempts: usize,
        rng: &mut StdRng,
    ) -> Vec<Complex> {
        let rotations = geometry::random_rotations(attempts, rng);
        let hosts = translate_host(context.host, point, attempts);
        let guests = rotate_guest(context.guest, &rotations);

        hosts
            .iter()
            .zip(&guests)
            .map(|(h, g)| {
                Complex::new(
                    context.host.with_positions(h),
                    context.guest.with_positions(g),
                )
            })
            .collect()
    }
}
