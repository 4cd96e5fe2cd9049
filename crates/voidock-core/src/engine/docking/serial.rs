use super::{PlacementContext, PlacementStrategy, translated_host_positions};
use crate::core::models::complex::Complex;
use crate::core::utils::geometry;
use nalgebra::Point3;
use rand::rngs::StdRng;

/// Builds candidates one at a time, each with a freshly drawn rotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialStrategy;

impl SerialStrategy {
    /// A single candidate: the host moved so that `point` is the origin, and a
    /// randomly rotated copy of the guest.
    pub fn candidate(
        context: &PlacementContext<'_>,
        host_positions: &[Point3<f64>],
        rng: &mut StdRng,
    ) -> Complex {
        let rotation = geometry::random_rotation(rng);
        let guest_positions: Vec<Point3<f64>> = context
            .guest
            .positions()
            .iter()
            .map(|p| rotation * p)
            .collect();
        Complex::new(
            context.host.with_positions(host_positions),
            context.guest.with_positions(&guest_positions),
        )
    }
}

impl PlacementStrategy for SerialStrategy {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn dock_at_point(
        &self,
        context: &PlacementContext<'_>,
        point: &Point3<f64>,
        attempts: usize,
        rng: &mut StdRng,
    ) -> Vec<Complex> {
        let host_positions = translated_host_positions(context.host, point);
        (0..attempts)
            .map(|_| Self::candidate(context, &host_positions, rng))
            .collect()
    }
}
