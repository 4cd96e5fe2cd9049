use itertools::iproduct;
use nalgebra::{Matrix3, Point3, Rotation3, Unit, Vector3};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, UnitSphere};
use std::f64::consts::TAU;

/// Rotation of `angle_radians` about `axis`. The axis does not need to be normalized,
/// but it must not be the zero vector.
pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_radians: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_radians)
}

/// Draws an isotropic random axis and a uniform angle in `[0, 2π)`.
pub fn random_axis_angle<R: Rng + ?Sized>(rng: &mut R) -> (Vector3<f64>, f64) {
    let [x, y, z]: [f64; 3] = UnitSphere.sample(rng);
    let angle = TAU * rng.r#gen::<f64>();
    (Vector3::new(x, y, z), angle)
}

pub fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Rotation3<f64> {
    let (axis, angle) = random_axis_angle(rng);
    rotation_from_axis_angle(&axis, angle)
}

/// Draws `count` independent random rotations, in order.
pub fn random_rotations<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Rotation3<f64>> {
    (0..count).map(|_| random_rotation(rng)).collect()
}

/// Displacement with each Cartesian component drawn from a standard normal distribution.
pub fn random_displacement<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f64> {
    Vector3::new(
        StandardNormal.sample(rng),
        StandardNormal.sample(rng),
        StandardNormal.sample(rng),
    )
}

/// Uniform fractional coordinates in `[0, 1)^3`.
pub fn random_fractional<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f64> {
    Vector3::new(rng.r#gen(), rng.r#gen(), rng.r#gen())
}

/// Maps fractional coordinates to Cartesian ones. Lattice vectors are the rows of `lattice`;
/// without a lattice the unit cube is used.
pub fn fractional_to_cartesian(frac: &Vector3<f64>, lattice: Option<&Matrix3<f64>>) -> Point3<f64> {
    match lattice {
        Some(matrix) => Point3::from(matrix.transpose() * frac),
        None => Point3::from(*frac),
    }
}

/// A periodic cell with its fractional mapping precomputed.
///
/// Positions are wrapped so that every fractional coordinate lies in `[0, 1)`, and
/// distances follow the minimum-image convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicCell {
    to_cartesian: Matrix3<f64>,
    to_fractional: Matrix3<f64>,
}

impl PeriodicCell {
    /// Builds the cell from a lattice whose rows are the cell vectors. Returns `None`
    /// for a singular lattice.
    pub fn new(lattice: &Matrix3<f64>) -> Option<Self> {
        let to_cartesian = lattice.transpose();
        let to_fractional = to_cartesian.try_inverse()?;
        Some(Self {
            to_cartesian,
            to_fractional,
        })
    }

    pub fn fractional(&self, point: &Point3<f64>) -> Vector3<f64> {
        self.to_fractional * point.coords
    }

    pub fn cartesian(&self, frac: &Vector3<f64>) -> Point3<f64> {
        Point3::from(self.to_cartesian * frac)
    }

    /// The image of `point` inside the cell.
    pub fn wrap(&self, point: &Point3<f64>) -> Point3<f64> {
        self.cartesian(&self.fractional(point).map(wrap_unit))
    }

    /// Shortest distance between two fractional positions over all periodic images.
    pub fn minimum_image_distance(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        let delta = (b - a).map(|x| x - x.round());
        iproduct!(-1..=1, -1..=1, -1..=1)
            .map(|(i, j, k)| {
                let shift = Vector3::new(f64::from(i), f64::from(j), f64::from(k));
                (self.to_cartesian * (delta + shift)).norm()
            })
            .fold(f64::INFINITY, f64::min)
    }

    pub fn distance(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        self.minimum_image_distance(&self.fractional(a), &self.fractional(b))
    }
}

/// `x` modulo one, never returning `1.0` for tiny negative inputs.
fn wrap_unit(x: f64) -> f64 {
    let wrapped = x.rem_euclid(1.0);
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::FRAC_PI_2;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn rotation_about_z_by_quarter_turn_maps_x_to_y() {
        let rot = rotation_from_axis_angle(&Vector3::z(), FRAC_PI_2);
        let rotated = rot * Vector3::x();
        assert!(f64_approx_equal(rotated.x, 0.0));
        assert!(f64_approx_equal(rotated.y, 1.0));
        assert!(f64_approx_equal(rotated.z, 0.0));
    }

    #[test]
    fn random_axis_is_unit_length_and_angle_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let (axis, angle) = random_axis_angle(&mut rng);
            assert!((axis.norm() - 1.0).abs() < 1e-9);
            assert!((0.0..TAU).contains(&angle));
        }
    }

    #[test]
    fn random_rotations_preserve_vector_norms() {
        let mut rng = StdRng::seed_from_u64(11);
        let v = Vector3::new(1.0, -2.0, 0.5);
        for rot in random_rotations(25, &mut rng) {
            assert!(f64_approx_equal((rot * v).norm(), v.norm()));
        }
    }

    #[test]
    fn random_rotations_are_reproducible_with_a_fixed_seed() {
        let a = random_rotations(5, &mut StdRng::seed_from_u64(3));
        let b = random_rotations(5, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn fractional_to_cartesian_uses_lattice_rows() {
        let lattice = Matrix3::new(10.0, 0.0, 0.0, 0.0, 20.0, 0.0, 1.0, 0.0, 30.0);
        let p = fractional_to_cartesian(&Vector3::new(0.5, 0.5, 1.0), Some(&lattice));
        assert!(f64_approx_equal(p.x, 6.0));
        assert!(f64_approx_equal(p.y, 10.0));
        assert!(f64_approx_equal(p.z, 30.0));
    }

    #[test]
    fn fractional_to_cartesian_without_lattice_is_identity() {
        let p = fractional_to_cartesian(&Vector3::new(0.1, 0.2, 0.3), None);
        assert_eq!(p, Point3::new(0.1, 0.2, 0.3));
    }

    fn cubic_cell(edge: f64) -> PeriodicCell {
        PeriodicCell::new(&(Matrix3::identity() * edge)).unwrap()
    }

    #[test]
    fn singular_lattice_has_no_cell() {
        let flat = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0);
        assert!(PeriodicCell::new(&flat).is_none());
    }

    #[test]
    fn fractional_and_cartesian_are_inverse_maps() {
        let lattice = Matrix3::new(10.0, 0.0, 0.0, 2.0, 8.0, 0.0, 1.0, 1.0, 12.0);
        let cell = PeriodicCell::new(&lattice).unwrap();
        let frac = Vector3::new(0.25, 0.5, 0.75);
        let p = cell.cartesian(&frac);
        assert_eq!(p, fractional_to_cartesian(&frac, Some(&lattice)));
        assert!((cell.fractional(&p) - frac).norm() < TOLERANCE);
    }

    #[test]
    fn wrap_brings_points_into_the_cell() {
        let cell = cubic_cell(10.0);
        let wrapped = cell.wrap(&Point3::new(-1.0, 23.0, 10.0));
        assert!(f64_approx_equal(wrapped.x, 9.0));
        assert!(f64_approx_equal(wrapped.y, 3.0));
        assert!(f64_approx_equal(wrapped.z, 0.0));
    }

    #[test]
    fn wrap_of_tiny_negative_coordinate_stays_below_one() {
        let cell = cubic_cell(1.0);
        let wrapped = cell.wrap(&Point3::new(-1e-18, 0.5, 0.5));
        assert!((0.0..1.0).contains(&wrapped.x));
    }

    #[test]
    fn distance_across_a_cell_face_uses_the_nearest_image() {
        let cell = cubic_cell(10.0);
        let d = cell.distance(&Point3::new(0.5, 5.0, 5.0), &Point3::new(9.5, 5.0, 5.0));
        assert!(f64_approx_equal(d, 1.0));
    }

    #[test]
    fn distance_in_a_skewed_cell_checks_neighbouring_images() {
        let lattice = Matrix3::new(1.0, 0.0, 0.0, 0.9, 0.3, 0.0, 0.0, 0.0, 5.0);
        let cell = PeriodicCell::new(&lattice).unwrap();
        // Fractional offset (0.4, 0.4, 0); rounding alone would keep the 0.77 Å image.
        let b = cell.cartesian(&Vector3::new(0.4, 0.4, 0.0));
        let d = cell.distance(&Point3::origin(), &b);
        assert!(f64_approx_equal(d, 0.052f64.sqrt()));
    }

    #[test]
    fn centroid_of_empty_slice_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn centroid_averages_positions() {
        let c = centroid(&[Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, -6.0)]).unwrap();
        assert_eq!(c, Point3::new(1.0, 2.0, -3.0));
    }

    #[test]
    fn calculate_rmsd_for_mismatched_lengths_is_none() {
        assert!(calculate_rmsd(&[Point3::origin()], &[]).is_none());
    }

    #[test]
    fn calculate_rmsd_of_uniform_shift_equals_shift_length() {
        let a = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];
        let b: Vec<_> = a.iter().map(|p| p + Vector3::new(3.0, 4.0, 0.0)).collect();
        assert!(f64_approx_equal(calculate_rmsd(&a, &b).unwrap(), 5.0));
    }
}
