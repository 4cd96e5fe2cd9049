use super::body::Body;
use super::site::Site;
use crate::core::utils::geometry::PeriodicCell;
use nalgebra::{DMatrix, Point3, Vector3};

/// Distance queries used by fitness functions.
pub trait Scoreable {
    fn host_sites(&self) -> &[Site];
    fn guest_sites(&self) -> &[Site];

    /// Host (rows) to guest (columns) distances.
    fn cross_distances(&self) -> DMatrix<f64>;
    fn host_distances(&self) -> DMatrix<f64>;
    fn guest_distances(&self) -> DMatrix<f64>;

    /// Periodic cell shared by host and guest, if the host has one.
    fn cell(&self) -> Option<PeriodicCell> {
        None
    }
}

/// In-place perturbations. Implementations must only ever move the guest.
pub trait Perturbable {
    fn translate_guest(&mut self, vector: &Vector3<f64>);
    fn rotate_guest(&mut self, axis: &Vector3<f64>, angle_radians: f64, anchor: Option<Point3<f64>>);
}

/// Access to the host body for anchor-point samplers.
pub trait Sampleable {
    fn host(&self) -> &Body;
}
