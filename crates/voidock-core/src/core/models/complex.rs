use super::body::Body;
use super::site::Site;
use super::traits::{Perturbable, Sampleable, Scoreable};
use crate::core::utils::geometry::PeriodicCell;
use nalgebra::{DMatrix, Point3, Vector3};

/// A host-guest pair. Cloning is a deep copy, so a perturbed clone never aliases
/// the guest coordinates of the original.
#[derive(Debug, Clone, PartialEq)]
pub struct Complex {
    host: Body,
    guest: Body,
}

impl Complex {
    pub fn new(host: Body, guest: Body) -> Self {
        Self { host, guest }
    }

    pub fn host(&self) -> &Body {
        &self.host
    }

    pub fn guest(&self) -> &Body {
        &self.guest
    }

    pub fn len(&self) -> usize {
        self.host.len() + self.guest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.host.is_empty() && self.guest.is_empty()
    }

    /// Substitutes the whole host. This is the only way the host changes.
    pub fn replace_host(&mut self, host: Body) {
        self.host = host;
    }

    /// Host sites followed by guest sites as a single body.
    pub fn pose(&self) -> Body {
        self.host.merge(&self.guest)
    }

    pub fn into_parts(self) -> (Body, Body) {
        (self.host, self.guest)
    }

    /// Shifts the guest by the lattice vector that brings its centroid into the host
    /// cell. No-op for a non-periodic host.
    pub fn wrap_guest_into_cell(&mut self) {
        if let Some(cell) = self.host.cell() {
            self.guest.wrap_centroid_into(&cell);
        }
    }

    /// Maps every guest site into the host cell independently.
    pub fn wrap_guest_sites_into_cell(&mut self) {
        if let Some(cell) = self.host.cell() {
            self.guest.wrap_sites_into(&cell);
        }
    }

    /// Smallest host-guest distance, or `None` when either body is empty.
    pub fn min_cross_distance(&self) -> Option<f64> {
        let d = self.cross_distances();
        (!d.is_empty()).then(|| d.min())
    }
}

impl Scoreable for Complex {
    fn host_sites(&self) -> &[Site] {
        self.host.sites()
    }

    fn guest_sites(&self) -> &[Site] {
        self.guest.sites()
    }

    fn cross_distances(&self) -> DMatrix<f64> {
        self.host.distance_matrix(&self.guest)
    }

    fn host_distances(&self) -> DMatrix<f64> {
        self.host.self_distance_matrix()
    }

    fn guest_distances(&self) -> DMatrix<f64> {
        self.guest.distance_matrix_in(&self.guest, self.host.lattice())
    }

    fn cell(&self) -> Option<PeriodicCell> {
        self.host.cell()
    }
}

impl Perturbable for Complex {
    fn translate_guest(&mut self, vector: &Vector3<f64>) {
        #[cfg(debug_assertions)]
        let host_before = self.host.clone();

        self.guest.translate(vector);

        #[cfg(debug_assertions)]
        debug_assert_eq!(host_before, self.host, "guest translation moved the host");
    }

    fn rotate_guest(&mut self, axis: &Vector3<f64>, angle_radians: f64, anchor: Option<Point3<f64>>) {
        #[cfg(debug_assertions)]
        let host_before = self.host.clone();

        self.guest.rotate(axis, angle_radians, anchor);

        #[cfg(debug_assertions)]
        debug_assert_eq!(host_before, self.host, "guest rotation moved the host");
    }
}

impl Sampleable for Complex {
    fn host(&self) -> &Body {
        &self.host
    }
}
