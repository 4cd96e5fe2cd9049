use super::site::Site;
use crate::core::utils::geometry::{self, PeriodicCell};
use nalgebra::{DMatrix, Matrix3, Point3, Vector3};

/// An ordered collection of sites, optionally embedded in a periodic cell.
///
/// With a lattice, distances follow the minimum-image convention; without one they
/// are plain Euclidean.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    sites: Vec<Site>,
    lattice: Option<Matrix3<f64>>,
}

impl Body {
    pub fn new(sites: Vec<Site>) -> Self {
        Self {
            sites,
            lattice: None,
        }
    }

    /// Attaches a lattice whose rows are the cell vectors.
    pub fn with_lattice(mut self, lattice: Matrix3<f64>) -> Self {
        self.lattice = Some(lattice);
        self
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn lattice(&self) -> Option<&Matrix3<f64>> {
        self.lattice.as_ref()
    }

    /// The periodic cell of the lattice, if any and not singular.
    pub fn cell(&self) -> Option<PeriodicCell> {
        self.lattice.as_ref().and_then(PeriodicCell::new)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.sites.iter().map(|s| s.position).collect()
    }

    pub fn centroid(&self) -> Option<Point3<f64>> {
        geometry::centroid(&self.positions())
    }

    pub fn translate(&mut self, vector: &Vector3<f64>) {
        for site in &mut self.sites {
            site.position += vector;
        }
    }

    /// Rotates every site by `angle_radians` about `axis` passing through `anchor`.
    /// The anchor defaults to the centroid.
    pub fn rotate(&mut self, axis: &Vector3<f64>, angle_radians: f64, anchor: Option<Point3<f64>>) {
        let Some(anchor) = anchor.or_else(|| self.centroid()) else {
            return;
        };
        let rotation = geometry::rotation_from_axis_angle(axis, angle_radians);
        for site in &mut self.sites {
            site.position = anchor + rotation * (site.position - anchor);
        }
    }

    /// Shifts the whole body by the lattice vector that brings its centroid into `cell`.
    pub fn wrap_centroid_into(&mut self, cell: &PeriodicCell) {
        if let Some(c) = self.centroid() {
            let shift = cell.wrap(&c) - c;
            self.translate(&shift);
        }
    }

    /// Maps every site into `cell` independently.
    pub fn wrap_sites_into(&mut self, cell: &PeriodicCell) {
        for site in &mut self.sites {
            site.position = cell.wrap(&site.position);
        }
    }

    /// Moves the body so that its centroid sits at the origin.
    pub fn centered(mut self) -> Self {
        if let Some(c) = self.centroid() {
            self.translate(&-c.coords);
        }
        self
    }

    /// Copy of this body with every site moved to the matching entry of `positions`.
    pub fn with_positions(&self, positions: &[Point3<f64>]) -> Body {
        debug_assert_eq!(
            positions.len(),
            self.sites.len(),
            "position count must match site count"
        );
        let sites = self
            .sites
            .iter()
            .zip(positions)
            .map(|(site, &position)| Site {
                element: site.element.clone(),
                position,
            })
            .collect();
        Body {
            sites,
            lattice: self.lattice,
        }
    }

    /// Distances between the sites of `self` (rows) and `other` (columns), periodic
    /// in the lattice of `self`, or of `other` when `self` has none.
    pub fn distance_matrix(&self, other: &Body) -> DMatrix<f64> {
        self.distance_matrix_in(other, self.lattice.as_ref().or(other.lattice.as_ref()))
    }

    /// Distances between the sites of `self` (rows) and `other` (columns) under an
    /// explicit lattice.
    pub fn distance_matrix_in(&self, other: &Body, lattice: Option<&Matrix3<f64>>) -> DMatrix<f64> {
        match lattice.and_then(PeriodicCell::new) {
            Some(cell) => {
                let rows: Vec<_> = self.sites.iter().map(|s| cell.fractional(&s.position)).collect();
                let cols: Vec<_> = other.sites.iter().map(|s| cell.fractional(&s.position)).collect();
                DMatrix::from_fn(self.len(), other.len(), |i, j| {
                    cell.minimum_image_distance(&rows[i], &cols[j])
                })
            }
            None => DMatrix::from_fn(self.len(), other.len(), |i, j| {
                self.sites[i].distance_to(&other.sites[j])
            }),
        }
    }

    pub fn self_distance_matrix(&self) -> DMatrix<f64> {
        self.distance_matrix(self)
    }

    /// Concatenates `self` followed by `other`, keeping the lattice of `self`.
    pub fn merge(&self, other: &Body) -> Body {
        let mut sites = Vec::with_capacity(self.len() + other.len());
        sites.extend_from_slice(&self.sites);
        sites.extend_from_slice(&other.sites);
        Body {
            sites,
            lattice: self.lattice,
        }
    }
}
