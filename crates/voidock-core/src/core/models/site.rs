use crate::core::utils::geometry::PeriodicCell;
use nalgebra::Point3;

/// A single atomic site: element symbol plus Cartesian position in Ångström.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub element: String,
    pub position: Point3<f64>,
}

impl Site {
    pub fn new(element: impl Into<String>, position: Point3<f64>) -> Self {
        Self {
            element: element.into(),
            position,
        }
    }

    #[inline]
    pub fn is(&self, element: &str) -> bool {
        self.element == element
    }

    #[inline]
    pub fn distance_to(&self, other: &Site) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }

    /// Minimum-image distance inside `cell`, Euclidean without one.
    #[inline]
    pub fn distance_in(&self, other: &Site, cell: Option<&PeriodicCell>) -> f64 {
        match cell {
            Some(cell) => cell.distance(&self.position, &other.position),
            None => self.distance_to(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_is_euclidean() {
        let a = Site::new("O", Point3::new(0.0, 0.0, 0.0));
        let b = Site::new("H", Point3::new(3.0, 4.0, 0.0));
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn is_compares_element_symbol_exactly() {
        let site = Site::new("Al", Point3::origin());
        assert!(site.is("Al"));
        assert!(!site.is("A"));
    }
}
