use super::threshold::ThresholdFitness;
use super::{Fitness, FitnessError, REJECTED};
use crate::core::models::site::Site;
use crate::core::models::traits::Scoreable;
use crate::core::utils::geometry::PeriodicCell;
use phf::phf_map;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_CONTACT_DISTANCE: f64 = 2.0;

/// Bond-length window `(lower, upper)` (exclusive, Å) and the bond order it implies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondWindow {
    pub lower: f64,
    pub upper: f64,
    pub order: u32,
}

const fn window(lower: f64, upper: f64, order: u32) -> BondWindow {
    BondWindow {
        lower,
        upper,
        order,
    }
}

impl BondWindow {
    #[inline]
    fn contains(&self, distance: f64) -> bool {
        self.lower < distance && distance < self.upper
    }
}

/// Windows around a carbon, keyed by the neighbour element. Checked in order.
static CARBON_WINDOWS: phf::Map<&'static str, &'static [BondWindow]> = phf_map! {
    "H" => &[window(0.0, 1.15, 1)],
    "C" => &[window(1.5, 1.6, 1), window(1.29, 1.39, 2), window(1.15, 1.25, 3)],
    "N" => &[window(1.38, 1.48, 1), window(1.33, 1.43, 2), window(1.11, 1.21, 3)],
    "O" => &[window(1.38, 1.48, 1), window(1.18, 1.28, 2), window(1.08, 1.18, 3)],
};

/// Windows around a nitrogen, keyed by the neighbour element. Checked in order.
static NITROGEN_WINDOWS: phf::Map<&'static str, &'static [BondWindow]> = phf_map! {
    "H" => &[window(0.0, 1.05, 1)],
    "C" => &[window(1.42, 1.52, 1), window(1.19, 1.29, 2), window(1.05, 1.15, 3)],
    "N" => &[window(1.38, 1.48, 1), window(1.33, 1.43, 2), window(1.11, 1.21, 3)],
    "O" => &[window(1.39, 1.49, 1), window(1.15, 1.25, 2)],
};

/// Cation site of the guest and the anionic coordination groups of the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeSites {
    /// Guest site index.
    pub cation: usize,
    /// Each group lists host site indices compensating one negative charge.
    pub anion_groups: Vec<Vec<usize>>,
}

/// Strategy locating the charged sites of a host-guest pair. Distances are taken in
/// `cell` when the pair is periodic.
pub trait ChargeSiteLocator: Send + Sync {
    fn locate(
        &self,
        host: &[Site],
        guest: &[Site],
        cell: Option<&PeriodicCell>,
    ) -> Result<ChargeSites, FitnessError>;
}

/// Precomputed charge sites, validated against the structure on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitChargeSites {
    sites: ChargeSites,
}

impl ExplicitChargeSites {
    pub fn new(cation: usize, anion_groups: Vec<Vec<usize>>) -> Self {
        Self {
            sites: ChargeSites {
                cation,
                anion_groups,
            },
        }
    }
}

impl ChargeSiteLocator for ExplicitChargeSites {
    fn locate(
        &self,
        host: &[Site],
        guest: &[Site],
        _cell: Option<&PeriodicCell>,
    ) -> Result<ChargeSites, FitnessError> {
        if self.sites.cation >= guest.len() {
            return Err(FitnessError::ChargeSitesNotFound(format!(
                "cation index {} out of range for a guest of {} sites",
                self.sites.cation,
                guest.len()
            )));
        }
        if let Some(&bad) = self
            .sites
            .anion_groups
            .iter()
            .flatten()
            .find(|&&idx| idx >= host.len())
        {
            return Err(FitnessError::ChargeSitesNotFound(format!(
                "anion index {bad} out of range for a host of {} sites",
                host.len()
            )));
        }
        Ok(self.sites.clone())
    }
}

/// Locates charges from interatomic distances alone.
///
/// The cation is the first guest carbon whose bond orders sum to three, or failing
/// that the first guest nitrogen whose bond orders sum to four. An anion group is
/// the four oxygens of a host aluminium (Al-O below `al_o_cutoff`) when none of
/// those oxygens carries a proton (any host or guest site closer than `oh_cutoff`).
#[derive(Debug, Clone, PartialEq)]
pub struct BondValenceLocator {
    pub al_o_cutoff: f64,
    pub oh_cutoff: f64,
}

impl Default for BondValenceLocator {
    fn default() -> Self {
        Self {
            al_o_cutoff: 1.9,
            oh_cutoff: 1.10,
        }
    }
}

impl BondValenceLocator {
    fn bond_order_sum(
        center: usize,
        guest: &[Site],
        windows: &phf::Map<&'static str, &'static [BondWindow]>,
        cell: Option<&PeriodicCell>,
    ) -> u32 {
        guest
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != center)
            .filter_map(|(_, neighbor)| {
                let distance = guest[center].distance_in(neighbor, cell);
                windows
                    .get(neighbor.element.as_str())?
                    .iter()
                    .find(|w| w.contains(distance))
                    .map(|w| w.order)
            })
            .sum()
    }

    fn find_cation(guest: &[Site], cell: Option<&PeriodicCell>) -> Option<usize> {
        let find = |element: &str, windows, valence| {
            (0..guest.len())
                .filter(|&i| guest[i].is(element))
                .find(|&i| Self::bond_order_sum(i, guest, windows, cell) == valence)
        };
        find("C", &CARBON_WINDOWS, 3).or_else(|| find("N", &NITROGEN_WINDOWS, 4))
    }

    fn find_anion_groups(
        &self,
        host: &[Site],
        guest: &[Site],
        cell: Option<&PeriodicCell>,
    ) -> Vec<Vec<usize>> {
        let is_protonated = |o: usize| {
            host.iter()
                .chain(guest)
                .enumerate()
                .any(|(j, other)| {
                    let d = host[o].distance_in(other, cell);
                    j != o && d > 0.0 && d < self.oh_cutoff
                })
        };

        host.iter()
            .enumerate()
            .filter(|(_, site)| site.is("Al"))
            .filter_map(|(al, aluminium)| {
                let oxygens: Vec<usize> = host
                    .iter()
                    .enumerate()
                    .filter(|&(j, site)| {
                        let d = aluminium.distance_in(site, cell);
                        j != al && site.is("O") && d > 0.0 && d < self.al_o_cutoff
                    })
                    .map(|(j, _)| j)
                    .collect();
                (oxygens.len() == 4 && !oxygens.iter().any(|&o| is_protonated(o)))
                    .then_some(oxygens)
            })
            .collect()
    }
}

impl ChargeSiteLocator for BondValenceLocator {
    fn locate(
        &self,
        host: &[Site],
        guest: &[Site],
        cell: Option<&PeriodicCell>,
    ) -> Result<ChargeSites, FitnessError> {
        let cation = Self::find_cation(guest, cell).ok_or_else(|| {
            FitnessError::ChargeSitesNotFound(
                "no three-bonded C or four-bonded N in the guest".to_string(),
            )
        })?;
        let anion_groups = self.find_anion_groups(host, guest, cell);
        if anion_groups.is_empty() {
            return Err(FitnessError::ChargeSitesNotFound(
                "no unprotonated tetrahedral Al in the host".to_string(),
            ));
        }
        Ok(ChargeSites {
            cation,
            anion_groups,
        })
    }
}

/// Two-stage gate: the guest cation must touch an anion site and the inner
/// threshold fitness must hold. Scores `1.0` when both pass, [`REJECTED`] otherwise.
#[derive(Clone)]
pub struct CationAnionFitness {
    locator: Arc<dyn ChargeSiteLocator>,
    inner: ThresholdFitness,
    contact_distance: f64,
}

impl CationAnionFitness {
    pub fn new(locator: Arc<dyn ChargeSiteLocator>, inner: ThresholdFitness) -> Self {
        Self {
            locator,
            inner,
            contact_distance: DEFAULT_CONTACT_DISTANCE,
        }
    }

    pub fn with_contact_distance(mut self, contact_distance: f64) -> Self {
        self.contact_distance = contact_distance;
        self
    }

    /// Cation-anion distances grouped per anion site.
    pub fn contact_distances(
        sites: &ChargeSites,
        host: &[Site],
        guest: &[Site],
        cell: Option<&PeriodicCell>,
    ) -> Vec<Vec<f64>> {
        let cation = &guest[sites.cation];
        sites
            .anion_groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|&o| cation.distance_in(&host[o], cell))
                    .collect()
            })
            .collect()
    }
}

impl<S: Scoreable> Fitness<S> for CationAnionFitness {
    fn score(&self, state: &S) -> Result<f64, FitnessError> {
        let (host, guest) = (state.host_sites(), state.guest_sites());
        let cell = state.cell();
        let sites = self.locator.locate(host, guest, cell.as_ref())?;
        let distances = Self::contact_distances(&sites, host, guest, cell.as_ref());

        let in_contact = distances
            .iter()
            .flatten()
            .any(|&d| d < self.contact_distance);
        if !in_contact {
            return Ok(REJECTED);
        }
        if self.inner.score(state)? < 0.0 {
            return Ok(REJECTED);
        }

        debug!(?distances, "Cation-anion contact found.");
        Ok(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::body::Body;
    use crate::core::models::complex::Complex;
    use nalgebra::Point3;

    fn site(element: &str, x: f64, y: f64, z: f64) -> Site {
        Site::new(element, Point3::new(x, y, z))
    }

    /// Al at the origin with four oxygens at 1.75 Å along the tetrahedral directions.
    fn acid_host() -> Vec<Site> {
        let s = 1.75 / 3f64.sqrt();
        vec![
            site("Al", 0.0, 0.0, 0.0),
            site("O", s, s, s),
            site("O", s, -s, -s),
            site("O", -s, s, -s),
            site("O", -s, -s, s),
        ]
    }

    /// Planar methyl cation: C with three C-H bonds of 1.09 Å.
    fn methyl_cation(offset: [f64; 3]) -> Vec<Site> {
        let [x, y, z] = offset;
        let h = 1.09;
        let (c, s) = (h * 0.5, h * 3f64.sqrt() / 2.0);
        vec![
            site("C", x, y, z),
            site("H", x + h, y, z),
            site("H", x - c, y + s, z),
            site("H", x - c, y - s, z),
        ]
    }

    /// Ammonium: N with four N-H bonds of 1.01 Å.
    fn ammonium() -> Vec<Site> {
        let s = 1.01 / 3f64.sqrt();
        vec![
            site("N", 0.0, 0.0, 0.0),
            site("H", s, s, s),
            site("H", s, -s, -s),
            site("H", -s, s, -s),
            site("H", -s, -s, s),
        ]
    }

    #[test]
    fn bond_valence_finds_three_bonded_carbon() {
        let guest = methyl_cation([0.0; 3]);
        assert_eq!(BondValenceLocator::find_cation(&guest, None), Some(0));
    }

    #[test]
    fn bond_valence_finds_four_bonded_nitrogen() {
        assert_eq!(BondValenceLocator::find_cation(&ammonium(), None), Some(0));
    }

    #[test]
    fn saturated_carbon_is_not_a_cation() {
        let mut guest = methyl_cation([0.0; 3]);
        guest.push(site("H", 0.0, 0.0, 1.09));
        assert_eq!(BondValenceLocator::find_cation(&guest, None), None);
    }

    #[test]
    fn first_matching_window_sets_the_bond_order() {
        // 1.40 Å lies in both N-N windows; the single-bond window comes first.
        let guest = vec![site("N", 0.0, 0.0, 0.0), site("N", 1.40, 0.0, 0.0)];
        assert_eq!(
            BondValenceLocator::bond_order_sum(0, &guest, &NITROGEN_WINDOWS, None),
            1
        );
    }

    #[test]
    fn tetrahedral_aluminium_forms_an_anion_group() {
        let groups = BondValenceLocator::default().find_anion_groups(&acid_host(), &[], None);
        assert_eq!(groups, vec![vec![1, 2, 3, 4]]);
    }

    #[test]
    fn protonated_oxygen_disables_the_anion_group() {
        let mut host = acid_host();
        let o = host[1].position;
        host.push(site("H", o.x + 0.97, o.y, o.z));
        assert!(BondValenceLocator::default().find_anion_groups(&host, &[], None).is_empty());
    }

    #[test]
    fn guest_proton_on_an_oxygen_disables_the_anion_group() {
        let o = acid_host()[1].position;
        let guest = vec![site("H", o.x + 0.97, o.y, o.z)];
        let locator = BondValenceLocator::default();
        assert!(locator.find_anion_groups(&acid_host(), &guest, None).is_empty());
        let far = vec![site("H", o.x + 3.0, o.y, o.z)];
        assert_eq!(locator.find_anion_groups(&acid_host(), &far, None).len(), 1);
    }

    #[test]
    fn bonds_across_a_cell_face_are_found_in_a_periodic_host() {
        let cell = PeriodicCell::new(&(nalgebra::Matrix3::identity() * 10.0)).unwrap();
        // Every oxygen shifted by one lattice vector still bonds to the aluminium.
        let host: Vec<Site> = acid_host()
            .into_iter()
            .map(|s| Site::new(s.element.clone(), cell.wrap(&s.position)))
            .collect();
        let locator = BondValenceLocator::default();
        assert!(locator.find_anion_groups(&host, &[], None).is_empty());
        assert_eq!(locator.find_anion_groups(&host, &[], Some(&cell)), vec![vec![1, 2, 3, 4]]);
    }

    #[test]
    fn explicit_sites_are_validated_against_the_structure() {
        let host = acid_host();
        let guest = ammonium();
        let ok = ExplicitChargeSites::new(0, vec![vec![1, 2]]);
        assert!(ok.locate(&host, &guest, None).is_ok());
        let bad_cation = ExplicitChargeSites::new(9, vec![vec![1]]);
        assert!(matches!(
            bad_cation.locate(&host, &guest, None),
            Err(FitnessError::ChargeSitesNotFound(_))
        ));
        let bad_anion = ExplicitChargeSites::new(0, vec![vec![1, 42]]);
        assert!(bad_anion.locate(&host, &guest, None).is_err());
    }

    fn fitness(threshold: f64) -> CationAnionFitness {
        CationAnionFitness::new(
            Arc::new(BondValenceLocator::default()),
            ThresholdFitness::min_distance(threshold),
        )
    }

    #[test]
    fn gate_passes_when_contact_and_threshold_both_hold() {
        // Cation 1.9 Å above the first oxygen along its bond direction.
        let s = (1.75 + 1.9) / 3f64.sqrt();
        let cpx = Complex::new(
            Body::new(acid_host()),
            Body::new(methyl_cation([s, s, s])),
        );
        assert_eq!(fitness(0.5).evaluate(&cpx), 1.0);
    }

    #[test]
    fn gate_fails_when_inner_threshold_fails() {
        let s = (1.75 + 1.9) / 3f64.sqrt();
        let cpx = Complex::new(
            Body::new(acid_host()),
            Body::new(methyl_cation([s, s, s])),
        );
        assert_eq!(fitness(5.0).evaluate(&cpx), REJECTED);
    }

    #[test]
    fn gate_fails_without_contact() {
        let cpx = Complex::new(
            Body::new(acid_host()),
            Body::new(methyl_cation([10.0, 0.0, 0.0])),
        );
        assert_eq!(fitness(0.5).evaluate(&cpx), REJECTED);
    }

    #[test]
    fn missing_charge_sites_are_rejected_not_propagated() {
        let host = Body::new(vec![site("Si", 0.0, 0.0, 0.0)]);
        let cpx = Complex::new(host, Body::new(methyl_cation([2.0, 0.0, 0.0])));
        assert!(matches!(
            fitness(0.5).score(&cpx),
            Err(FitnessError::ChargeSitesNotFound(_))
        ));
        assert_eq!(fitness(0.5).evaluate(&cpx), REJECTED);
    }
}
