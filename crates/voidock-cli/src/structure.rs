use crate::error::{CliError, Result};
use nalgebra::{Matrix3, Point3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use voidock::core::models::body::Body;
use voidock::core::models::site::Site;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SiteRecord {
    pub element: String,
    pub position: [f64; 3],
}

/// On-disk form of a [`Body`]: an optional lattice (one cell vector per row) and a site list.
///
/// Docked poses additionally carry their fitness and loading level.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StructureFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lattice: Option<[[f64; 3]; 3]>,
    #[serde(default)]
    pub sites: Vec<SiteRecord>,
}

impl StructureFile {
    pub fn from_body(body: &Body) -> Self {
        let lattice = body.lattice().map(|m| {
            let row = |i: usize| [m[(i, 0)], m[(i, 1)], m[(i, 2)]];
            [row(0), row(1), row(2)]
        });
        let sites = body
            .sites()
            .iter()
            .map(|s| SiteRecord {
                element: s.element.clone(),
                position: [s.position.x, s.position.y, s.position.z],
            })
            .collect();
        Self {
            score: None,
            loading: None,
            lattice,
            sites,
        }
    }

    pub fn with_ranking(mut self, score: f64, loading: usize) -> Self {
        self.score = Some(score);
        self.loading = Some(loading);
        self
    }

    pub fn to_body(&self) -> Body {
        let sites = self
            .sites
            .iter()
            .map(|r| {
                let [x, y, z] = r.position;
                Site::new(r.element.clone(), Point3::new(x, y, z))
            })
            .collect();
        let body = Body::new(sites);
        match self.lattice {
            Some([a, b, c]) => body.with_lattice(Matrix3::new(
                a[0], a[1], a[2], b[0], b[1], b[2], c[0], c[1], c[2],
            )),
            None => body,
        }
    }

    pub fn read_from_path(path: &Path) -> Result<Body> {
        debug!("Reading structure from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let file: StructureFile = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        if file.sites.is_empty() {
            return Err(CliError::FileParsing {
                path: path.to_path_buf(),
                source: anyhow::anyhow!("the structure has no sites"),
            });
        }
        Ok(file.to_body())
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let content = toml::to_string(self).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
