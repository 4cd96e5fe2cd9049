pub mod dock;
pub mod mcdock;

use crate::cli::CommonArgs;
use crate::error::{CliError, Result};
use crate::structure::StructureFile;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use voidock::core::models::body::Body;
use voidock::workflows::DockingResult;

pub const SUMMARY_FILE: &str = "run.toml";

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct RunSummary<'a, C: Serialize> {
    command: &'static str,
    host: &'a Path,
    guest: &'a Path,
    loading: usize,
    poses: usize,
    config: &'a C,
}

pub fn pose_path(output_dir: &Path, index: usize) -> PathBuf {
    output_dir.join(format!("{:04}.toml", index))
}

fn load_structures(common: &CommonArgs) -> Result<(Body, Body)> {
    info!("Loading host structure from {:?}", &common.host);
    let host = StructureFile::read_from_path(&common.host)?;
    info!("Loading guest structure from {:?}", &common.guest);
    let guest = StructureFile::read_from_path(&common.guest)?;
    info!(
        host_sites = host.len(),
        guest_sites = guest.len(),
        "Structures loaded."
    );
    Ok((host, guest))
}

/// Writes one structure file per pose, lowest loading first, followed by the run summary.
/// Returns the number of poses written.
fn write_results<C: Serialize>(
    common: &CommonArgs,
    command: &'static str,
    config: &C,
    result: &DockingResult,
) -> Result<usize> {
    std::fs::create_dir_all(&common.output)?;

    let mut written = 0;
    for (index, round) in result.history.rounds().iter().enumerate() {
        for candidate in round {
            let path = pose_path(&common.output, written);
            info!(
                "Writing pose {} (loading {}, fitness {:.4}) to {:?}",
                written,
                index + 1,
                candidate.score,
                &path
            );
            StructureFile::from_body(&candidate.complex.pose())
                .with_ranking(candidate.score, index + 1)
                .write_to_path(&path)?;
            written += 1;
        }
    }

    let summary_path = common.output.join(SUMMARY_FILE);
    let summary = RunSummary {
        command,
        host: &common.host,
        guest: &common.guest,
        loading: result.loading(),
        poses: written,
        config,
    };
    let content = toml::to_string(&summary).map_err(|e| CliError::FileParsing {
        path: summary_path.clone(),
        source: e.into(),
    })?;
    std::fs::write(&summary_path, content)?;
    Ok(written)
}

fn report_outcome(common: &CommonArgs, result: &DockingResult, written: usize) {
    match result.best() {
        None => {
            warn!("Workflow completed but found no valid placement.");
            println!(
                "Warning: no valid placement found for the guest. Only {} was written to {}.",
                SUMMARY_FILE,
                common.output.display()
            );
        }
        Some(best) => {
            println!(
                "Loaded {} guest(s). {} pose(s) written to {}",
                result.loading(),
                written,
                common.output.display()
            );
            println!("✓ Best pose fitness: {:.4}", best.score);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Six Si sites on the axes at distance `radius` from the origin.
    pub fn write_octahedron_host(dir: &Path, radius: f64) -> PathBuf {
        let mut content = String::new();
        for (x, y, z) in [
            (radius, 0.0, 0.0),
            (-radius, 0.0, 0.0),
            (0.0, radius, 0.0),
            (0.0, -radius, 0.0),
            (0.0, 0.0, radius),
            (0.0, 0.0, -radius),
        ] {
            content.push_str(&format!(
                "[[sites]]\nelement = \"Si\"\nposition = [{:.3}, {:.3}, {:.3}]\n\n",
                x, y, z
            ));
        }
        let path = dir.join("host.toml");
        fs::write(&path, content).unwrap();
        path
    }

    pub fn write_dimer_guest(dir: &Path) -> PathBuf {
        let path = dir.join("guest.toml");
        fs::write(
            &path,
            "[[sites]]\nelement = \"C\"\nposition = [0.0, 0.0, 0.0]\n\n\
             [[sites]]\nelement = \"O\"\nposition = [1.2, 0.0, 0.0]\n",
        )
        .unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use nalgebra::Point3;
    use voidock::core::models::complex::Complex;
    use voidock::core::models::site::Site;
    use voidock::engine::docking::subdock::LoadingHistory;
    use voidock::engine::state::Candidate;

    fn common_args(output: &Path) -> CommonArgs {
        let output = output.to_str().unwrap();
        match Cli::parse_from(["voidock", "dock", "host.toml", "guest.toml", "-o", output]).command
        {
            Commands::Dock(args) => args.common,
            _ => panic!("Expected 'dock' subcommand"),
        }
    }

    fn candidate(score: f64, guest_x: f64) -> Candidate {
        let host = Body::new(vec![Site::new("Si", Point3::origin())]);
        let guest = Body::new(vec![Site::new("C", Point3::new(guest_x, 0.0, 0.0))]);
        Candidate::new(score, Complex::new(host, guest))
    }

    #[derive(Serialize)]
    struct DummyConfig {
        attempts: usize,
    }

    #[test]
    fn pose_files_are_zero_padded() {
        assert_eq!(pose_path(Path::new("out"), 7), PathBuf::from("out/0007.toml"));
    }

    #[test]
    fn results_are_written_per_pose_with_a_summary() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out");
        let common = common_args(&output);
        let result = DockingResult {
            history: LoadingHistory::from_rounds(vec![
                vec![candidate(2.0, 3.0), candidate(1.0, 2.5)],
                vec![candidate(0.5, 4.0)],
            ]),
        };

        let written =
            write_results(&common, "dock", &DummyConfig { attempts: 3 }, &result).unwrap();
        assert_eq!(written, 3);

        let first: StructureFile =
            toml::from_str(&std::fs::read_to_string(output.join("0000.toml")).unwrap()).unwrap();
        assert_eq!(first.score, Some(2.0));
        assert_eq!(first.loading, Some(1));
        assert_eq!(first.sites.len(), 2);
        assert_eq!(first.sites[0].element, "Si");

        let last: StructureFile =
            toml::from_str(&std::fs::read_to_string(output.join("0002.toml")).unwrap()).unwrap();
        assert_eq!(last.loading, Some(2));

        let summary: toml::Table =
            toml::from_str(&std::fs::read_to_string(output.join(SUMMARY_FILE)).unwrap()).unwrap();
        assert_eq!(summary["command"].as_str(), Some("dock"));
        assert_eq!(summary["loading"].as_integer(), Some(2));
        assert_eq!(summary["poses"].as_integer(), Some(3));
        assert_eq!(summary["config"]["attempts"].as_integer(), Some(3));
    }

    #[test]
    fn empty_result_writes_only_the_summary() {
        let dir = tempfile::tempdir().unwrap();
        let common = common_args(dir.path());
        let written = write_results(
            &common,
            "dock",
            &DummyConfig { attempts: 1 },
            &DockingResult::default(),
        )
        .unwrap();
        assert_eq!(written, 0);
        assert!(!dir.path().join("0000.toml").exists());
        assert!(dir.path().join(SUMMARY_FILE).exists());
    }
}
