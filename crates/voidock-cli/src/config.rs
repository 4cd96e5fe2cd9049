use crate::cli::{CommonArgs, DockArgs, McDockArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;
use voidock::core::fitness::Scope;
use voidock::engine::config::{
    self as core_config, ChargeSiteSelection, DEFAULT_ATTEMPTS, DEFAULT_MAX_SUBDOCK,
    DockingStrategy, FitnessKind, FitnessTerm, FitnessTermBuilder, SamplerConfig, SubdockConfig,
    TemperatureSchedule,
};

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialDockingSection {
    strategy: Option<DockingStrategy>,
    attempts: Option<usize>,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSamplerSection {
    kind: Option<String>,
    num_samples: Option<usize>,
    points: Option<Vec<[f64; 3]>>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialFitnessTerm {
    kind: FitnessKind,
    threshold: Option<f64>,
    scope: Option<Scope>,
    step: Option<bool>,
    target: Option<f64>,
    tolerance: Option<f64>,
    weight: Option<f64>,
    contact_distance: Option<f64>,
    charge_sites: Option<ChargeSiteSelection>,
}

impl PartialFitnessTerm {
    fn build(self, threshold_override: Option<f64>) -> Result<FitnessTerm> {
        let mut builder = FitnessTermBuilder::new().kind(self.kind);
        if let Some(threshold) = threshold_override.or(self.threshold) {
            builder = builder.threshold(threshold);
        }
        if let Some(scope) = self.scope {
            builder = builder.scope(scope);
        }
        if let Some(step) = self.step {
            builder = builder.step(step);
        }
        if let Some(target) = self.target {
            builder = builder.target(target);
        }
        if let Some(tolerance) = self.tolerance {
            builder = builder.tolerance(tolerance);
        }
        if let Some(weight) = self.weight {
            builder = builder.weight(weight);
        }
        if let Some(distance) = self.contact_distance {
            builder = builder.contact_distance(distance);
        }
        if let Some(selection) = self.charge_sites {
            builder = builder.charge_sites(selection);
        }
        Ok(builder.build()?)
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSubdockSection {
    enabled: Option<bool>,
    max_subdock: Option<usize>,
    max_loading: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialMonteCarloSection {
    temperature: Option<f64>,
    schedule: Option<String>,
    final_temperature: Option<f64>,
    decay: Option<f64>,
    early_exit: Option<bool>,
}

/// Run configuration as read from a TOML file, every value optional.
///
/// Values are resolved in priority order: command-line flags, `-S key=value`
/// overrides, the file, then built-in defaults.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialRunConfig {
    docking: Option<PartialDockingSection>,
    sampler: Option<PartialSamplerSection>,
    fitness: Option<Vec<PartialFitnessTerm>>,
    subdock: Option<PartialSubdockSection>,
    monte_carlo: Option<PartialMonteCarloSection>,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the file when one is given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_dock_args(mut self, args: &DockArgs) -> Result<core_config::DockingConfig> {
        self.apply_set_values(&args.common.set_values)?;

        let docking = self.docking.take().unwrap_or_default();
        let sampler_file = self.sampler.take().unwrap_or_default();
        let fitness = self.resolve_fitness(&args.common)?;
        let subdock = self.resolve_subdock(&args.common);

        let sampler_name = args
            .sampler
            .as_deref()
            .or(sampler_file.kind.as_deref())
            .unwrap_or("origin");
        let points = if args.points.is_empty() {
            sampler_file.points.unwrap_or_default()
        } else {
            args.points.clone()
        };
        let sampler = SamplerConfig::from_name(
            sampler_name,
            args.num_samples.or(sampler_file.num_samples),
            points,
        )?;

        let config = core_config::DockingConfigBuilder::new()
            .strategy(args.strategy.or(docking.strategy).unwrap_or_default())
            .sampler(sampler)
            .fitness_terms(fitness)
            .attempts(
                args.common
                    .attempts
                    .or(docking.attempts)
                    .unwrap_or(DEFAULT_ATTEMPTS),
            )
            .subdock(subdock)
            .seed(args.common.seed.or(docking.seed))
            .build()?;
        Ok(config)
    }

    pub fn merge_with_mcdock_args(
        mut self,
        args: &McDockArgs,
    ) -> Result<core_config::MonteCarloConfig> {
        self.apply_set_values(&args.common.set_values)?;

        let docking = self.docking.take().unwrap_or_default();
        let mc = self.monte_carlo.take().unwrap_or_default();
        let fitness = self.resolve_fitness(&args.common)?;
        let subdock = self.resolve_subdock(&args.common);

        let schedule_name = args
            .schedule
            .as_deref()
            .or(mc.schedule.as_deref())
            .unwrap_or("constant");
        let schedule = TemperatureSchedule::from_name(
            schedule_name,
            args.final_temperature.or(mc.final_temperature),
            args.decay.or(mc.decay),
        )?;

        let mut builder = core_config::MonteCarloConfigBuilder::new()
            .fitness_terms(fitness)
            .schedule(schedule)
            .attempts(
                args.common
                    .attempts
                    .or(docking.attempts)
                    .unwrap_or(DEFAULT_ATTEMPTS),
            )
            .early_exit(args.early_exit || mc.early_exit.unwrap_or(false))
            .subdock(subdock)
            .seed(args.common.seed.or(docking.seed));
        if let Some(temperature) = args.temperature.or(mc.temperature) {
            builder = builder.temperature(temperature);
        }
        Ok(builder.build()?)
    }

    /// `--fitness` replaces the terms of the file; `--threshold` applies to every term.
    /// Without either source a single `min_distance` term is used.
    fn resolve_fitness(&mut self, args: &CommonArgs) -> Result<Vec<FitnessTerm>> {
        let file_terms = self.fitness.take().unwrap_or_default();
        if !args.fitness.is_empty() {
            return args
                .fitness
                .iter()
                .map(|&kind| Self::default_term(kind).build(args.threshold))
                .collect();
        }
        if file_terms.is_empty() {
            return Self::default_term(FitnessKind::MinDistance)
                .build(args.threshold)
                .map(|term| vec![term]);
        }
        file_terms
            .into_iter()
            .map(|term| term.build(args.threshold))
            .collect()
    }

    fn default_term(kind: FitnessKind) -> PartialFitnessTerm {
        PartialFitnessTerm {
            kind,
            threshold: None,
            scope: None,
            step: None,
            target: None,
            tolerance: None,
            weight: None,
            contact_distance: None,
            charge_sites: None,
        }
    }

    fn resolve_subdock(&mut self, args: &CommonArgs) -> Option<SubdockConfig> {
        let file = self.subdock.take().unwrap_or_default();
        let enabled = if args.subdock.no_subdock {
            false
        } else {
            args.subdock.subdock || file.enabled.unwrap_or(false)
        };
        enabled.then(|| SubdockConfig {
            max_subdock: args
                .subdock
                .max_subdock
                .or(file.max_subdock)
                .unwrap_or(DEFAULT_MAX_SUBDOCK),
            max_loading: args.subdock.max_loading.or(file.max_loading),
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) =
                parser::parse_key_value(kv_pair).map_err(|e| CliError::Argument(e.to_string()))?;

            match key {
                "docking.strategy" => {
                    self.docking.get_or_insert_with(Default::default).strategy =
                        Some(parse_value(key, value_str)?);
                }
                "docking.attempts" => {
                    self.docking.get_or_insert_with(Default::default).attempts =
                        Some(parse_value(key, value_str)?);
                }
                "docking.seed" => {
                    self.docking.get_or_insert_with(Default::default).seed =
                        Some(parse_value(key, value_str)?);
                }
                "sampler.kind" => {
                    self.sampler.get_or_insert_with(Default::default).kind =
                        Some(value_str.to_string());
                }
                "sampler.num-samples" => {
                    self.sampler.get_or_insert_with(Default::default).num_samples =
                        Some(parse_value(key, value_str)?);
                }
                "subdock.enabled" => {
                    self.subdock.get_or_insert_with(Default::default).enabled =
                        Some(parse_value(key, value_str)?);
                }
                "subdock.max-subdock" => {
                    self.subdock.get_or_insert_with(Default::default).max_subdock =
                        Some(parse_value(key, value_str)?);
                }
                "subdock.max-loading" => {
                    self.subdock.get_or_insert_with(Default::default).max_loading =
                        Some(parse_value(key, value_str)?);
                }
                "monte-carlo.temperature" => {
                    self.monte_carlo
                        .get_or_insert_with(Default::default)
                        .temperature = Some(parse_value(key, value_str)?);
                }
                "monte-carlo.schedule" => {
                    self.monte_carlo.get_or_insert_with(Default::default).schedule =
                        Some(value_str.to_string());
                }
                "monte-carlo.final-temperature" => {
                    self.monte_carlo
                        .get_or_insert_with(Default::default)
                        .final_temperature = Some(parse_value(key, value_str)?);
                }
                "monte-carlo.decay" => {
                    self.monte_carlo.get_or_insert_with(Default::default).decay =
                        Some(parse_value(key, value_str)?);
                }
                "monte-carlo.early-exit" => {
                    self.monte_carlo
                        .get_or_insert_with(Default::default)
                        .early_exit = Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let file_path = dir.path().join("run.toml");
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn dock_args(extra: &[&str]) -> DockArgs {
        let mut args = vec!["voidock", "dock", "host.toml", "guest.toml"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Dock(args) => args,
            _ => panic!("Expected 'dock' subcommand"),
        }
    }

    fn mcdock_args(extra: &[&str]) -> McDockArgs {
        let mut args = vec!["voidock", "mcdock", "host.toml", "guest.toml"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::McDock(args) => args,
            _ => panic!("Expected 'mcdock' subcommand"),
        }
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let config = PartialRunConfig::default()
            .merge_with_dock_args(&dock_args(&[]))
            .unwrap();

        assert_eq!(config.strategy, DockingStrategy::Batch);
        assert_eq!(config.sampler, SamplerConfig::Origin);
        assert_eq!(config.attempts, DEFAULT_ATTEMPTS);
        assert_eq!(config.subdock, None);
        assert_eq!(config.seed, None);
        assert_eq!(config.fitness.len(), 1);
        assert_eq!(config.fitness[0].kind, FitnessKind::MinDistance);
        assert_eq!(config.fitness[0].threshold, 1.5);
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
        [docking]
        strategy = "serial"
        attempts = 25
        seed = 7

        [sampler]
        kind = "random"
        num-samples = 4

        [[fitness]]
        kind = "min_distance"
        threshold = 2.0

        [[fitness]]
        kind = "mean_distance_target"
        scope = "guest"
        target = 1.2
        weight = 0.5

        [subdock]
        enabled = true
        max-loading = 3
        "#,
        );

        let config = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_with_dock_args(&dock_args(&[]))
            .unwrap();

        assert_eq!(config.strategy, DockingStrategy::Serial);
        assert_eq!(config.attempts, 25);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.sampler, SamplerConfig::Random { num_samples: 4 });
        assert_eq!(config.fitness.len(), 2);
        assert_eq!(config.fitness[0].threshold, 2.0);
        assert_eq!(config.fitness[1].scope, Scope::Guest);
        assert_eq!(config.fitness[1].target, 1.2);
        assert_eq!(config.fitness[1].weight, 0.5);
        assert_eq!(
            config.subdock,
            Some(SubdockConfig {
                max_subdock: 1,
                max_loading: Some(3)
            })
        );
    }

    #[test]
    fn cli_args_override_set_values_which_override_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
        [docking]
        attempts = 25
        strategy = "serial"

        [[fitness]]
        kind = "min_distance"
        threshold = 2.0
        "#,
        );

        let args = dock_args(&[
            "-S",
            "docking.attempts=40",
            "-S",
            "docking.strategy=success",
            "--strategy",
            "batch",
            "--threshold",
            "0.9",
        ]);
        let config = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_with_dock_args(&args)
            .unwrap();

        assert_eq!(config.attempts, 40);
        assert_eq!(config.strategy, DockingStrategy::Batch);
        assert_eq!(config.fitness[0].threshold, 0.9);
    }

    #[test]
    fn fitness_flags_replace_file_terms() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
        [[fitness]]
        kind = "sum_distance"
        "#,
        );
        let args = dock_args(&["-f", "min_distance", "-f", "max_distance_target"]);
        let config = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_with_dock_args(&args)
            .unwrap();
        let kinds: Vec<_> = config.fitness.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![FitnessKind::MinDistance, FitnessKind::MaxDistanceTarget]
        );
    }

    #[test]
    fn points_sampler_takes_cli_points() {
        let args = dock_args(&["--sampler", "points", "--point", "1,2,3", "--point", "0,0,0"]);
        let config = PartialRunConfig::default()
            .merge_with_dock_args(&args)
            .unwrap();
        assert_eq!(
            config.sampler,
            SamplerConfig::Points {
                points: vec![[1.0, 2.0, 3.0], [0.0, 0.0, 0.0]]
            }
        );
    }

    #[test]
    fn points_sampler_without_points_is_a_config_error() {
        let args = dock_args(&["--sampler", "points"]);
        let result = PartialRunConfig::default().merge_with_dock_args(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("points")));
    }

    #[test]
    fn no_subdock_flag_wins_over_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(&dir, "[subdock]\nenabled = true\n");
        let config = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_with_dock_args(&dock_args(&["--no-subdock"]))
            .unwrap();
        assert_eq!(config.subdock, None);
    }

    #[test]
    fn monte_carlo_section_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
        [docking]
        attempts = 30

        [monte-carlo]
        temperature = 0.4
        schedule = "exponential"
        decay = 0.95
        "#,
        );
        let args = mcdock_args(&["--early-exit", "-S", "monte-carlo.temperature=0.2"]);
        let config = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_with_mcdock_args(&args)
            .unwrap();

        assert_eq!(config.attempts, 30);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(
            config.schedule,
            TemperatureSchedule::Exponential { decay: 0.95 }
        );
        assert!(config.early_exit);
    }

    #[test]
    fn monte_carlo_defaults_to_constant_schedule() {
        let config = PartialRunConfig::default()
            .merge_with_mcdock_args(&mcdock_args(&[]))
            .unwrap();
        assert_eq!(config.temperature, core_config::DEFAULT_TEMPERATURE);
        assert_eq!(config.schedule, TemperatureSchedule::Constant);
        assert!(!config.early_exit);
    }

    #[test]
    fn unsupported_set_key_is_rejected() {
        let args = dock_args(&["-S", "docking.energy=1"]);
        let result = PartialRunConfig::default().merge_with_dock_args(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("docking.energy")));
    }

    #[test]
    fn malformed_set_value_is_rejected() {
        let args = dock_args(&["-S", "docking.attempts=many"]);
        let result = PartialRunConfig::default().merge_with_dock_args(&args);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn unknown_file_keys_are_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(&dir, "[docking]\ntemperature = 3\n");
        let result = PartialRunConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn zero_attempts_is_a_config_error() {
        let args = dock_args(&["--attempts", "0"]);
        let result = PartialRunConfig::default().merge_with_dock_args(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("attempts")));
    }

    #[test]
    fn set_value_without_equals_is_an_argument_error() {
        let args = dock_args(&["-S", "docking.attempts"]);
        let result = PartialRunConfig::default().merge_with_dock_args(&args);
        assert!(matches!(result, Err(CliError::Argument(_))));
    }
}
