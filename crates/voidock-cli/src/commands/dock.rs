use crate::cli::DockArgs;
use crate::config::PartialRunConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use tracing::info;
use voidock::engine::progress::ProgressReporter;
use voidock::workflows;

pub fn run(args: DockArgs) -> Result<()> {
    let partial_config = PartialRunConfig::load(args.common.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let final_config = partial_config.merge_with_dock_args(&args)?;

    let (host, guest) = super::load_structures(&args.common)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting docking ({} strategy)...", final_config.strategy);
    info!("Invoking the core docking workflow...");

    let result = workflows::dock::run(&host, &guest, &final_config, &reporter)?;

    info!(
        "Workflow finished, loaded {} guest(s) across {} pose(s).",
        result.loading(),
        result.candidates().len()
    );

    let written = super::write_results(&args.common, "dock", &final_config, &result)?;
    super::report_outcome(&args.common, &result, written);

    Ok(())
}
