use crate::cli::McDockArgs;
use crate::config::PartialRunConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use tracing::info;
use voidock::engine::progress::ProgressReporter;
use voidock::workflows;

pub fn run(args: McDockArgs) -> Result<()> {
    let partial_config = PartialRunConfig::load(args.common.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let final_config = partial_config.merge_with_mcdock_args(&args)?;

    let (host, guest) = super::load_structures(&args.common)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting Monte Carlo docking (T = {}, {} trial(s) per guest)...",
        final_config.temperature, final_config.attempts
    );
    info!("Invoking the core Monte Carlo workflow...");

    let result = workflows::mcdock::run(&host, &guest, &final_config, &reporter)?;

    info!(
        "Workflow finished, loaded {} guest(s) across {} pose(s).",
        result.loading(),
        result.candidates().len()
    );

    let written = super::write_results(&args.common, "mcdock", &final_config, &result)?;
    super::report_outcome(&args.common, &result, written);

    Ok(())
}
