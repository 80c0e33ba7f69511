use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use pdfdl_core::{
    Downloader, DryRunDownloader, FileDownloader, FilenameResolver, HttpFetcher, TraversalEngine,
};

use crate::app::{config_runtime, exit_handler, input_processor, progress_manager, terminal};
use crate::app_config::load_default_file_config;
use crate::{ProcessExit, output};

pub(crate) async fn run_pdfdl() -> Result<ProcessExit> {
    let (args, cli_sources) = config_runtime::parse_cli_with_sources();

    let file_config = load_default_file_config()?;
    let args = config_runtime::apply_config_defaults(args, &cli_sources, file_config.as_ref())?;

    let default_level = config_runtime::resolve_default_log_level(&args);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    let no_color = terminal::no_color_env_requested() || terminal::is_dumb_terminal();
    terminal::init_tracing(default_level, force_cli_log_level, no_color);

    debug!(?args, "CLI arguments resolved");
    info!("pdfdl starting");

    let seeds = input_processor::collect_seeds(&args)?;
    if seeds.is_empty() {
        output::print_usage_hint();
        return Ok(ProcessExit::Failure);
    }

    prepare_output_dir(&args.output_dir, args.dry_run)?;

    let fetcher = HttpFetcher::new(&config_runtime::fetcher_config(&args))
        .context("Failed to build HTTP client")?;
    let downloader: Arc<dyn Downloader> = if args.dry_run {
        info!("Dry run: PDFs will not be written");
        Arc::new(DryRunDownloader)
    } else {
        Arc::new(FileDownloader::new())
    };

    let mut engine = TraversalEngine::new(
        Arc::new(fetcher),
        downloader,
        config_runtime::crawl_config(&args),
    );
    let use_progress_bar = terminal::should_use_progress_bar(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    if use_progress_bar {
        engine = engine.with_progress(Arc::new(progress_manager::BarProgress::new()));
    }

    info!(seeds = seeds.len(), output_dir = %args.output_dir.display(), "Starting crawl");
    let names = FilenameResolver::new(&args.output_dir, args.overwrite);
    let report = engine.run(&seeds, names).await;

    if !args.quiet {
        output::print_completion_summary(&report, &args.output_dir, args.dry_run);
    }
    if let Some(path) = args.report.as_deref() {
        output::write_report(path, &report)?;
    }

    Ok(exit_handler::determine_exit_outcome(&report))
}

/// Creates the output directory if missing; an existing non-directory is an error.
fn prepare_output_dir(output_dir: &Path, dry_run: bool) -> Result<()> {
    if output_dir.exists() {
        if !output_dir.is_dir() {
            bail!(
                "Output path '{}' exists but is not a directory",
                output_dir.display()
            );
        }
        return Ok(());
    }
    if dry_run {
        debug!(dir = %output_dir.display(), "Dry run: not creating output directory");
        return Ok(());
    }
    fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory '{}'", output_dir.display())
    })?;
    info!(dir = %output_dir.display(), "Created output directory");
    Ok(())
}
