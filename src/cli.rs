use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, value_parser};
use tracing::{debug, info, warn};

use crate::BenchmarkHarness;
use crate::config::{BenchSettings, default_config_path};
use crate::options::{RasterizeAndRecordOptions, option_specs};
use crate::platform::Platform;
use crate::registry::find_benchmark;
use crate::telemetry;

#[derive(Parser, Debug)]
#[command(name = "rasterbench", version, about = "Rasterize and record micro-benchmark harness", long_about = None)]
pub struct Cli {
    /// Increase logging verbosity.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    pub verbose: bool,

    /// Custom config path.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Location to write run plans (defaults to the platform data directory).
    #[arg(long, value_parser = value_parser!(PathBuf), global = true)]
    pub output: Option<PathBuf>,

    /// Evaluate platform policies as if running on this platform.
    #[arg(long, value_enum, global = true)]
    pub platform: Option<Platform>,

    #[command(subcommand)]
    pub command: BenchCommand,
}

#[derive(Subcommand, Debug)]
pub enum BenchCommand {
    /// List benchmarks enabled on the current platform.
    List(ListCommand),
    /// Show a benchmark's page set, platform policy and options.
    Describe(DescribeCommand),
    /// Prepare a benchmark run and write its plan.
    Run(RunCommand),
}

#[derive(Args, Debug)]
pub struct ListCommand {
    /// Include benchmarks disabled on the current platform.
    #[arg(long, action = ArgAction::SetTrue)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct DescribeCommand {
    /// Benchmark name or page set label (e.g. top_25_smooth or Top25SmoothPageSet).
    pub benchmark: String,
}

#[derive(Args, Debug)]
pub struct RunCommand {
    /// Benchmark name (e.g. rasterize_and_record_micro.top_25_smooth or top_25_smooth).
    pub benchmark: String,

    /// Prepare the benchmark even if its platform policy disables it.
    #[arg(long, action = ArgAction::SetTrue)]
    pub also_run_disabled: bool,

    /// Print the plan without writing it to the output directory.
    #[arg(long, action = ArgAction::SetTrue)]
    pub print_only: bool,

    #[command(flatten)]
    pub options: RasterizeAndRecordOptions,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => default_config_path()?,
    };
    let settings = BenchSettings::load_or_default(&config_path)?;
    telemetry::init_tracing("rasterbench", cli.verbose, &settings.traces)?;
    info!(path = %config_path.display(), "using harness config");
    if let Some(trace) = telemetry::current_trace_file() {
        info!(path = %trace.display(), "exporting traces");
    }
    match telemetry::trace_report(&settings.traces) {
        Ok(traces) => debug!(
            enabled = traces.enabled,
            directory = ?traces.directory,
            recent = traces.recent_files.len(),
            "trace export state"
        ),
        Err(err) => warn!(error = %err, "unable to inspect trace directory"),
    }

    let mut harness = BenchmarkHarness::from_settings(settings)?;
    if let Some(platform) = cli.platform {
        harness = harness.with_platform(platform);
    }
    if let Some(output) = cli.output.clone() {
        harness = harness.with_output_root(output);
    }

    info!(path = %harness.output_root().display(), platform = %harness.platform(), "benchmark output root");

    match &cli.command {
        BenchCommand::List(cmd) => handle_list(&harness, cmd),
        BenchCommand::Describe(cmd) => handle_describe(&harness, cmd),
        BenchCommand::Run(cmd) => handle_run(&harness, cmd),
    }
}

fn handle_list(harness: &BenchmarkHarness, cmd: &ListCommand) -> Result<()> {
    let listings = harness.list(cmd.all);
    if listings.is_empty() {
        println!(
            "No benchmarks enabled on {} (pass --all to include disabled ones)",
            harness.platform()
        );
        return Ok(());
    }
    for listing in listings {
        let marker = if listing.enabled { "" } else { " [disabled]" };
        println!(
            "{:<45} {}{marker}",
            listing.benchmark.name(),
            listing.benchmark.description()
        );
    }
    Ok(())
}

fn handle_describe(harness: &BenchmarkHarness, cmd: &DescribeCommand) -> Result<()> {
    let Some(benchmark) = find_benchmark(&cmd.benchmark) else {
        anyhow::bail!("Unknown benchmark '{}'", cmd.benchmark);
    };
    let page_set = benchmark.page_set();
    let enabled = if benchmark.is_enabled_on(harness.platform()) {
        "enabled"
    } else {
        "disabled"
    };

    println!("{}", benchmark.name());
    println!("  {}", benchmark.long_description().replace('\n', "\n  "));
    println!(
        "  platform policy: {} ({enabled} on {})",
        benchmark.policy().describe(),
        harness.platform()
    );
    println!(
        "  page set: {} ({} pages, archive {})",
        page_set.label,
        page_set.len(),
        page_set.archive_data_file
    );
    println!("    {}", page_set.description);
    for page in page_set.pages {
        println!("    {page}");
    }
    println!("  options:");
    for spec in option_specs() {
        println!(
            "    --{:<26} {:<6} default {:<6} {}",
            spec.long, spec.kind, spec.default, spec.help
        );
    }
    Ok(())
}

fn handle_run(harness: &BenchmarkHarness, cmd: &RunCommand) -> Result<()> {
    let plan = harness.prepare(&cmd.benchmark, &cmd.options, cmd.also_run_disabled)?;

    match (&plan.command, &plan.command_error) {
        (Some(command), _) => println!("{}", command.describe()),
        (None, Some(error)) => println!("(no browser command: {error})"),
        (None, None) => {}
    }
    println!(
        "{} on {}: {} pages, start wait {:?}, timeout {:?}",
        plan.benchmark,
        plan.platform,
        plan.pages.len(),
        plan.page_test.start_wait(),
        plan.page_test.timeout()
    );

    if cmd.print_only {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let path = harness.write_plan(&plan)?;
    println!("Plan written to {}", path.display());
    Ok(())
}
