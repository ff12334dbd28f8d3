pub mod browser;
pub mod cli;
pub mod config;
pub mod options;
pub mod page_sets;
pub mod plan;
pub mod platform;
pub mod registry;
pub mod telemetry;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::browser::ChromiumBrowser;
use crate::config::BenchSettings;
use crate::options::RasterizeAndRecordOptions;
use crate::plan::RunPlan;
use crate::platform::Platform;
use crate::registry::{RasterizeAndRecordBenchmark, find_benchmark};

/// Entry in a benchmark listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkListing {
    pub benchmark: RasterizeAndRecordBenchmark,
    pub enabled: bool,
}

/// Selects benchmarks for a platform and prepares their runs.
pub struct BenchmarkHarness {
    platform: Platform,
    output_root: PathBuf,
    browser: ChromiumBrowser,
}

impl BenchmarkHarness {
    /// Construct a harness using explicit settings.
    pub fn from_settings(settings: BenchSettings) -> Result<Self> {
        let platform = settings.resolve_platform();
        let output_root = settings.resolve_output_root()?;
        let browser = ChromiumBrowser::new(settings.browser);
        Ok(Self {
            platform,
            output_root,
            browser,
        })
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_output_root(mut self, output_root: PathBuf) -> Self {
        self.output_root = output_root;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Benchmarks in registration order; disabled ones only when `include_disabled`.
    pub fn list(&self, include_disabled: bool) -> Vec<BenchmarkListing> {
        RasterizeAndRecordBenchmark::ALL
            .into_iter()
            .map(|benchmark| BenchmarkListing {
                benchmark,
                enabled: benchmark.is_enabled_on(self.platform),
            })
            .filter(|listing| include_disabled || listing.enabled)
            .collect()
    }

    /// Resolve `name`, apply the platform policy and build the run plan.
    pub fn prepare(
        &self,
        name: &str,
        options: &RasterizeAndRecordOptions,
        also_run_disabled: bool,
    ) -> Result<RunPlan> {
        let Some(benchmark) = find_benchmark(name) else {
            bail!("Unknown benchmark '{name}'; run `rasterbench list --all` to see registered benchmarks");
        };

        let span = info_span!(
            "harness.prepare",
            benchmark = %benchmark,
            platform = %self.platform,
            also_run_disabled
        );
        let _span_guard = span.enter();

        let enabled = benchmark.is_enabled_on(self.platform);
        if !enabled {
            if !also_run_disabled {
                bail!(
                    "Benchmark {benchmark} is {} (current platform: {}); pass --also-run-disabled to force it",
                    benchmark.policy().describe(),
                    self.platform
                );
            }
            warn!(policy = %benchmark.policy().describe(), "running benchmark outside its platform policy");
        }

        let page_set = benchmark.page_set();
        let pages = page_set
            .urls()?
            .into_iter()
            .map(|url| url.to_string())
            .collect::<Vec<_>>();

        let page_test = benchmark.create_page_test(options);
        debug!(?page_test, "created page test");

        let (command, command_error) = match self.browser.build_command(&page_test, page_set) {
            Ok(command) => (Some(command), None),
            Err(err) => {
                warn!(error = %err, "browser command unavailable");
                (None, Some(err.to_string()))
            }
        };

        let plan = RunPlan {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            benchmark: benchmark.name().to_string(),
            description: benchmark.long_description(),
            platform: self.platform,
            enabled_on_platform: enabled,
            page_set: page_set.label.to_string(),
            archive_data_file: page_set.archive_data_file.to_string(),
            options: options.clone(),
            metrics: page_test
                .result_metrics()
                .into_iter()
                .map(str::to_string)
                .collect(),
            script: page_test.micro_benchmark_script(),
            page_test,
            command,
            command_error,
            pages,
        };

        info!(
            run = %plan.run_id,
            page_set = %plan.page_set,
            pages = plan.pages.len(),
            "prepared benchmark run"
        );
        Ok(plan)
    }

    /// Write `plan` below the output root.
    pub fn write_plan(&self, plan: &RunPlan) -> Result<PathBuf> {
        let path = plan
            .write_to(&self.output_root)
            .with_context(|| format!("Failed to store plan for {}", plan.benchmark))?;
        info!(path = %path.display(), "wrote run plan");
        Ok(path)
    }
}
