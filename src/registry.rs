use clap::Command;

use crate::options::RasterizeAndRecordOptions;
use crate::page_sets::{self, PageSet, find_page_set};
use crate::page_test::RasterizeAndRecordMicro;
use crate::platform::{Platform, PlatformPolicy};

const NAME_PREFIX: &str = "rasterize_and_record_micro";

const RENDERING_BENCHMARKS_DOC: &str =
    "http://www.chromium.org/developers/design-documents/rendering-benchmarks";

/// The rasterize-and-record benchmark variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterizeAndRecordBenchmark {
    Top25,
    KeyMobileSites,
    KeySilkCases,
    Polymer,
}

/// Static registration data for one variant.
#[derive(Debug)]
pub struct BenchmarkInfo {
    pub variant: RasterizeAndRecordBenchmark,
    /// Discoverable name (`rasterize_and_record_micro.<suffix>`).
    pub name: &'static str,
    pub class_name: &'static str,
    pub description: &'static str,
    pub page_set: &'static PageSet,
    pub policy: PlatformPolicy,
}

// Disabled on mac (crbug.com/350684) and windows (crbug.com/338057).
const DESKTOP_EXCLUSIONS: &[Platform] = &[Platform::Mac, Platform::Win];

static BENCHMARKS: [BenchmarkInfo; 4] = [
    BenchmarkInfo {
        variant: RasterizeAndRecordBenchmark::Top25,
        name: "rasterize_and_record_micro.top_25_smooth",
        class_name: "RasterizeAndRecordMicroTop25",
        description: "Measures rasterize and record performance on the top 25 web pages.",
        page_set: &page_sets::TOP_25_SMOOTH,
        policy: PlatformPolicy::Disabled(DESKTOP_EXCLUSIONS),
    },
    BenchmarkInfo {
        variant: RasterizeAndRecordBenchmark::KeyMobileSites,
        name: "rasterize_and_record_micro.key_mobile_sites",
        class_name: "RasterizeAndRecordMicroKeyMobileSites",
        description: "Measures rasterize and record performance on the key mobile sites.",
        page_set: &page_sets::KEY_MOBILE_SITES,
        policy: PlatformPolicy::Disabled(DESKTOP_EXCLUSIONS),
    },
    BenchmarkInfo {
        variant: RasterizeAndRecordBenchmark::KeySilkCases,
        name: "rasterize_and_record_micro.key_silk_cases",
        class_name: "RasterizeAndRecordMicroKeySilkCases",
        description: "Measures rasterize and record performance on the silk sites.",
        page_set: &page_sets::KEY_SILK_CASES,
        policy: PlatformPolicy::Disabled(DESKTOP_EXCLUSIONS),
    },
    BenchmarkInfo {
        variant: RasterizeAndRecordBenchmark::Polymer,
        name: "rasterize_and_record_micro.polymer",
        class_name: "RasterizeAndRecordMicroPolymer",
        description: "Measures rasterize and record performance on the Polymer cases.",
        page_set: &page_sets::POLYMER,
        policy: PlatformPolicy::Enabled(&[Platform::Android]),
    },
];

impl RasterizeAndRecordBenchmark {
    pub const ALL: [RasterizeAndRecordBenchmark; 4] = [
        RasterizeAndRecordBenchmark::Top25,
        RasterizeAndRecordBenchmark::KeyMobileSites,
        RasterizeAndRecordBenchmark::KeySilkCases,
        RasterizeAndRecordBenchmark::Polymer,
    ];

    pub fn info(&self) -> &'static BenchmarkInfo {
        match self {
            RasterizeAndRecordBenchmark::Top25 => &BENCHMARKS[0],
            RasterizeAndRecordBenchmark::KeyMobileSites => &BENCHMARKS[1],
            RasterizeAndRecordBenchmark::KeySilkCases => &BENCHMARKS[2],
            RasterizeAndRecordBenchmark::Polymer => &BENCHMARKS[3],
        }
    }

    pub fn name(&self) -> &'static str {
        self.info().name
    }

    pub fn page_set(&self) -> &'static PageSet {
        self.info().page_set
    }

    pub fn description(&self) -> &'static str {
        self.info().description
    }

    /// Description followed by the reference to the rendering benchmark docs.
    pub fn long_description(&self) -> String {
        format!("{}\n\n{RENDERING_BENCHMARKS_DOC}", self.description())
    }

    pub fn policy(&self) -> PlatformPolicy {
        self.info().policy
    }

    pub fn is_enabled_on(&self, platform: Platform) -> bool {
        self.policy().allows(platform)
    }

    /// Every variant accepts the same flags.
    pub fn add_benchmark_command_line_args(&self, command: Command) -> Command {
        RasterizeAndRecordOptions::add_benchmark_command_line_args(command)
    }

    pub fn create_page_test(&self, options: &RasterizeAndRecordOptions) -> RasterizeAndRecordMicro {
        RasterizeAndRecordMicro::new(
            options.start_wait_time,
            options.rasterize_repeat,
            options.record_repeat,
            options.timeout,
            options.report_detailed_results,
        )
    }
}

impl std::fmt::Display for RasterizeAndRecordBenchmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub fn benchmarks() -> &'static [BenchmarkInfo] {
    &BENCHMARKS
}

/// Resolve a benchmark by full name, suffix after the prefix, class name,
/// or the label of the page set it measures.
pub fn find_benchmark(name: &str) -> Option<RasterizeAndRecordBenchmark> {
    let needle = name.trim();
    if needle.is_empty() {
        return None;
    }
    benchmarks()
        .iter()
        .find(|info| {
            let suffix = info
                .name
                .strip_prefix(NAME_PREFIX)
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(info.name);
            info.name.eq_ignore_ascii_case(needle)
                || suffix.eq_ignore_ascii_case(needle)
                || info.class_name.eq_ignore_ascii_case(needle)
        })
        .map(|info| info.variant)
        .or_else(|| find_page_set(needle).and_then(benchmark_for_page_set))
}

/// The variant measuring `page_set`, matched by identity.
pub fn benchmark_for_page_set(page_set: &PageSet) -> Option<RasterizeAndRecordBenchmark> {
    benchmarks()
        .iter()
        .find(|info| std::ptr::eq(info.page_set, page_set))
        .map(|info| info.variant)
}

pub fn enabled_benchmarks(platform: Platform) -> Vec<RasterizeAndRecordBenchmark> {
    RasterizeAndRecordBenchmark::ALL
        .into_iter()
        .filter(|benchmark| benchmark.is_enabled_on(platform))
        .collect()
}
