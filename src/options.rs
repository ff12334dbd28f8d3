use anyhow::Result;
use clap::{ArgAction, ArgMatches, Args, Command, FromArgMatches};
use serde::{Deserialize, Serialize};

const START_WAIT_TIME_HELP: &str =
    "Wait time before the benchmark is started (must be long enough to load all content)";
const RASTERIZE_REPEAT_HELP: &str =
    "Repeat each raster this many times. Increase this value to reduce variance";
const RECORD_REPEAT_HELP: &str =
    "Repeat each record this many times. Increase this value to reduce variance";
const TIMEOUT_HELP: &str =
    "The length of time to wait for the micro benchmark to finish, expressed in seconds";
const REPORT_DETAILED_RESULTS_HELP: &str = "Whether to report additional detailed results";

/// Command-line options shared by every rasterize-and-record benchmark.
#[derive(Args, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterizeAndRecordOptions {
    #[arg(long, default_value_t = 2.0, help = START_WAIT_TIME_HELP)]
    pub start_wait_time: f64,

    #[arg(long, default_value_t = 100, help = RASTERIZE_REPEAT_HELP)]
    pub rasterize_repeat: u32,

    #[arg(long, default_value_t = 100, help = RECORD_REPEAT_HELP)]
    pub record_repeat: u32,

    #[arg(long, default_value_t = 120, help = TIMEOUT_HELP)]
    pub timeout: u64,

    #[arg(long, action = ArgAction::SetTrue, default_value_t = false, help = REPORT_DETAILED_RESULTS_HELP)]
    pub report_detailed_results: bool,
}

impl Default for RasterizeAndRecordOptions {
    fn default() -> Self {
        Self {
            start_wait_time: 2.0,
            rasterize_repeat: 100,
            record_repeat: 100,
            timeout: 120,
            report_detailed_results: false,
        }
    }
}

impl RasterizeAndRecordOptions {
    /// Register the benchmark flags on `command`.
    pub fn add_benchmark_command_line_args(command: Command) -> Command {
        <Self as Args>::augment_args(command)
    }

    /// Read the benchmark flags back out of matches produced by a command
    /// that went through [`Self::add_benchmark_command_line_args`].
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        Ok(<Self as FromArgMatches>::from_arg_matches(matches)?)
    }
}

/// Value type an option is coerced to by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Float,
    Int,
    Flag,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OptionKind::Float => "float",
            OptionKind::Int => "int",
            OptionKind::Flag => "flag",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub long: &'static str,
    pub kind: OptionKind,
    pub default: &'static str,
    pub help: &'static str,
}

const OPTION_SPECS: &[OptionSpec] = &[
    OptionSpec {
        long: "start-wait-time",
        kind: OptionKind::Float,
        default: "2",
        help: START_WAIT_TIME_HELP,
    },
    OptionSpec {
        long: "rasterize-repeat",
        kind: OptionKind::Int,
        default: "100",
        help: RASTERIZE_REPEAT_HELP,
    },
    OptionSpec {
        long: "record-repeat",
        kind: OptionKind::Int,
        default: "100",
        help: RECORD_REPEAT_HELP,
    },
    OptionSpec {
        long: "timeout",
        kind: OptionKind::Int,
        default: "120",
        help: TIMEOUT_HELP,
    },
    OptionSpec {
        long: "report-detailed-results",
        kind: OptionKind::Flag,
        default: "false",
        help: REPORT_DETAILED_RESULTS_HELP,
    },
];

/// Flags contributed by [`RasterizeAndRecordOptions`], in registration order.
pub fn option_specs() -> &'static [OptionSpec] {
    OPTION_SPECS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench_command() -> Command {
        RasterizeAndRecordOptions::add_benchmark_command_line_args(Command::new("bench"))
    }

    fn parse(args: &[&str]) -> Result<RasterizeAndRecordOptions> {
        let matches = bench_command().try_get_matches_from(
            std::iter::once("bench").chain(args.iter().copied()),
        )?;
        RasterizeAndRecordOptions::from_matches(&matches)
    }

    #[test]
    fn registers_exactly_the_documented_flags() {
        let command = bench_command();
        let registered: Vec<(String, Vec<String>, String)> = command
            .get_arguments()
            .map(|arg| {
                (
                    arg.get_long().unwrap_or_default().to_string(),
                    arg.get_default_values()
                        .iter()
                        .map(|value| value.to_string_lossy().into_owned())
                        .collect(),
                    arg.get_help().map(|help| help.to_string()).unwrap_or_default(),
                )
            })
            .collect();

        let expected: Vec<(String, Vec<String>, String)> = option_specs()
            .iter()
            .map(|spec| {
                (
                    spec.long.to_string(),
                    vec![spec.default.to_string()],
                    spec.help.to_string(),
                )
            })
            .collect();

        assert_eq!(registered, expected);
    }

    #[test]
    fn defaults_match_documented_values() {
        let options = parse(&[]).unwrap();
        assert_eq!(options, RasterizeAndRecordOptions::default());
        assert_eq!(options.start_wait_time, 2.0);
        assert_eq!(options.rasterize_repeat, 100);
        assert_eq!(options.record_repeat, 100);
        assert_eq!(options.timeout, 120);
        assert!(!options.report_detailed_results);
    }

    #[test]
    fn detailed_results_flag_registers_false_default() {
        let command = bench_command();
        let arg = command
            .get_arguments()
            .find(|arg| arg.get_long() == Some("report-detailed-results"))
            .expect("flag registered");
        let defaults: Vec<_> = arg.get_default_values().iter().collect();
        assert_eq!(defaults, ["false"]);
    }

    #[test]
    fn overrides_are_applied() {
        let options = parse(&["--rasterize-repeat=50", "--report-detailed-results"]).unwrap();
        assert_eq!(options.rasterize_repeat, 50);
        assert!(options.report_detailed_results);
        assert_eq!(options.record_repeat, 100);

        let options = parse(&["--start-wait-time", "0.5", "--timeout", "30"]).unwrap();
        assert_eq!(options.start_wait_time, 0.5);
        assert_eq!(options.timeout, 30);
    }

    #[test]
    fn parser_rejects_mistyped_values() {
        assert!(parse(&["--rasterize-repeat=many"]).is_err());
        assert!(parse(&["--timeout=1.5"]).is_err());
        assert!(parse(&["--start-wait-time=soon"]).is_err());
        assert!(parse(&["--record-repeat=-1"]).is_err());
    }
}
