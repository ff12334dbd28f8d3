use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Operating systems a benchmark can be enabled or disabled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mac,
    Win,
    Linux,
    #[value(name = "chromeos")]
    #[serde(rename = "chromeos")]
    ChromeOs,
    Android,
}

impl Platform {
    /// Platform of the compile target. Unknown targets are treated as linux.
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "macos") {
            Platform::Mac
        } else if cfg!(target_os = "windows") {
            Platform::Win
        } else {
            Platform::Linux
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Mac => "mac",
            Platform::Win => "win",
            Platform::Linux => "linux",
            Platform::ChromeOs => "chromeos",
            Platform::Android => "android",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Declarative rule deciding where a benchmark may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformPolicy {
    /// Runs everywhere except the listed platforms.
    Disabled(&'static [Platform]),
    /// Runs only on the listed platforms.
    Enabled(&'static [Platform]),
}

impl PlatformPolicy {
    pub fn allows(&self, platform: Platform) -> bool {
        match self {
            PlatformPolicy::Disabled(list) => !list.contains(&platform),
            PlatformPolicy::Enabled(list) => list.contains(&platform),
        }
    }

    pub fn describe(&self) -> String {
        let join = |list: &[Platform]| {
            list.iter()
                .map(Platform::name)
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            PlatformPolicy::Disabled(list) => format!("disabled on {}", join(list)),
            PlatformPolicy::Enabled(list) => format!("enabled only on {}", join(list)),
        }
    }
}
