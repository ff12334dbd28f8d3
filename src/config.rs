use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::platform::Platform;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "chromium", "rasterbench")
        .context("Unable to resolve platform data directory")
}

/// User configuration for the benchmark harness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchSettings {
    /// Optional override for where run plans are written.
    #[serde(default)]
    pub output_root: Option<PathBuf>,
    /// Platform to evaluate enablement policies against; host platform when unset.
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub traces: TraceSettings,
}

impl BenchSettings {
    /// Load settings from disk, writing defaults if missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Unable to read config at {}", path.display()))?;
            let parsed: Self = serde_json::from_str(&raw)
                .with_context(|| format!("Malformed config at {}", path.display()))?;
            Ok(parsed)
        } else {
            let settings = Self::default();
            settings.save(path)?;
            Ok(settings)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }
        let serialised = serde_json::to_string_pretty(self)?;
        fs::write(path, serialised)
            .with_context(|| format!("Failed to persist config to {}", path.display()))
    }

    /// Resolve the directory that receives run plans.
    pub fn resolve_output_root(&self) -> Result<PathBuf> {
        if let Some(path) = &self.output_root {
            return Ok(path.clone());
        }
        Ok(project_dirs()?.data_dir().join("benchmarks"))
    }

    pub fn resolve_platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }
}

/// Browser binary and switches used when preparing runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default)]
    pub binary_path: Option<PathBuf>,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Controls structured tracing export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "TraceSettings::default_max_files")]
    pub max_files: usize,
}

impl TraceSettings {
    const fn default_max_files() -> usize {
        10
    }

    pub fn resolve_directory(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.directory {
            return Ok(dir.clone());
        }
        Ok(project_dirs()?.cache_dir().join("traces"))
    }
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: None,
            max_files: Self::default_max_files(),
        }
    }
}

/// Compute the default path to the harness configuration file.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_is_written_with_defaults() {
        let dir = tempdir().expect("temp directory");
        let path = dir.path().join("nested").join("config.json");

        let settings = BenchSettings::load_or_default(&path).expect("defaults");
        assert!(path.exists());
        assert!(settings.output_root.is_none());
        assert!(settings.platform.is_none());
        assert_eq!(settings.traces.max_files, 10);
        assert!(!settings.traces.enabled);
    }

    #[test]
    fn saved_settings_are_reloaded() {
        let dir = tempdir().expect("temp directory");
        let path = dir.path().join("config.json");

        let mut settings = BenchSettings::default();
        settings.platform = Some(Platform::Android);
        settings.output_root = Some(dir.path().join("plans"));
        settings.browser.extra_args = vec!["--disable-gpu-vsync".into()];
        settings.save(&path).expect("save");

        let reloaded = BenchSettings::load_or_default(&path).expect("reload");
        assert_eq!(reloaded.resolve_platform(), Platform::Android);
        assert_eq!(reloaded.resolve_output_root().unwrap(), dir.path().join("plans"));
        assert_eq!(reloaded.browser.extra_args, vec!["--disable-gpu-vsync"]);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempdir().expect("temp directory");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "traces": { "enabled": true } }"#).unwrap();

        let settings = BenchSettings::load_or_default(&path).expect("parse");
        assert!(settings.traces.enabled);
        assert_eq!(settings.traces.max_files, 10);
        assert!(settings.browser.binary_path.is_none());
    }

    #[test]
    fn malformed_config_reports_path() {
        let dir = tempdir().expect("temp directory");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = BenchSettings::load_or_default(&path).unwrap_err();
        assert!(err.to_string().contains("Malformed config"));
    }
}
