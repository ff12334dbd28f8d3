use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::browser::CommandSpec;
use crate::options::RasterizeAndRecordOptions;
use crate::page_test::RasterizeAndRecordMicro;
use crate::platform::Platform;

/// Everything the browser driver needs to execute one benchmark run.
#[derive(Debug, Clone, Serialize)]
pub struct RunPlan {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub benchmark: String,
    pub description: String,
    pub platform: Platform,
    /// False when the run was forced past the platform policy.
    pub enabled_on_platform: bool,
    pub page_set: String,
    pub archive_data_file: String,
    pub options: RasterizeAndRecordOptions,
    pub page_test: RasterizeAndRecordMicro,
    pub metrics: Vec<String>,
    pub script: String,
    pub command: Option<CommandSpec>,
    pub command_error: Option<String>,
    pub pages: Vec<String>,
}

impl RunPlan {
    /// Persist the plan as pretty JSON below `directory`, returning the file path.
    pub fn write_to(&self, directory: &Path) -> Result<PathBuf> {
        fs::create_dir_all(directory).with_context(|| {
            format!("Failed to create output directory {}", directory.display())
        })?;

        let stem = format!(
            "{}-{}",
            self.benchmark,
            self.created_at.format("%Y%m%dT%H%M%SZ")
        );
        let mut path = directory.join(format!("{stem}.json"));
        let mut counter = 0;
        while path.exists() {
            counter += 1;
            path = directory.join(format!("{stem}-{counter}.json"));
        }

        let rendered = serde_json::to_string_pretty(self)?;
        fs::write(&path, rendered)
            .with_context(|| format!("Failed to write run plan to {}", path.display()))?;
        Ok(path)
    }
}
