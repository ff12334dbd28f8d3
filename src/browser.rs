use std::{env, path::PathBuf};

use anyhow::{Result, bail};
use serde::Serialize;

use crate::config::BrowserSettings;
use crate::page_sets::{PageSet, UserAgentType};
use crate::page_test::RasterizeAndRecordMicro;

pub const BINARY_ENV: &str = "RASTERBENCH_CHROME_BINARY";

const BINARY_CANDIDATES: [&str; 3] = ["chromium", "google-chrome", "chromium-browser"];

const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 4.4; Nexus 5 Build/KRT16M) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/34.0.1847.114 Mobile Safari/537.36";

/// Materialised browser invocation ready to be logged or handed to a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    binary: PathBuf,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new(binary: PathBuf, args: Vec<String>) -> Self {
        Self { binary, args }
    }

    pub fn binary(&self) -> &PathBuf {
        &self.binary
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn describe(&self) -> String {
        let args = self.args.join(" ");
        format!("{} {}", self.binary.display(), args)
    }
}

/// Chromium build the page tests run against.
#[derive(Debug, Clone)]
pub struct ChromiumBrowser {
    settings: BrowserSettings,
}

impl ChromiumBrowser {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    pub fn locate_binary(&self) -> Result<PathBuf> {
        if let Some(path) = &self.settings.binary_path {
            return Ok(path.clone());
        }
        if let Ok(path) = env::var(BINARY_ENV) {
            return Ok(PathBuf::from(path));
        }
        for candidate in BINARY_CANDIDATES {
            if let Ok(path) = which::which(candidate) {
                return Ok(path);
            }
        }
        bail!(
            "Chromium binary not found; set {BINARY_ENV} or configure browser.binary_path"
        )
    }

    pub fn build_command(
        &self,
        page_test: &RasterizeAndRecordMicro,
        page_set: &PageSet,
    ) -> Result<CommandSpec> {
        let binary = self.locate_binary()?;
        let mut args = page_test.browser_args();
        args.extend(["--no-first-run".into(), "--remote-debugging-port=0".into()]);
        if page_set.user_agent == UserAgentType::Mobile {
            args.push(format!("--user-agent={MOBILE_USER_AGENT}"));
        }
        let args = merge_args(args, self.settings.extra_args.clone());
        Ok(CommandSpec::new(binary, args))
    }
}

/// Name part of a switch (`--user-agent=x` -> `--user-agent`).
fn switch_name(arg: &str) -> &str {
    arg.split_once('=').map_or(arg, |(name, _)| name)
}

/// Concatenate switches; a switch given again replaces the earlier one and
/// takes the later position.
fn merge_args(base: Vec<String>, extras: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(base.len() + extras.len());
    for arg in base.into_iter().chain(extras) {
        let name = switch_name(&arg);
        merged.retain(|existing| switch_name(existing) != name);
        merged.push(arg);
    }
    merged
}
