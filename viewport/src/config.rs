//! Window configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file is a valid
//! configuration.
//!
//! # Resolution
//!
//! [`Config::load_with_overrides`] picks the first of: a path given on the
//! command line, a discovered path, the embedded `config.toml` shipped with
//! this crate.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Animate scroll jumps. When off, jumps land in one step.
    pub smooth_scroll: bool,

    /// Gutter shows distance from the cursor line instead of line numbers.
    pub relative_line_numbers: bool,

    /// Delay between animation ticks. 16ms is roughly 60 frames per second.
    pub tick_interval_ms: u64,

    /// Depth of each window's request queue.
    pub queue_capacity: usize,

    /// How long a new smooth scroll may wait for the queue before it is
    /// dropped.
    pub enqueue_timeout_ms: u64,

    /// Horizontal padding around gutter numbers in pixels.
    pub gutter_padding: i32,

    /// Margin kept around the cursor by non-animated jumps, in pixels.
    pub ensure_visible_margin: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            smooth_scroll: true,
            relative_line_numbers: true,
            tick_interval_ms: 16,
            queue_capacity: 1000,
            enqueue_timeout_ms: 50,
            gutter_padding: 10,
            ensure_visible_margin: 20,
        }
    }
}

impl Config {
    /// Read and deserialize a TOML config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration with priority: CLI override > discovered path > embedded.
    pub fn load_with_overrides(
        cli_override: Option<&Path>,
        discovered_path: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = cli_override {
            return Self::load(path);
        }
        if let Some(path) = discovered_path {
            return Self::load(path);
        }
        Self::load_embedded()
    }

    fn load_embedded() -> Result<Self> {
        let source = include_str!("../config.toml");
        Self::parse(source).context("Failed to parse embedded config.toml")
    }

    fn parse(source: &str) -> Result<Self> {
        let config: Config = toml::from_str(source)?;
        anyhow::ensure!(config.queue_capacity > 0, "queue_capacity must be at least 1");
        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }
}
