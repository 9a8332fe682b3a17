//! Run configuration loaded from an optional TOML file.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use terminal_abyss_core::GameConfig;

const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Viewport size used when neither the file nor the flags give one.
pub(crate) const DEFAULT_COLUMNS: usize = 80;
pub(crate) const DEFAULT_ROWS: usize = 24;

/// Settings read from a configuration file.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RunConfig {
    pub(crate) game: GameConfig,
    pub(crate) columns: usize,
    pub(crate) rows: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    version: u32,
    #[serde(default)]
    game: GameConfig,
    #[serde(default)]
    viewport: ViewportSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ViewportSection {
    columns: usize,
    rows: usize,
}

impl Default for ViewportSection {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
        }
    }
}

/// Loads the configuration at `path`, or the defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid config at {}", path.display()))
}

fn parse(contents: &str) -> Result<RunConfig> {
    let file: ConfigFile = toml::from_str(contents).context("failed to parse config toml")?;
    if file.version != SUPPORTED_CONFIG_VERSION {
        bail!(
            "unsupported config version {}; expected {}",
            file.version,
            SUPPORTED_CONFIG_VERSION
        );
    }
    file.game.validate().context("game settings rejected")?;
    Ok(RunConfig {
        game: file.game,
        columns: file.viewport.columns,
        rows: file.viewport.rows,
    })
}
