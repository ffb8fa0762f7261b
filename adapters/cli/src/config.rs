use std::{fs, path::Path};

use anyhow::{Context, Result};
use botcleaner_core::{PlacementMode, RoomConfig};
use clap::Args;

/// Individual flags that take precedence over the configuration file.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct Overrides {
    /// Number of columns in the room.
    #[arg(long)]
    width: Option<u32>,
    /// Number of rows in the room.
    #[arg(long)]
    height: Option<u32>,
    /// Robot count, only honoured by random placement.
    #[arg(long)]
    robots: Option<u32>,
    /// Share of the room that starts dirty, between 0 and 1.
    #[arg(long = "dirty")]
    dirty_fraction: Option<f64>,
    /// Share of the room covered by furniture, between 0 and 1.
    #[arg(long = "furniture")]
    furniture_fraction: Option<f64>,
    /// Robot placement: `fixed` (corners) or `random`.
    #[arg(long)]
    placement: Option<PlacementMode>,
    /// Seed for the run; omitted seeds are drawn at start-up and logged.
    #[arg(long)]
    seed: Option<u64>,
}

impl Overrides {
    fn apply(&self, config: &mut RoomConfig) {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(robots) = self.robots {
            config.robots = robots;
        }
        if let Some(fraction) = self.dirty_fraction {
            config.dirty_fraction = fraction;
        }
        if let Some(fraction) = self.furniture_fraction {
            config.furniture_fraction = fraction;
        }
        if let Some(placement) = self.placement {
            config.placement = placement;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

/// Layers defaults, the optional TOML file and command-line overrides.
pub(crate) fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<RoomConfig> {
    let mut config = match path {
        Some(path) => load(path)?,
        None => RoomConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("invalid room configuration")?;
    Ok(config)
}

fn load(path: &Path) -> Result<RoomConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config file {}", path.display()))
}
