//! Room configuration supplied once when a world is constructed.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::CellCoord;

/// Number of robots produced by [`PlacementMode::Fixed`], one per grid corner.
const FIXED_START_COUNT: usize = 4;

/// How robots are positioned when the room is initialised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMode {
    /// One robot in each of the four grid corners, whatever the configured count.
    #[default]
    #[serde(alias = "Fija", alias = "fija")]
    Fixed,
    /// Configured number of robots on distinct positions sampled from the
    /// positions left free by furniture.
    Random,
}

impl fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Random => write!(f, "random"),
        }
    }
}

impl FromStr for PlacementMode {
    type Err = ParsePlacementModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fixed" | "fija" => Ok(Self::Fixed),
            "random" => Ok(Self::Random),
            _ => Err(ParsePlacementModeError {
                value: value.to_owned(),
            }),
        }
    }
}

/// Error returned when a placement mode label is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown placement mode `{value}`; expected `fixed` or `random`")]
pub struct ParsePlacementModeError {
    value: String,
}

/// Initialisation step that ran out of free positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementStage {
    /// Sampling furniture positions from the whole grid.
    Furniture,
    /// Sampling dirty cells from the positions left free by furniture.
    Dirt,
    /// Sampling robot start positions from the positions left free by furniture.
    Robots,
}

impl fmt::Display for PlacementStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Furniture => write!(f, "furniture pieces"),
            Self::Dirt => write!(f, "dirty cells"),
            Self::Robots => write!(f, "robots"),
        }
    }
}

/// Reasons a room configuration or layout is rejected before simulation starts.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The grid has no positions at all.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid {
        /// Configured number of columns.
        width: u32,
        /// Configured number of rows.
        height: u32,
    },
    /// No robot was requested.
    #[error("at least one robot is required")]
    NoRobots,
    /// More robots than identifiers can address.
    #[error("{count} robots exceed the supported maximum")]
    TooManyRobots {
        /// Number of robots in the layout.
        count: usize,
    },
    /// A fraction is not a finite number within `[0, 1]`.
    #[error("{field} fraction {value} must lie within [0, 1]")]
    FractionOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },
    /// A sampling step requested more positions than the pool holds.
    #[error("cannot place {requested} {stage}: only {available} free positions remain")]
    PoolExhausted {
        /// Step that failed.
        stage: PlacementStage,
        /// Number of positions the step asked for.
        requested: usize,
        /// Number of positions left in the pool.
        available: usize,
    },
    /// A layout references a position outside the grid.
    #[error("position {cell} lies outside the {width}x{height} grid")]
    OutOfBounds {
        /// Offending position.
        cell: CellCoord,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
    /// A layout lists the same furniture or dirty position twice.
    #[error("position {cell} is listed more than once")]
    DuplicatePosition {
        /// Repeated position.
        cell: CellCoord,
    },
    /// A layout marks a furniture position as dirty.
    #[error("dirty cell {cell} overlaps furniture")]
    DirtOnFurniture {
        /// Position claimed by both.
        cell: CellCoord,
    },
}

/// Parameters that describe a room before it is populated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoomConfig {
    /// Number of columns in the grid.
    pub width: u32,
    /// Number of rows in the grid.
    pub height: u32,
    /// Requested robot count; ignored by [`PlacementMode::Fixed`], which always yields four.
    pub robots: u32,
    /// Share of the whole grid area that starts dirty.
    pub dirty_fraction: f64,
    /// Share of the whole grid area covered by furniture.
    pub furniture_fraction: f64,
    /// How robot start positions are chosen.
    pub placement: PlacementMode,
    /// Seed for the run's random source; `None` lets the world pick one.
    pub seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            robots: 4,
            dirty_fraction: 0.3,
            furniture_fraction: 0.1,
            placement: PlacementMode::Fixed,
            seed: None,
        }
    }
}

impl RoomConfig {
    /// Checks the parameters that can be judged without sampling.
    ///
    /// Pool exhaustion depends on how many positions furniture leaves free and
    /// is reported by world construction instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.robots == 0 {
            return Err(ConfigError::NoRobots);
        }
        check_fraction("dirty", self.dirty_fraction)?;
        check_fraction("furniture", self.furniture_fraction)?;
        Ok(())
    }

    /// Total number of grid positions.
    #[must_use]
    pub fn area(&self) -> usize {
        let area = u64::from(self.width) * u64::from(self.height);
        usize::try_from(area).unwrap_or(usize::MAX)
    }

    /// Number of furniture pieces: `floor(width * height * furniture_fraction)`.
    #[must_use]
    pub fn furniture_count(&self) -> usize {
        fraction_of(self.area(), self.furniture_fraction)
    }

    /// Number of dirty cells: `floor(width * height * dirty_fraction)`.
    ///
    /// The quota is taken against the whole grid, not the positions left
    /// after furniture, so it can exceed the free pool.
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        fraction_of(self.area(), self.dirty_fraction)
    }

    /// Number of robots the room will actually hold.
    #[must_use]
    pub fn robot_count(&self) -> usize {
        match self.placement {
            PlacementMode::Fixed => FIXED_START_COUNT,
            PlacementMode::Random => usize::try_from(self.robots).unwrap_or(usize::MAX),
        }
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { field, value })
    }
}

fn fraction_of(area: usize, fraction: f64) -> usize {
    (area as f64 * fraction).floor() as usize
}
