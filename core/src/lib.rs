#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the botcleaner simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative room, and pure systems. Adapters submit [`Command`] values,
//! the world executes them through its `apply` entry point and broadcasts
//! [`Event`] values describing what every robot decided and where it moved.
//! Systems receive immutable views such as [`Neighborhood`] and
//! [`VisitedView`] and never mutate the room directly.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize, Serializer};

mod config;
mod layout;

pub use config::{ConfigError, ParsePlacementModeError, PlacementMode, PlacementStage, RoomConfig};
pub use layout::RoomLayout;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Runs one full tick: every robot decides in registration order, then
    /// every robot moves in the same order.
    Tick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Announces that a new tick began.
    TickStarted {
        /// One-based index of the tick that started.
        tick: u64,
    },
    /// Reports the neighbour a robot committed to during the decide pass.
    TargetSelected {
        /// Robot that made the decision.
        robot: RobotId,
        /// Position the robot will occupy after the move pass.
        target: CellCoord,
        /// Whether every candidate had already been visited, forcing a revisit.
        revisit: bool,
    },
    /// Confirms that a robot cleaned the dirty cell it selected.
    CellCleaned {
        /// Robot that performed the cleaning.
        robot: RobotId,
        /// Cell that switched from dirty to clean.
        cell: CellCoord,
    },
    /// Reports that a robot had no eligible neighbour and stays put this tick.
    RobotStalled {
        /// Robot that could not select a target.
        robot: RobotId,
        /// Cell the robot keeps occupying.
        cell: CellCoord,
    },
    /// Confirms that a robot relocated during the move pass.
    RobotMoved {
        /// Robot that moved.
        robot: RobotId,
        /// Cell the robot occupied before moving.
        from: CellCoord,
        /// Cell the robot occupies after moving.
        to: CellCoord,
    },
    /// Announces that both passes of the tick finished.
    TickCompleted {
        /// One-based index of the tick that completed.
        tick: u64,
        /// Number of cells that remain dirty after the tick.
        dirty_cells: usize,
    },
}

/// Unique identifier assigned to a robot, equal to its registration index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RobotId(u32);

impl RobotId {
    /// Creates a new robot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "robot-{}", self.0)
    }
}

/// Location of a single grid cell expressed as `(x, y)` coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based horizontal index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based vertical index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Reports whether the cell lies inside a `width` by `height` grid.
    #[must_use]
    pub const fn is_within(&self, width: u32, height: u32) -> bool {
        self.x < width && self.y < height
    }

    /// Enumerates the Moore neighbourhood of the cell inside a `width` by
    /// `height` grid.
    ///
    /// Edges do not wrap, so corner cells yield three neighbours and edge
    /// cells five. The centre is never included. Neighbours are produced
    /// column by column: `x - 1` first, and within a column `y - 1` first.
    pub fn moore_neighbors(self, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
        const OFFSETS: [(i64, i64); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];

        OFFSETS.into_iter().filter_map(move |(dx, dy)| {
            let x = i64::from(self.x) + dx;
            let y = i64::from(self.y) + dy;
            if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                return None;
            }
            Some(CellCoord::new(u32::try_from(x).ok()?, u32::try_from(y).ok()?))
        })
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Anything that can sit on a grid position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occupant {
    /// Floor cell that robots may clean and walk over.
    Cell {
        /// Whether the cell still needs cleaning.
        dirty: bool,
    },
    /// Immovable furniture that permanently blocks its position.
    Furniture,
    /// Cleaning robot currently standing on the position.
    Robot(RobotId),
}

/// Per-position tag published in room snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellTag {
    /// Clean floor, furniture, or anything else without a robot or dirt.
    Clear,
    /// Floor cell that is still dirty.
    Dirty,
    /// Position occupied by at least one robot.
    Robot,
}

impl CellTag {
    /// Numeric value consumed by display collaborators: 0, 1 or 2.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Clear => 0,
            Self::Dirty => 1,
            Self::Robot => 2,
        }
    }
}

impl Serialize for CellTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.value())
    }
}

/// A floor cell a robot may select during its decide pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NeighborCell {
    /// Position of the neighbouring cell.
    pub cell: CellCoord,
    /// Whether the neighbouring cell is dirty.
    pub dirty: bool,
}

/// Eligible Moore neighbours of a robot at the moment it decides.
///
/// Furniture, cells holding another robot and cells already claimed by an
/// earlier robot in the same tick have been filtered out by the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Neighborhood {
    cells: Vec<NeighborCell>,
}

impl Neighborhood {
    /// Creates a neighbourhood from pre-filtered cells.
    #[must_use]
    pub fn new(cells: Vec<NeighborCell>) -> Self {
        Self { cells }
    }

    /// Eligible neighbours in deterministic scan order.
    #[must_use]
    pub fn cells(&self) -> &[NeighborCell] {
        &self.cells
    }

    /// Iterator over the dirty neighbours.
    pub fn dirty(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells
            .iter()
            .filter(|neighbor| neighbor.dirty)
            .map(|neighbor| neighbor.cell)
    }
}

/// Read-only view of every position any robot has targeted during the run.
#[derive(Clone, Copy, Debug)]
pub struct VisitedView<'a> {
    cells: &'a BTreeSet<CellCoord>,
}

impl<'a> VisitedView<'a> {
    /// Captures a view backed by the provided set.
    #[must_use]
    pub const fn new(cells: &'a BTreeSet<CellCoord>) -> Self {
        Self { cells }
    }

    /// Reports whether `cell` was ever chosen as a target.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Number of distinct visited positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no position has been visited yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over the visited positions in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + 'a {
        let cells = self.cells;
        cells.iter().copied()
    }
}

/// Outcome of a robot's decide pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Clean the dirty neighbour and move onto it.
    Clean {
        /// Dirty cell selected for cleaning.
        target: CellCoord,
        /// Whether the cell had already been visited.
        revisit: bool,
    },
    /// Move onto a neighbour without cleaning anything.
    Explore {
        /// Cell selected as the next position.
        target: CellCoord,
        /// Whether the cell had already been visited.
        revisit: bool,
    },
    /// No eligible neighbour exists; remain in place for this tick.
    Stay,
}

impl Decision {
    /// Position the robot will occupy after the move pass, if it moves.
    #[must_use]
    pub const fn target(&self) -> Option<CellCoord> {
        match self {
            Self::Clean { target, .. } | Self::Explore { target, .. } => Some(*target),
            Self::Stay => None,
        }
    }

    /// Whether the decision fell back to an already-visited position.
    #[must_use]
    pub const fn is_revisit(&self) -> bool {
        match self {
            Self::Clean { revisit, .. } | Self::Explore { revisit, .. } => *revisit,
            Self::Stay => false,
        }
    }
}

/// Immutable representation of a single robot's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RobotSnapshot {
    /// Identifier assigned to the robot at registration.
    pub id: RobotId,
    /// Grid cell currently occupied by the robot.
    pub cell: CellCoord,
    /// Target chosen in the current decide pass, if the move pass has not run yet.
    pub pending: Option<CellCoord>,
    /// Number of times the robot changed position since the run started.
    pub movements: u32,
}

/// Read-only snapshot describing all robots in registration order.
#[derive(Clone, Debug, Default)]
pub struct RobotView {
    snapshots: Vec<RobotSnapshot>,
}

impl RobotView {
    /// Creates a new robot view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<RobotSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured robot snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &RobotSnapshot> {
        self.snapshots.iter()
    }

    /// Number of robots captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no robots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<RobotSnapshot> {
        self.snapshots
    }
}
