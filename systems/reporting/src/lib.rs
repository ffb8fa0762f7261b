#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic reporting system that records the room once per tick.
//!
//! Display collaborators only ever see what this crate publishes: a tagged
//! snapshot of the grid, the fraction of originally dirty cells still dirty,
//! and each robot's cumulative movement count.

use std::collections::BTreeMap;

use botcleaner_core::{CellCoord, CellTag, Event, RobotId};
use botcleaner_world::{query, World};
use serde::Serialize;

/// Dirty ratio reported when the room started without any dirt.
pub const RATIO_WITHOUT_DIRT: f64 = 1.0;

/// Pure reporting system that captures a [`TickReport`] after every tick.
#[derive(Debug)]
pub struct Reporter {
    history: Vec<TickReport>,
}

impl Reporter {
    /// Creates a reporter whose history starts with the room's initial state.
    #[must_use]
    pub fn new(world: &World) -> Self {
        Self {
            history: vec![capture(world)],
        }
    }

    /// Consumes world events, capturing one report per completed tick.
    ///
    /// `world` must be the state that produced `events`.
    pub fn handle(&mut self, events: &[Event], world: &World) {
        for event in events {
            if let Event::TickCompleted { .. } = event {
                self.history.push(capture(world));
            }
        }
    }

    /// Every report captured so far, starting with tick 0.
    #[must_use]
    pub fn history(&self) -> &[TickReport] {
        &self.history
    }

    /// Most recent report.
    #[must_use]
    pub fn latest(&self) -> Option<&TickReport> {
        self.history.last()
    }

    /// `(tick, dirty_ratio)` pairs suitable for plotting.
    pub fn dirty_ratio_series(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.history
            .iter()
            .map(|report| (report.tick, report.dirty_ratio))
    }
}

/// Everything published about the room at the end of a tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TickReport {
    /// Tick the report describes; 0 is the state before the first tick.
    pub tick: u64,
    /// Tagged grid snapshot.
    pub snapshot: RoomSnapshot,
    /// Number of cells still dirty.
    pub dirty_cells: usize,
    /// Number of cells dirty when the room was created.
    pub initial_dirty_cells: usize,
    /// `dirty_cells / initial_dirty_cells`, or [`RATIO_WITHOUT_DIRT`] when nothing started dirty.
    pub dirty_ratio: f64,
    /// Cumulative movement count per robot.
    pub movements: BTreeMap<RobotId, u32>,
}

impl TickReport {
    /// Sum of every robot's movement count.
    #[must_use]
    pub fn total_movements(&self) -> u64 {
        self.movements.values().map(|&moves| u64::from(moves)).sum()
    }
}

/// Width by height grid of [`CellTag`] values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoomSnapshot {
    width: u32,
    height: u32,
    tags: Vec<CellTag>,
}

impl RoomSnapshot {
    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Tag recorded for `cell`, or `None` outside the grid.
    #[must_use]
    pub fn tag(&self, cell: CellCoord) -> Option<CellTag> {
        if !cell.is_within(self.width, self.height) {
            return None;
        }
        let index = u64::from(cell.x()) * u64::from(self.height) + u64::from(cell.y());
        let index = usize::try_from(index).ok()?;
        self.tags.get(index).copied()
    }

    /// Number of positions carrying `tag`.
    #[must_use]
    pub fn count(&self, tag: CellTag) -> usize {
        self.tags.iter().filter(|&&candidate| candidate == tag).count()
    }

    /// Numeric matrix indexed as `matrix[x][y]`, holding 0, 1 or 2.
    #[must_use]
    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        let height = usize::try_from(self.height).unwrap_or(0).max(1);
        self.tags
            .chunks(height)
            .map(|column| column.iter().map(|tag| tag.value()).collect())
            .collect()
    }
}

/// Captures the current state of `world`.
#[must_use]
pub fn capture(world: &World) -> TickReport {
    let (width, height) = query::dimensions(world);
    let tags = (0..width)
        .flat_map(|x| (0..height).map(move |y| CellCoord::new(x, y)))
        .map(|cell| query::cell_tag(world, cell))
        .collect();

    let dirty_cells = query::dirty_cell_count(world);
    let initial_dirty_cells = query::initial_dirty_cell_count(world);
    let movements = query::robot_view(world)
        .iter()
        .map(|robot| (robot.id, robot.movements))
        .collect();

    TickReport {
        tick: query::tick(world),
        snapshot: RoomSnapshot {
            width,
            height,
            tags,
        },
        dirty_cells,
        initial_dirty_cells,
        dirty_ratio: dirty_ratio(dirty_cells, initial_dirty_cells),
        movements,
    }
}

/// Fraction of the originally dirty cells that remain dirty.
///
/// Returns [`RATIO_WITHOUT_DIRT`] when `initial` is zero.
#[must_use]
pub fn dirty_ratio(current: usize, initial: usize) -> f64 {
    if initial == 0 {
        return RATIO_WITHOUT_DIRT;
    }
    current as f64 / initial as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_guards_against_empty_rooms() {
        assert_eq!(dirty_ratio(0, 0), RATIO_WITHOUT_DIRT);
    }

    #[test]
    fn ratio_reaches_zero_when_clean() {
        assert_eq!(dirty_ratio(0, 8), 0.0);
        assert!((dirty_ratio(2, 8) - 0.25).abs() < f64::EPSILON);
        assert_eq!(dirty_ratio(8, 8), 1.0);
    }

    #[test]
    fn snapshot_indexes_by_column_then_row() {
        let snapshot = RoomSnapshot {
            width: 2,
            height: 3,
            tags: vec![
                CellTag::Robot,
                CellTag::Clear,
                CellTag::Dirty,
                CellTag::Clear,
                CellTag::Dirty,
                CellTag::Clear,
            ],
        };

        assert_eq!(snapshot.tag(CellCoord::new(0, 0)), Some(CellTag::Robot));
        assert_eq!(snapshot.tag(CellCoord::new(0, 2)), Some(CellTag::Dirty));
        assert_eq!(snapshot.tag(CellCoord::new(1, 1)), Some(CellTag::Dirty));
        assert_eq!(snapshot.tag(CellCoord::new(2, 0)), None);
        assert_eq!(snapshot.to_matrix(), vec![vec![2, 0, 1], vec![0, 1, 0]]);
        assert_eq!(snapshot.count(CellTag::Dirty), 2);
    }

    #[test]
    fn total_movements_sums_robots() {
        let report = TickReport {
            tick: 3,
            snapshot: RoomSnapshot {
                width: 1,
                height: 1,
                tags: vec![CellTag::Robot],
            },
            dirty_cells: 0,
            initial_dirty_cells: 0,
            dirty_ratio: RATIO_WITHOUT_DIRT,
            movements: [(RobotId::new(0), 3), (RobotId::new(1), 2)]
                .into_iter()
                .collect(),
        };
        assert_eq!(report.total_movements(), 5);
    }
}
