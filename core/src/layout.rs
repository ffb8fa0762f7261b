//! Concrete description of a room's initial contents.

use std::collections::BTreeSet;

use crate::{CellCoord, ConfigError};

/// Explicit initial state: where furniture stands, which cells start dirty
/// and where each robot starts.
///
/// Robots are registered in the order they were added. Every position that
/// holds no furniture becomes a floor cell, dirty if listed in `dirty`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomLayout {
    width: u32,
    height: u32,
    furniture: Vec<CellCoord>,
    dirty: Vec<CellCoord>,
    robots: Vec<CellCoord>,
}

impl RoomLayout {
    /// Creates an empty, fully clean layout of the provided dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            furniture: Vec::new(),
            dirty: Vec::new(),
            robots: Vec::new(),
        }
    }

    /// Places a piece of furniture.
    pub fn add_furniture(&mut self, cell: CellCoord) {
        self.furniture.push(cell);
    }

    /// Marks a floor cell as dirty.
    pub fn add_dirt(&mut self, cell: CellCoord) {
        self.dirty.push(cell);
    }

    /// Registers a robot starting at `cell`.
    pub fn add_robot(&mut self, cell: CellCoord) {
        self.robots.push(cell);
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Furniture positions.
    #[must_use]
    pub fn furniture(&self) -> &[CellCoord] {
        &self.furniture
    }

    /// Positions of cells that start dirty.
    #[must_use]
    pub fn dirty(&self) -> &[CellCoord] {
        &self.dirty
    }

    /// Robot start positions in registration order.
    #[must_use]
    pub fn robots(&self) -> &[CellCoord] {
        &self.robots
    }

    /// Checks that the layout describes a room the world can build.
    ///
    /// Robots may share a start position and may start on furniture; both
    /// occur with fixed corner placement on narrow or furnished grids.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.robots.is_empty() {
            return Err(ConfigError::NoRobots);
        }

        for &cell in self
            .furniture
            .iter()
            .chain(self.dirty.iter())
            .chain(self.robots.iter())
        {
            if !cell.is_within(self.width, self.height) {
                return Err(ConfigError::OutOfBounds {
                    cell,
                    width: self.width,
                    height: self.height,
                });
            }
        }

        let furniture = unique_positions(&self.furniture)?;
        let dirty = unique_positions(&self.dirty)?;
        if let Some(&cell) = furniture.intersection(&dirty).next() {
            return Err(ConfigError::DirtOnFurniture { cell });
        }

        Ok(())
    }
}

fn unique_positions(cells: &[CellCoord]) -> Result<BTreeSet<CellCoord>, ConfigError> {
    let mut seen = BTreeSet::new();
    for &cell in cells {
        if !seen.insert(cell) {
            return Err(ConfigError::DuplicatePosition { cell });
        }
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layout() -> RoomLayout {
        let mut layout = RoomLayout::new(3, 3);
        layout.add_furniture(CellCoord::new(1, 1));
        layout.add_dirt(CellCoord::new(0, 1));
        layout.add_robot(CellCoord::new(0, 0));
        layout
    }

    #[test]
    fn accepts_consistent_layout() {
        assert_eq!(sample_layout().validate(), Ok(()));
    }

    #[test]
    fn rejects_layout_without_robots() {
        let mut layout = RoomLayout::new(2, 2);
        layout.add_dirt(CellCoord::new(1, 1));
        assert_eq!(layout.validate(), Err(ConfigError::NoRobots));
    }

    #[test]
    fn rejects_positions_outside_grid() {
        let mut layout = sample_layout();
        layout.add_robot(CellCoord::new(3, 0));
        assert_eq!(
            layout.validate(),
            Err(ConfigError::OutOfBounds {
                cell: CellCoord::new(3, 0),
                width: 3,
                height: 3
            })
        );
    }

    #[test]
    fn rejects_duplicate_dirt() {
        let mut layout = sample_layout();
        layout.add_dirt(CellCoord::new(0, 1));
        assert_eq!(
            layout.validate(),
            Err(ConfigError::DuplicatePosition {
                cell: CellCoord::new(0, 1)
            })
        );
    }

    #[test]
    fn rejects_dirt_on_furniture() {
        let mut layout = sample_layout();
        layout.add_dirt(CellCoord::new(1, 1));
        assert_eq!(
            layout.validate(),
            Err(ConfigError::DirtOnFurniture {
                cell: CellCoord::new(1, 1)
            })
        );
    }

    #[test]
    fn robots_may_share_a_start_position() {
        let mut layout = RoomLayout::new(1, 1);
        layout.add_robot(CellCoord::new(0, 0));
        layout.add_robot(CellCoord::new(0, 0));
        assert_eq!(layout.validate(), Ok(()));
    }
}
