//! Dense storage of what stands on every grid position.

use botcleaner_core::{CellCoord, NeighborCell, Neighborhood, Occupant, RobotId};

/// Permanent content of a position: a floor cell or a piece of furniture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fixture {
    Floor { dirty: bool },
    Furniture,
}

#[derive(Clone, Debug)]
struct Slot {
    fixture: Fixture,
    robots: Vec<RobotId>,
}

impl Slot {
    const fn clean_floor() -> Self {
        Self {
            fixture: Fixture::Floor { dirty: false },
            robots: Vec::new(),
        }
    }
}

/// Multi-occupancy grid: every position holds one fixture plus any number of robots.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    width: u32,
    height: u32,
    slots: Vec<Slot>,
}

impl Grid {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            slots: vec![Slot::clean_floor(); capacity],
        }
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn place_furniture(&mut self, cell: CellCoord) {
        if let Some(slot) = self.slot_mut(cell) {
            slot.fixture = Fixture::Furniture;
        }
    }

    pub(crate) fn mark_dirty(&mut self, cell: CellCoord) {
        if let Some(slot) = self.slot_mut(cell) {
            if let Fixture::Floor { dirty } = &mut slot.fixture {
                *dirty = true;
            }
        }
    }

    /// Cleans the floor cell at `cell`, returning whether it was dirty.
    pub(crate) fn clean(&mut self, cell: CellCoord) -> bool {
        let Some(slot) = self.slot_mut(cell) else {
            return false;
        };
        match &mut slot.fixture {
            Fixture::Floor { dirty } => std::mem::replace(dirty, false),
            Fixture::Furniture => false,
        }
    }

    pub(crate) fn place_robot(&mut self, robot: RobotId, cell: CellCoord) {
        if let Some(slot) = self.slot_mut(cell) {
            slot.robots.push(robot);
        }
    }

    pub(crate) fn move_robot(&mut self, robot: RobotId, from: CellCoord, to: CellCoord) {
        if let Some(slot) = self.slot_mut(from) {
            slot.robots.retain(|occupant| *occupant != robot);
        }
        self.place_robot(robot, to);
    }

    pub(crate) fn fixture(&self, cell: CellCoord) -> Option<Fixture> {
        self.slot(cell).map(|slot| slot.fixture)
    }

    pub(crate) fn has_robot(&self, cell: CellCoord) -> bool {
        self.slot(cell).is_some_and(|slot| !slot.robots.is_empty())
    }

    /// Everything standing on `cell`: the fixture first, then robots in arrival order.
    pub(crate) fn occupants(&self, cell: CellCoord) -> Vec<Occupant> {
        let Some(slot) = self.slot(cell) else {
            return Vec::new();
        };
        let fixture = match slot.fixture {
            Fixture::Floor { dirty } => Occupant::Cell { dirty },
            Fixture::Furniture => Occupant::Furniture,
        };
        std::iter::once(fixture)
            .chain(slot.robots.iter().copied().map(Occupant::Robot))
            .collect()
    }

    pub(crate) fn dirty_count(&self) -> usize {
        self.count_fixtures(|fixture| fixture == Fixture::Floor { dirty: true })
    }

    pub(crate) fn floor_count(&self) -> usize {
        self.count_fixtures(|fixture| matches!(fixture, Fixture::Floor { .. }))
    }

    pub(crate) fn furniture_count(&self) -> usize {
        self.count_fixtures(|fixture| fixture == Fixture::Furniture)
    }

    /// Eligible neighbours of `origin`: floor cells that hold no robot and are
    /// not rejected by `is_claimed`.
    pub(crate) fn neighborhood<F>(&self, origin: CellCoord, is_claimed: F) -> Neighborhood
    where
        F: Fn(CellCoord) -> bool,
    {
        let cells = origin
            .moore_neighbors(self.width, self.height)
            .filter_map(|cell| {
                let slot = self.slot(cell)?;
                let Fixture::Floor { dirty } = slot.fixture else {
                    return None;
                };
                if !slot.robots.is_empty() || is_claimed(cell) {
                    return None;
                }
                Some(NeighborCell { cell, dirty })
            })
            .collect();
        Neighborhood::new(cells)
    }

    fn count_fixtures<F>(&self, predicate: F) -> usize
    where
        F: Fn(Fixture) -> bool,
    {
        self.slots
            .iter()
            .filter(|slot| predicate(slot.fixture))
            .count()
    }

    fn slot(&self, cell: CellCoord) -> Option<&Slot> {
        self.index(cell).and_then(|index| self.slots.get(index))
    }

    fn slot_mut(&mut self, cell: CellCoord) -> Option<&mut Slot> {
        self.index(cell).and_then(|index| self.slots.get_mut(index))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.is_within(self.width, self.height) {
            let x = usize::try_from(cell.x()).ok()?;
            let y = usize::try_from(cell.y()).ok()?;
            let height = usize::try_from(self.height).ok()?;
            Some(x * height + y)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_clean_floor() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.floor_count(), 12);
        assert_eq!(grid.dirty_count(), 0);
        assert_eq!(grid.furniture_count(), 0);
    }

    #[test]
    fn clean_reports_previous_state() {
        let mut grid = Grid::new(2, 2);
        let cell = CellCoord::new(1, 0);
        grid.mark_dirty(cell);
        assert!(grid.clean(cell));
        assert!(!grid.clean(cell));
        assert_eq!(grid.dirty_count(), 0);
    }

    #[test]
    fn furniture_cannot_be_dirtied() {
        let mut grid = Grid::new(2, 2);
        let cell = CellCoord::new(0, 1);
        grid.place_furniture(cell);
        grid.mark_dirty(cell);
        assert_eq!(grid.fixture(cell), Some(Fixture::Furniture));
        assert_eq!(grid.dirty_count(), 0);
    }

    #[test]
    fn neighborhood_skips_furniture_and_robots() {
        let mut grid = Grid::new(3, 3);
        grid.place_furniture(CellCoord::new(1, 1));
        grid.place_robot(RobotId::new(1), CellCoord::new(0, 1));
        grid.mark_dirty(CellCoord::new(1, 0));

        let area = grid.neighborhood(CellCoord::new(0, 0), |_| false);
        assert_eq!(
            area.cells(),
            &[NeighborCell {
                cell: CellCoord::new(1, 0),
                dirty: true
            }]
        );
    }

    #[test]
    fn neighborhood_skips_claimed_cells() {
        let grid = Grid::new(2, 2);
        let claimed = CellCoord::new(1, 1);
        let area = grid.neighborhood(CellCoord::new(0, 0), |cell| cell == claimed);
        assert_eq!(area.cells().len(), 2);
        assert!(area.cells().iter().all(|neighbor| neighbor.cell != claimed));
    }

    #[test]
    fn moving_robot_updates_both_positions() {
        let mut grid = Grid::new(2, 1);
        let robot = RobotId::new(0);
        let from = CellCoord::new(0, 0);
        let to = CellCoord::new(1, 0);
        grid.place_robot(robot, from);
        grid.move_robot(robot, from, to);

        assert!(!grid.has_robot(from));
        assert_eq!(
            grid.occupants(to),
            vec![Occupant::Cell { dirty: false }, Occupant::Robot(robot)]
        );
    }

    #[test]
    fn out_of_bounds_positions_are_empty() {
        let grid = Grid::new(2, 2);
        assert!(grid.occupants(CellCoord::new(5, 5)).is_empty());
        assert_eq!(grid.fixture(CellCoord::new(2, 0)), None);
    }
}
