#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative room state for the botcleaner simulation.
//!
//! The [`World`] owns the grid, the run's single random source, every robot
//! in registration order and the run-lifetime set of visited positions.
//! [`apply`] advances it one tick at a time: a decide pass over all robots,
//! then a move pass, so no robot observes another's relocation until the
//! next tick.

use std::collections::BTreeSet;

use botcleaner_core::{
    CellCoord, Command, ConfigError, Decision, Event, RobotId, RoomConfig, RoomLayout,
    VisitedView,
};
use botcleaner_system_cleaning::decide;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

mod grid;
mod placement;

use grid::Grid;

/// Represents the authoritative room being cleaned.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    rng: ChaCha8Rng,
    seed: u64,
    robots: Vec<Robot>,
    visited: BTreeSet<CellCoord>,
    reservations: ReservationFrame,
    initial_dirty: usize,
    tick_index: u64,
}

impl World {
    /// Creates a room by sampling furniture, dirt and robot starts from `config`.
    ///
    /// When `config.seed` is `None` a seed is drawn from the process RNG; the
    /// resolved value is available through [`query::seed`].
    pub fn new(config: &RoomConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let layout = placement::sample_layout(config, &mut rng)?;
        if layout.robots().len() != usize::try_from(config.robots).unwrap_or(usize::MAX) {
            debug!(
                requested = config.robots,
                placed = layout.robots().len(),
                placement = %config.placement,
                "robot count adjusted by placement mode"
            );
        }
        Self::assemble(&layout, seed, rng)
    }

    /// Creates a room from an explicit layout, seeding the random source with `seed`.
    pub fn from_layout(layout: &RoomLayout, seed: u64) -> Result<Self, ConfigError> {
        layout.validate()?;
        Self::assemble(layout, seed, ChaCha8Rng::seed_from_u64(seed))
    }

    fn assemble(layout: &RoomLayout, seed: u64, rng: ChaCha8Rng) -> Result<Self, ConfigError> {
        let mut grid = Grid::new(layout.width(), layout.height());
        for &cell in layout.furniture() {
            grid.place_furniture(cell);
        }
        for &cell in layout.dirty() {
            grid.mark_dirty(cell);
        }

        let robots = layout
            .robots()
            .iter()
            .enumerate()
            .map(|(index, &cell)| robot_id(index).map(|id| Robot::new(id, cell)))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        for robot in &robots {
            grid.place_robot(robot.id, robot.cell);
        }

        let initial_dirty = grid.dirty_count();
        debug!(
            seed,
            width = layout.width(),
            height = layout.height(),
            furniture = grid.furniture_count(),
            dirty = initial_dirty,
            robots = robots.len(),
            "room initialised"
        );

        Ok(Self {
            grid,
            rng,
            seed,
            robots,
            visited: BTreeSet::new(),
            reservations: ReservationFrame::new(),
            initial_dirty,
            tick_index: 0,
        })
    }

    fn run_tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TickStarted {
            tick: self.tick_index,
        });

        self.decide_pass(out_events);
        self.move_pass(out_events);

        out_events.push(Event::TickCompleted {
            tick: self.tick_index,
            dirty_cells: self.grid.dirty_count(),
        });
    }

    /// Lets every robot choose a target in registration order.
    ///
    /// Robot `i` observes the cells cleaned and the targets recorded by robots
    /// `0..i` of the same tick.
    fn decide_pass(&mut self, out_events: &mut Vec<Event>) {
        self.reservations.begin();

        for index in 0..self.robots.len() {
            let (robot, origin) = (self.robots[index].id, self.robots[index].cell);
            let reservations = &self.reservations;
            let neighborhood = self
                .grid
                .neighborhood(origin, |cell| reservations.is_claimed(cell));
            let decision = decide(
                &neighborhood,
                VisitedView::new(&self.visited),
                &mut self.rng,
            );

            match decision {
                Decision::Clean { target, revisit } => {
                    let _ = self.grid.clean(target);
                    out_events.push(Event::TargetSelected {
                        robot,
                        target,
                        revisit,
                    });
                    out_events.push(Event::CellCleaned {
                        robot,
                        cell: target,
                    });
                }
                Decision::Explore { target, revisit } => {
                    out_events.push(Event::TargetSelected {
                        robot,
                        target,
                        revisit,
                    });
                }
                Decision::Stay => {
                    debug!(%robot, cell = %origin, tick = self.tick_index, "no eligible neighbour");
                    out_events.push(Event::RobotStalled {
                        robot,
                        cell: origin,
                    });
                }
            }

            if let Some(target) = decision.target() {
                let _ = self.visited.insert(target);
                self.reservations.claim(target);
            }
            self.robots[index].pending = decision.target();
        }
    }

    /// Relocates every robot to its pending target in registration order.
    fn move_pass(&mut self, out_events: &mut Vec<Event>) {
        for robot in &mut self.robots {
            let Some(destination) = robot.pending.take() else {
                continue;
            };
            if destination == robot.cell {
                continue;
            }

            let from = robot.cell;
            self.grid.move_robot(robot.id, from, destination);
            robot.cell = destination;
            robot.movements = robot.movements.saturating_add(1);
            out_events.push(Event::RobotMoved {
                robot: robot.id,
                from,
                to: destination,
            });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => world.run_tick(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use botcleaner_core::{
        CellCoord, CellTag, Occupant, RobotSnapshot, RobotView, VisitedView,
    };

    use super::{grid::Fixture, World};

    /// Seed the run's random source was created from.
    #[must_use]
    pub fn seed(world: &World) -> u64 {
        world.seed
    }

    /// Number of ticks completed so far.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick_index
    }

    /// Width and height of the grid.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Everything standing on `cell`, fixture first, then robots.
    ///
    /// Positions outside the grid yield an empty list.
    #[must_use]
    pub fn occupants(world: &World, cell: CellCoord) -> Vec<Occupant> {
        world.grid.occupants(cell)
    }

    /// Snapshot tag for `cell`: robots dominate, then dirt, otherwise clear.
    #[must_use]
    pub fn cell_tag(world: &World, cell: CellCoord) -> CellTag {
        if world.grid.has_robot(cell) {
            CellTag::Robot
        } else if world.grid.fixture(cell) == Some(Fixture::Floor { dirty: true }) {
            CellTag::Dirty
        } else {
            CellTag::Clear
        }
    }

    /// Captures a read-only view of every robot in registration order.
    #[must_use]
    pub fn robot_view(world: &World) -> RobotView {
        RobotView::from_snapshots(
            world
                .robots
                .iter()
                .map(|robot| RobotSnapshot {
                    id: robot.id,
                    cell: robot.cell,
                    pending: robot.pending,
                    movements: robot.movements,
                })
                .collect(),
        )
    }

    /// Every position any robot has targeted since the run started.
    #[must_use]
    pub fn visited(world: &World) -> VisitedView<'_> {
        VisitedView::new(&world.visited)
    }

    /// Number of floor cells that are still dirty.
    #[must_use]
    pub fn dirty_cell_count(world: &World) -> usize {
        world.grid.dirty_count()
    }

    /// Number of floor cells that were dirty when the room was created.
    #[must_use]
    pub fn initial_dirty_cell_count(world: &World) -> usize {
        world.initial_dirty
    }

    /// Number of floor cells, dirty or clean.
    #[must_use]
    pub fn floor_cell_count(world: &World) -> usize {
        world.grid.floor_count()
    }

    /// Number of furniture pieces.
    #[must_use]
    pub fn furniture_count(world: &World) -> usize {
        world.grid.furniture_count()
    }

    /// Reports whether no dirty cell remains.
    #[must_use]
    pub fn is_clean(world: &World) -> bool {
        world.grid.dirty_count() == 0
    }
}

/// Registration index as a robot identifier.
fn robot_id(index: usize) -> Result<RobotId, ConfigError> {
    u32::try_from(index)
        .map(RobotId::new)
        .map_err(|_| ConfigError::TooManyRobots { count: index })
}

#[derive(Clone, Debug)]
struct Robot {
    id: RobotId,
    cell: CellCoord,
    pending: Option<CellCoord>,
    movements: u32,
}

impl Robot {
    const fn new(id: RobotId, cell: CellCoord) -> Self {
        Self {
            id,
            cell,
            pending: None,
            movements: 0,
        }
    }
}

/// Targets claimed by robots during the current tick's decide pass.
#[derive(Debug)]
struct ReservationFrame {
    claims: BTreeSet<CellCoord>,
}

impl ReservationFrame {
    fn new() -> Self {
        Self {
            claims: BTreeSet::new(),
        }
    }

    fn begin(&mut self) {
        self.claims.clear();
    }

    fn claim(&mut self, cell: CellCoord) {
        let _ = self.claims.insert(cell);
    }

    fn is_claimed(&self, cell: CellCoord) -> bool {
        self.claims.contains(&cell)
    }
}
