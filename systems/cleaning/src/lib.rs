#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy neighbour-inspection policy that decides where each robot goes next.
//!
//! The policy is pure: it reads the robot's eligible neighbours and the
//! run-wide visited set, draws from the injected random source, and returns a
//! [`Decision`]. Applying the decision (cleaning the cell, recording the
//! target as visited, moving the robot) is the world's job.

use botcleaner_core::{CellCoord, Decision, Neighborhood, VisitedView};
use rand::{seq::SliceRandom, Rng};

/// Chooses the next position for a robot.
///
/// Dirty neighbours always win over clean ones. Within the chosen group,
/// positions no robot has targeted before are preferred; only when every
/// candidate has been visited does the robot fall back to the whole group.
/// An empty neighbourhood yields [`Decision::Stay`].
pub fn decide<R>(neighborhood: &Neighborhood, visited: VisitedView<'_>, rng: &mut R) -> Decision
where
    R: Rng + ?Sized,
{
    let dirty: Vec<CellCoord> = neighborhood.dirty().collect();
    if !dirty.is_empty() {
        if let Some((target, revisit)) = pick_preferring_fresh(&dirty, visited, rng) {
            return Decision::Clean { target, revisit };
        }
    }

    let reachable: Vec<CellCoord> = neighborhood
        .cells()
        .iter()
        .map(|neighbor| neighbor.cell)
        .collect();
    match pick_preferring_fresh(&reachable, visited, rng) {
        Some((target, revisit)) => Decision::Explore { target, revisit },
        None => Decision::Stay,
    }
}

fn pick_preferring_fresh<R>(
    candidates: &[CellCoord],
    visited: VisitedView<'_>,
    rng: &mut R,
) -> Option<(CellCoord, bool)>
where
    R: Rng + ?Sized,
{
    let fresh: Vec<CellCoord> = candidates
        .iter()
        .copied()
        .filter(|cell| !visited.contains(*cell))
        .collect();
    if let Some(&cell) = fresh.choose(rng) {
        return Some((cell, false));
    }

    candidates.choose(rng).map(|&cell| (cell, true))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use botcleaner_core::{CellCoord, Decision, NeighborCell, Neighborhood, VisitedView};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::decide;

    fn neighborhood(cells: &[(u32, u32, bool)]) -> Neighborhood {
        Neighborhood::new(
            cells
                .iter()
                .map(|&(x, y, dirty)| NeighborCell {
                    cell: CellCoord::new(x, y),
                    dirty,
                })
                .collect(),
        )
    }

    fn visited(cells: &[(u32, u32)]) -> BTreeSet<CellCoord> {
        cells.iter().map(|&(x, y)| CellCoord::new(x, y)).collect()
    }

    #[test]
    fn prefers_dirty_neighbors() {
        let area = neighborhood(&[(0, 0, false), (0, 1, true), (2, 2, false)]);
        let visited = visited(&[]);
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let decision = decide(&area, VisitedView::new(&visited), &mut rng);
            assert_eq!(
                decision,
                Decision::Clean {
                    target: CellCoord::new(0, 1),
                    revisit: false
                }
            );
        }
    }

    #[test]
    fn skips_visited_dirty_cells_when_fresh_ones_exist() {
        let area = neighborhood(&[(0, 0, true), (0, 1, true), (0, 2, true)]);
        let visited = visited(&[(0, 0), (0, 2)]);
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let decision = decide(&area, VisitedView::new(&visited), &mut rng);
            assert_eq!(decision.target(), Some(CellCoord::new(0, 1)));
            assert!(!decision.is_revisit());
        }
    }

    #[test]
    fn falls_back_to_visited_dirty_cells() {
        let area = neighborhood(&[(0, 0, true), (2, 0, true), (1, 0, false)]);
        let visited = visited(&[(0, 0), (2, 0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let decision = decide(&area, VisitedView::new(&visited), &mut rng);

        match decision {
            Decision::Clean { target, revisit } => {
                assert!(revisit);
                assert!(target == CellCoord::new(0, 0) || target == CellCoord::new(2, 0));
            }
            other => panic!("expected a cleaning decision, got {other:?}"),
        }
    }

    #[test]
    fn explores_unvisited_clean_cells() {
        let area = neighborhood(&[(0, 0, false), (0, 1, false), (0, 2, false)]);
        let visited = visited(&[(0, 0), (0, 1)]);
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let decision = decide(&area, VisitedView::new(&visited), &mut rng);
            assert_eq!(
                decision,
                Decision::Explore {
                    target: CellCoord::new(0, 2),
                    revisit: false
                }
            );
        }
    }

    #[test]
    fn revisits_when_every_neighbor_was_visited() {
        let area = neighborhood(&[(0, 0, false), (0, 1, false)]);
        let visited = visited(&[(0, 0), (0, 1)]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let decision = decide(&area, VisitedView::new(&visited), &mut rng);

        assert!(matches!(decision, Decision::Explore { revisit: true, .. }));
        let target = decision.target().expect("explore has a target");
        assert!(area.cells().iter().any(|neighbor| neighbor.cell == target));
    }

    #[test]
    fn stays_without_eligible_neighbors() {
        let area = neighborhood(&[]);
        let visited = visited(&[(0, 0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            decide(&area, VisitedView::new(&visited), &mut rng),
            Decision::Stay
        );
    }

    #[test]
    fn same_seed_yields_same_choice() {
        let area = neighborhood(&[
            (0, 0, false),
            (0, 1, false),
            (0, 2, false),
            (1, 0, false),
            (1, 2, false),
            (2, 0, false),
            (2, 1, false),
            (2, 2, false),
        ]);
        let visited = visited(&[]);
        let mut first = ChaCha8Rng::seed_from_u64(99);
        let mut second = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..16 {
            assert_eq!(
                decide(&area, VisitedView::new(&visited), &mut first),
                decide(&area, VisitedView::new(&visited), &mut second)
            );
        }
    }
}
