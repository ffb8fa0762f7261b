//! Stochastic sampling of a room layout from its configuration.

use std::collections::BTreeSet;

use botcleaner_core::{CellCoord, ConfigError, PlacementMode, PlacementStage, RoomConfig, RoomLayout};
use rand::{seq::index, Rng};

/// Samples furniture, dirt and robot start positions for `config`.
///
/// Furniture is drawn from the whole grid. Dirt and random robot starts are
/// each drawn independently from the positions furniture left free, so a
/// robot may start on a dirty cell. The caller must have validated `config`.
pub(crate) fn sample_layout<R>(config: &RoomConfig, rng: &mut R) -> Result<RoomLayout, ConfigError>
where
    R: Rng + ?Sized,
{
    let (width, height) = (config.width, config.height);
    let mut pool: Vec<CellCoord> = (0..width)
        .flat_map(|x| (0..height).map(move |y| CellCoord::new(x, y)))
        .collect();

    let furniture = sample_positions(
        &pool,
        config.furniture_count(),
        PlacementStage::Furniture,
        rng,
    )?;
    let blocked: BTreeSet<CellCoord> = furniture.iter().copied().collect();
    pool.retain(|cell| !blocked.contains(cell));

    let dirty = sample_positions(&pool, config.dirty_count(), PlacementStage::Dirt, rng)?;

    let robots = match config.placement {
        PlacementMode::Fixed => fixed_corners(width, height),
        PlacementMode::Random => {
            sample_positions(&pool, config.robot_count(), PlacementStage::Robots, rng)?
        }
    };

    let mut layout = RoomLayout::new(width, height);
    for cell in furniture {
        layout.add_furniture(cell);
    }
    for cell in dirty {
        layout.add_dirt(cell);
    }
    for cell in robots {
        layout.add_robot(cell);
    }
    Ok(layout)
}

/// The four grid corners in registration order.
///
/// Corners coincide on grids one cell wide or tall; each still gets its own robot.
pub(crate) fn fixed_corners(width: u32, height: u32) -> Vec<CellCoord> {
    let last_x = width.saturating_sub(1);
    let last_y = height.saturating_sub(1);
    vec![
        CellCoord::new(0, 0),
        CellCoord::new(0, last_y),
        CellCoord::new(last_x, 0),
        CellCoord::new(last_x, last_y),
    ]
}

fn sample_positions<R>(
    pool: &[CellCoord],
    amount: usize,
    stage: PlacementStage,
    rng: &mut R,
) -> Result<Vec<CellCoord>, ConfigError>
where
    R: Rng + ?Sized,
{
    if amount > pool.len() {
        return Err(ConfigError::PoolExhausted {
            stage,
            requested: amount,
            available: pool.len(),
        });
    }

    Ok(index::sample(rng, pool.len(), amount)
        .into_iter()
        .filter_map(|position| pool.get(position).copied())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config(width: u32, height: u32, dirty: f64, furniture: f64) -> RoomConfig {
        RoomConfig {
            width,
            height,
            dirty_fraction: dirty,
            furniture_fraction: furniture,
            ..RoomConfig::default()
        }
    }

    #[test]
    fn samples_requested_quotas() {
        let config = config(10, 8, 0.25, 0.1);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let layout = sample_layout(&config, &mut rng).expect("layout samples");

        assert_eq!(layout.furniture().len(), 8);
        assert_eq!(layout.dirty().len(), 20);
        assert_eq!(layout.robots(), fixed_corners(10, 8).as_slice());
        assert_eq!(layout.validate(), Ok(()));
    }

    #[test]
    fn dirt_never_lands_on_furniture() {
        let config = config(6, 6, 0.5, 0.5);
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let layout = sample_layout(&config, &mut rng).expect("layout samples");
            let furniture: BTreeSet<_> = layout.furniture().iter().copied().collect();
            assert!(layout.dirty().iter().all(|cell| !furniture.contains(cell)));
        }
    }

    #[test]
    fn dirt_quota_beyond_free_pool_is_rejected() {
        let config = config(10, 10, 0.6, 0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            sample_layout(&config, &mut rng),
            Err(ConfigError::PoolExhausted {
                stage: PlacementStage::Dirt,
                requested: 60,
                available: 50,
            })
        );
    }

    #[test]
    fn random_robots_need_enough_free_positions() {
        let config = RoomConfig {
            robots: 5,
            placement: PlacementMode::Random,
            ..config(2, 2, 0.0, 0.0)
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            sample_layout(&config, &mut rng),
            Err(ConfigError::PoolExhausted {
                stage: PlacementStage::Robots,
                requested: 5,
                available: 4,
            })
        );
    }

    #[test]
    fn random_robots_start_on_distinct_free_positions() {
        let config = RoomConfig {
            robots: 6,
            placement: PlacementMode::Random,
            ..config(5, 5, 0.2, 0.2)
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let layout = sample_layout(&config, &mut rng).expect("layout samples");

        let starts: BTreeSet<_> = layout.robots().iter().copied().collect();
        assert_eq!(starts.len(), 6);
        assert!(layout
            .robots()
            .iter()
            .all(|cell| !layout.furniture().contains(cell)));
    }

    #[test]
    fn corners_coincide_on_single_column() {
        assert_eq!(
            fixed_corners(1, 3),
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(0, 2),
                CellCoord::new(0, 0),
                CellCoord::new(0, 2),
            ]
        );
    }
}
