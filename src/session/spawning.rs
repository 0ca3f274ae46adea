use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::{
    ai::chebyshev,
    config::GameConfig,
    data::monsters::EnemyTemplate,
    map::{Viewport, is_boss_distance},
};

use super::{
    entities::{Enemy, boss_alive, occupied},
    events::MessageLog,
};

pub const MAX_SPAWN_ATTEMPTS: usize = 256;

/// What a wave needs to know about the world it spawns into.
pub struct Spawner<'a> {
    pub config: &'a GameConfig,
    pub viewport: &'a Viewport,
    pub player: Point,
    pub world_offset: u32,
}

impl Spawner<'_> {
    /// Adds a wave to `enemies` and returns how many were placed.
    ///
    /// At a boss distance the wave is a single boss instead. That boss is
    /// tracked in `wave_boss_distance`, apart from the boss-room guardian
    /// that arrives with the marker row.
    pub fn spawn_wave(
        &self,
        enemies: &mut Vec<Enemy>,
        wave_boss_distance: &mut Option<u32>,
        rng: &mut RandomNumberGenerator,
        log: &mut MessageLog,
    ) -> usize {
        if boss_alive(enemies) || enemies.len() >= self.config.max_enemies {
            return 0;
        }

        if is_boss_distance(self.world_offset, self.config.boss_interval)
            && *wave_boss_distance != Some(self.world_offset)
        {
            return self.spawn_boss(enemies, wave_boss_distance, rng, log);
        }

        let wanted = rng.range(self.config.wave_min, self.config.wave_max + 1).max(0) as usize;
        let room = self.config.max_enemies - enemies.len();
        let mut cells: SmallVec<[Point; 8]> = SmallVec::new();
        for _ in 0..wanted.min(room) {
            if let Some(point) = self.find_spawn_cell(enemies, &cells, rng) {
                cells.push(point);
            }
        }

        let template = EnemyTemplate::regular(self.config, self.world_offset);
        enemies.extend(
            cells
                .iter()
                .map(|point| Enemy::from_template(&template, *point)),
        );
        debug!(
            monster = template.name,
            spawned = cells.len(),
            total = enemies.len(),
            world_offset = self.world_offset,
            "spawned wave"
        );
        cells.len()
    }

    fn spawn_boss(
        &self,
        enemies: &mut Vec<Enemy>,
        wave_boss_distance: &mut Option<u32>,
        rng: &mut RandomNumberGenerator,
        log: &mut MessageLog,
    ) -> usize {
        let Some(point) = self.find_spawn_cell(enemies, &[], rng) else {
            debug!(world_offset = self.world_offset, "no room to place boss");
            return 0;
        };

        let template = EnemyTemplate::boss(self.world_offset);
        enemies.push(Enemy::from_template(&template, point));
        *wave_boss_distance = Some(self.world_offset);
        log.push("!!! BOSS AHEAD !!! Defeat it to progress!");
        info!(
            monster = template.name,
            world_offset = self.world_offset,
            x = point.x,
            y = point.y,
            "boss joined the wave"
        );
        1
    }

    /// Rejection sampling over interior cells away from the player.
    fn find_spawn_cell(
        &self,
        enemies: &[Enemy],
        pending: &[Point],
        rng: &mut RandomNumberGenerator,
    ) -> Option<Point> {
        let width = self.viewport.width;
        let height = self.viewport.height;
        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let point = Point::new(rng.range(1, width - 1), rng.range(1, height - 1));
            if self.viewport.is_passable(point)
                && chebyshev(point, self.player) >= self.config.spawn_exclusion
                && !occupied(enemies, point, None)
                && !pending.contains(&point)
            {
                return Some(point);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawner_at<'a>(
        config: &'a GameConfig,
        viewport: &'a Viewport,
        world_offset: u32,
    ) -> Spawner<'a> {
        Spawner {
            config,
            viewport,
            player: Point::new(20, 6),
            world_offset,
        }
    }

    #[test]
    fn waves_respect_capacity_and_distance() {
        let config = GameConfig {
            max_enemies: 4,
            ..GameConfig::default()
        };
        let viewport = Viewport::open(config.map_width, config.map_height);
        let spawner = spawner_at(&config, &viewport, 0);
        let mut enemies = Vec::new();
        let mut wave_boss = None;
        let mut rng = RandomNumberGenerator::seeded(42);
        let mut log = MessageLog::default();

        for _ in 0..5 {
            spawner.spawn_wave(&mut enemies, &mut wave_boss, &mut rng, &mut log);
        }

        assert_eq!(enemies.len(), 4);
        for enemy in &enemies {
            assert!(chebyshev(enemy.point(), spawner.player) >= config.spawn_exclusion);
            assert!(viewport.is_passable(enemy.point()));
        }
    }

    #[test]
    fn no_wave_while_boss_lives() {
        let config = GameConfig::default();
        let viewport = Viewport::open(config.map_width, config.map_height);
        let spawner = spawner_at(&config, &viewport, 3);
        let mut enemies = vec![Enemy::from_template(
            &EnemyTemplate::boss(200),
            Point::new(2, 2),
        )];
        let mut wave_boss = Some(200);
        let mut rng = RandomNumberGenerator::seeded(1);
        let mut log = MessageLog::default();

        let spawned = spawner.spawn_wave(&mut enemies, &mut wave_boss, &mut rng, &mut log);
        assert_eq!(spawned, 0);
        assert_eq!(enemies.len(), 1);
    }

    #[test]
    fn boss_distance_wave_is_a_single_boss() {
        let config = GameConfig::default();
        let viewport = Viewport::open(config.map_width, config.map_height);
        let spawner = spawner_at(&config, &viewport, 200);
        let mut enemies = Vec::new();
        let mut wave_boss = None;
        let mut rng = RandomNumberGenerator::seeded(9);
        let mut log = MessageLog::default();

        assert_eq!(
            spawner.spawn_wave(&mut enemies, &mut wave_boss, &mut rng, &mut log),
            1
        );
        assert!(enemies[0].is_boss);
        assert_eq!(wave_boss, Some(200));

        // The same distance never produces a second wave guardian.
        enemies.clear();
        spawner.spawn_wave(&mut enemies, &mut wave_boss, &mut rng, &mut log);
        assert!(!boss_alive(&enemies));
    }
}
