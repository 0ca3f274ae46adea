pub mod combat;
pub mod entities;
pub mod events;
pub mod spawning;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use tracing::{debug, info};

use crate::{
    ai::{BehaviorContext, advance_enemies},
    config::GameConfig,
    data::{ProgressionRules, intro_lines, monsters::EnemyTemplate},
    map::{Cell, TerrainGenerator, Viewport, is_boss_distance},
    persist::GameSnapshot,
};

use self::{
    combat::resolve_collisions,
    entities::{Enemy, Player, boss_alive},
    events::{CombatOutcome, MessageLog, MoveOutcome, ShiftOutcome, TurnReport},
    spawning::Spawner,
};

/// Everything one run of the game owns: map, player, enemies and the RNG.
pub struct Session {
    config: GameConfig,
    rules: ProgressionRules,
    generator: TerrainGenerator,
    behavior: BehaviorContext,
    rng: RandomNumberGenerator,
    viewport: Viewport,
    player: Player,
    enemies: Vec<Enemy>,
    world_offset: u32,
    move_count: u32,
    /// Boss-room distance whose guardian has already appeared.
    last_boss_distance: Option<u32>,
    /// Boss distance whose wave guardian has already appeared.
    last_wave_boss_distance: Option<u32>,
    log: MessageLog,
}

/// Read-only view handed to renderers each turn.
pub struct SessionView<'a> {
    pub viewport: &'a Viewport,
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub world_offset: u32,
    pub boss_alive: bool,
    pub messages: &'a MessageLog,
}

impl Session {
    pub fn new_game(config: GameConfig, seed: u64, name: &str) -> Self {
        let mut rng = RandomNumberGenerator::seeded(seed);
        let generator = TerrainGenerator::from_config(&config);
        let viewport = Viewport::generate(&generator, config.map_height, &mut rng, 0);
        let spawn = Point::new(config.map_width / 2, config.map_height / 2);
        let player = Player::new(name, spawn, &ProgressionRules::default());

        let mut session = Self::assemble(config, rng, viewport, player, Vec::new(), 0, 0);
        // The start cell might have rolled as an obstacle.
        session.viewport.set_cell(spawn, Cell::Floor);
        for line in intro_lines() {
            session.log.push(line);
        }
        info!(seed, name = %session.player.name, "new game");
        session.spawn_wave();
        session
    }

    /// Resumes a saved game. The RNG stream starts fresh from `seed`.
    pub fn from_snapshot(config: GameConfig, seed: u64, snapshot: GameSnapshot) -> Option<Self> {
        let viewport = Viewport::from_cells(snapshot.width, snapshot.height, snapshot.cells)?;
        if viewport.width != config.map_width || viewport.height != config.map_height {
            return None;
        }
        if !viewport.in_bounds(snapshot.player.point()) {
            return None;
        }
        let mut session = Self::assemble(
            config,
            RandomNumberGenerator::seeded(seed),
            viewport,
            snapshot.player,
            snapshot.enemies,
            snapshot.world_offset,
            snapshot.move_count,
        );
        session.last_boss_distance = snapshot.last_boss_distance;
        session.last_wave_boss_distance = snapshot.last_wave_boss_distance;
        session.enemies.truncate(session.config.enemy_capacity());
        session.log.push(format!(
            "Welcome back, {}. Distance {}.",
            session.player.name, session.player.score
        ));
        Some(session)
    }

    fn assemble(
        config: GameConfig,
        rng: RandomNumberGenerator,
        viewport: Viewport,
        player: Player,
        enemies: Vec<Enemy>,
        world_offset: u32,
        move_count: u32,
    ) -> Self {
        Self {
            generator: TerrainGenerator::from_config(&config),
            behavior: BehaviorContext::new(config.chase_radius),
            rules: ProgressionRules::default(),
            config,
            rng,
            viewport,
            player,
            enemies,
            world_offset,
            move_count,
            last_boss_distance: None,
            last_wave_boss_distance: None,
            log: MessageLog::default(),
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            player: self.player.clone(),
            enemies: self.enemies.clone(),
            width: self.viewport.width,
            height: self.viewport.height,
            cells: self.viewport.cells.clone(),
            world_offset: self.world_offset,
            move_count: self.move_count,
            last_boss_distance: self.last_boss_distance,
            last_wave_boss_distance: self.last_wave_boss_distance,
        }
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            viewport: &self.viewport,
            player: &self.player,
            enemies: &self.enemies,
            world_offset: self.world_offset,
            boss_alive: self.boss_alive(),
            messages: &self.log,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn world_offset(&self) -> u32 {
        self.world_offset
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn messages(&self) -> &MessageLog {
        &self.log
    }

    pub fn boss_alive(&self) -> bool {
        boss_alive(&self.enemies)
    }

    pub fn is_game_over(&self) -> bool {
        !self.player.is_alive()
    }

    pub fn push_message<S: Into<String>>(&mut self, message: S) {
        self.log.push(message);
    }

    /// One full turn for a movement command.
    pub fn take_turn(&mut self, dx: i32, dy: i32) -> TurnReport {
        if self.is_game_over() {
            return TurnReport {
                movement: MoveOutcome::Blocked,
                combat: CombatOutcome::PlayerSlain,
                spawned: 0,
                boss_appeared: false,
                game_over: true,
            };
        }

        let movement = self.move_player(dx, dy);
        self.advance_enemies();
        let combat = self.resolve_collisions();

        self.move_count = self.move_count.wrapping_add(1);
        let mut spawned = 0;
        let mut boss_appeared = movement.boss_spawned();
        if self.move_count % self.config.spawn_interval == 0 {
            let had_boss = self.boss_alive();
            spawned = self.spawn_wave();
            boss_appeared |= !had_boss && self.boss_alive();
        }

        TurnReport {
            movement,
            combat,
            spawned,
            boss_appeared,
            game_over: self.is_game_over(),
        }
    }

    pub fn move_player(&mut self, dx: i32, dy: i32) -> MoveOutcome {
        let target = Point::new(self.player.x + dx, self.player.y + dy);
        if !self.viewport.is_passable(target) {
            debug!(
                x = target.x,
                y = target.y,
                cell = self.viewport.cell_at(target).map_or("edge", |cell| cell.as_str()),
                "move blocked"
            );
            return MoveOutcome::Blocked;
        }

        let wants_shift = dy < 0 && target.y < self.config.shift_threshold();
        if wants_shift && self.boss_alive() {
            self.log.push("A guardian bars the way. Defeat it to progress!");
            debug!(world_offset = self.world_offset, "climb barred, boss alive");
            return MoveOutcome::Barred;
        }

        self.player.x = target.x;
        self.player.y = target.y;
        if dy >= 0 {
            return MoveOutcome::Moved {
                score_gained: 0,
                shift: None,
            };
        }

        let world_row = self.player.y - self.world_offset as i32;
        let score_gained = self.player.reach_row(world_row);
        let shift = wants_shift.then(|| self.shift_world_down());
        MoveOutcome::Moved {
            score_gained,
            shift,
        }
    }

    /// Scrolls the world one row: new terrain on top, everything else down.
    pub fn shift_world_down(&mut self) -> ShiftOutcome {
        if self.boss_alive() {
            self.log.push("A guardian bars the way. Defeat it to progress!");
            debug!(world_offset = self.world_offset, "shift refused, boss alive");
            return ShiftOutcome::Refused;
        }

        let row = self.generator.generate_row(&mut self.rng, self.world_offset);
        self.viewport.push_row(row);

        let height = self.viewport.height;
        self.player.y += 1;
        for enemy in &mut self.enemies {
            enemy.y += 1;
        }
        self.enemies.retain(|enemy| enemy.y < height);

        let mut boss_spawned = false;
        if is_boss_distance(self.world_offset, self.config.boss_interval)
            && self.last_boss_distance != Some(self.world_offset)
        {
            let marker = Point::new(self.generator.boss_marker_column(), 0);
            let boss = EnemyTemplate::boss(self.world_offset);
            self.enemies.push(Enemy::from_template(&boss, marker));
            self.last_boss_distance = Some(self.world_offset);
            self.log.push("!!! BOSS AHEAD !!! Defeat it to progress!");
            info!(world_offset = self.world_offset, "boss room reached");
            boss_spawned = true;
        }

        self.world_offset += 1;
        ShiftOutcome::Shifted { boss_spawned }
    }

    pub fn spawn_wave(&mut self) -> usize {
        let spawner = Spawner {
            config: &self.config,
            viewport: &self.viewport,
            player: self.player.point(),
            world_offset: self.world_offset,
        };
        spawner.spawn_wave(
            &mut self.enemies,
            &mut self.last_wave_boss_distance,
            &mut self.rng,
            &mut self.log,
        )
    }

    pub fn advance_enemies(&mut self) -> usize {
        advance_enemies(
            &mut self.enemies,
            self.player.point(),
            &self.viewport,
            &self.behavior,
            &mut self.rng,
        )
    }

    pub fn resolve_collisions(&mut self) -> CombatOutcome {
        resolve_collisions(&mut self.player, &mut self.enemies, &self.rules, &mut self.log)
    }
}
