use bracket_geometry::prelude::Point;
use serde::{Deserialize, Serialize};

use crate::data::{ProgressionRules, monsters::EnemyTemplate};

pub const MAX_NAME_LEN: usize = 49;
pub const DEFAULT_NAME: &str = "Wanderer";

/// Leaderboard lines are whitespace separated, so names carry none.
pub fn sanitize_name(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .take(MAX_NAME_LEN)
        .collect();
    if cleaned.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        cleaned
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    pub hp: i32,
    pub max_hp: i32,
    pub strength: i32,
    pub level: i32,
    pub xp: i32,
    pub xp_to_level: i32,
    pub score: u32,
    /// Lowest world row reached so far (world row = y - world offset).
    pub summit_row: i32,
    pub name: String,
}

impl Player {
    pub fn new(name: &str, spawn: Point, rules: &ProgressionRules) -> Self {
        Self {
            x: spawn.x,
            y: spawn.y,
            hp: rules.start_max_hp,
            max_hp: rules.start_max_hp,
            strength: rules.start_strength,
            level: 1,
            xp: 0,
            xp_to_level: rules.start_xp_to_level,
            score: 0,
            summit_row: spawn.y,
            name: sanitize_name(name),
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Records a new world row; returns the score gained.
    pub fn reach_row(&mut self, world_row: i32) -> u32 {
        if world_row >= self.summit_row {
            return 0;
        }
        let gained = (self.summit_row - world_row) as u32;
        self.summit_row = world_row;
        self.score += gained;
        gained
    }

    /// Adds experience and applies every level-up it pays for.
    pub fn gain_xp(&mut self, amount: i32, rules: &ProgressionRules) -> u32 {
        self.xp += amount.max(0);
        let mut levels = 0;
        while self.xp >= self.xp_to_level {
            self.xp -= self.xp_to_level;
            self.xp_to_level = rules.next_threshold(self.xp_to_level);
            self.level += 1;
            self.max_hp += rules.level_hp_bonus;
            self.hp = self.max_hp;
            self.strength += rules.level_strength_bonus;
            levels += 1;
        }
        levels
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount.max(0)).max(0);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub x: i32,
    pub y: i32,
    pub hp: i32,
    pub strength: i32,
    pub xp_value: i32,
    pub is_boss: bool,
}

impl Enemy {
    pub fn from_template(template: &EnemyTemplate, point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            hp: template.hp,
            strength: template.strength,
            xp_value: template.xp_value,
            is_boss: template.is_boss,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn name(&self) -> &'static str {
        if self.is_boss { "The guardian" } else { "The crawler" }
    }
}

pub fn boss_alive(enemies: &[Enemy]) -> bool {
    enemies.iter().any(|enemy| enemy.is_boss)
}

/// True when an enemy other than `enemies[except]` stands on `point`.
pub fn occupied(enemies: &[Enemy], point: Point, except: Option<usize>) -> bool {
    enemies
        .iter()
        .enumerate()
        .any(|(idx, enemy)| Some(idx) != except && enemy.point() == point)
}
