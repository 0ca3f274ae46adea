pub mod monsters;

/// Starting stats and per-level growth for the player.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressionRules {
    pub start_max_hp: i32,
    pub start_strength: i32,
    pub start_xp_to_level: i32,
    pub level_hp_bonus: i32,
    pub level_strength_bonus: i32,
    pub threshold_multiplier: f32,
    pub boss_strength_bonus: i32,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            start_max_hp: 20,
            start_strength: 5,
            start_xp_to_level: 10,
            level_hp_bonus: 5,
            level_strength_bonus: 2,
            threshold_multiplier: 1.5,
            boss_strength_bonus: 5,
        }
    }
}

impl ProgressionRules {
    pub fn next_threshold(&self, current: i32) -> i32 {
        ((current as f32 * self.threshold_multiplier) as i32).max(current + 1)
    }
}

pub fn intro_lines() -> Vec<&'static str> {
    vec![
        "Climb! Every new row you reach is a point.",
        "Walls and crates block you; water does not.",
        "Every 200 rows a guardian waits. Beat it to go on.",
    ]
}
