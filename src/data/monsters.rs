use crate::config::GameConfig;

/// Stats for a freshly spawned enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyTemplate {
    pub name: &'static str,
    pub hp: i32,
    pub strength: i32,
    pub xp_value: i32,
    pub is_boss: bool,
}

impl EnemyTemplate {
    pub fn regular(config: &GameConfig, world_offset: u32) -> Self {
        let progress = config.progress_factor(world_offset);
        Self::new(
            "Byte Crawler",
            (10.0 * progress) as i32,
            (4.0 * progress) as i32,
            (5.0 * progress) as i32,
            false,
        )
    }

    pub fn boss(world_offset: u32) -> Self {
        let offset = world_offset as i32;
        Self::new(
            "Stack Guardian",
            40 + offset / 30,
            8 + offset / 60,
            80 + offset / 25,
            true,
        )
    }

    fn new(
        name: &'static str,
        hp: i32,
        strength: i32,
        xp_value: i32,
        is_boss: bool,
    ) -> Self {
        Self {
            name,
            hp,
            strength,
            xp_value,
            is_boss,
        }
    }
}
