use tracing::info;

use crate::data::ProgressionRules;

use super::{
    entities::{Enemy, Player},
    events::{CombatOutcome, MessageLog},
};

/// Settles the fight on the player's cell, if there is one.
pub fn resolve_collisions(
    player: &mut Player,
    enemies: &mut Vec<Enemy>,
    rules: &ProgressionRules,
    log: &mut MessageLog,
) -> CombatOutcome {
    let Some(idx) = enemies
        .iter()
        .position(|enemy| enemy.point() == player.point())
    else {
        return CombatOutcome::Quiet;
    };
    if !player.is_alive() {
        return CombatOutcome::PlayerSlain;
    }

    let dealt = player.strength;
    enemies[idx].hp -= dealt;
    log.push(format!("You strike {} for {dealt}", enemies[idx].name()));

    if enemies[idx].hp <= 0 {
        let enemy = enemies.remove(idx);
        if enemy.is_boss {
            player.strength += rules.boss_strength_bonus;
            log.push("VICTORY! Boss defeated! You feel stronger!");
            info!(strength = player.strength, "boss defeated");
        } else {
            log.push(format!("{} falls. +{} xp", enemy.name(), enemy.xp_value));
        }
        let levels_gained = player.gain_xp(enemy.xp_value, rules);
        if levels_gained > 0 {
            log.push(format!("Level up! You are now level {}.", player.level));
            info!(level = player.level, levels_gained, "player levelled up");
        }
        return CombatOutcome::EnemySlain {
            xp: enemy.xp_value,
            was_boss: enemy.is_boss,
            levels_gained,
        };
    }

    let taken = enemies[idx].strength;
    player.take_damage(taken);
    log.push(format!("{} hits you for {taken}", enemies[idx].name()));
    if !player.is_alive() {
        log.push("You have fallen.");
        info!(score = player.score, level = player.level, "player slain");
        return CombatOutcome::PlayerSlain;
    }
    CombatOutcome::Exchanged { dealt, taken }
}

#[cfg(test)]
mod tests {
    use bracket_geometry::prelude::Point;

    use super::*;
    use crate::data::monsters::EnemyTemplate;

    fn player_at(x: i32, y: i32) -> Player {
        Player::new("tester", Point::new(x, y), &ProgressionRules::default())
    }

    fn enemy_at(x: i32, y: i32, hp: i32, strength: i32) -> Enemy {
        Enemy {
            x,
            y,
            hp,
            strength,
            xp_value: 5,
            is_boss: false,
        }
    }

    #[test]
    fn no_enemies_means_no_combat() {
        let mut player = player_at(5, 5);
        let before = player.clone();
        let mut enemies = Vec::new();
        let mut log = MessageLog::default();

        let outcome = resolve_collisions(
            &mut player,
            &mut enemies,
            &ProgressionRules::default(),
            &mut log,
        );

        assert_eq!(outcome, CombatOutcome::Quiet);
        assert_eq!(player, before);
        assert!(log.is_empty());
    }

    #[test]
    fn lethal_hit_removes_enemy_and_awards_xp() {
        let mut player = player_at(5, 5);
        let mut enemies = vec![enemy_at(9, 9, 10, 3), enemy_at(5, 5, 5, 4)];
        let mut log = MessageLog::default();

        let outcome = resolve_collisions(
            &mut player,
            &mut enemies,
            &ProgressionRules::default(),
            &mut log,
        );

        assert_eq!(
            outcome,
            CombatOutcome::EnemySlain {
                xp: 5,
                was_boss: false,
                levels_gained: 0
            }
        );
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].point(), Point::new(9, 9));
        assert_eq!(player.xp, 5);
        assert_eq!(player.hp, 20);
    }

    #[test]
    fn surviving_enemy_strikes_back() {
        let mut player = player_at(5, 5);
        let mut enemies = vec![enemy_at(5, 5, 12, 4)];
        let mut log = MessageLog::default();

        let outcome = resolve_collisions(
            &mut player,
            &mut enemies,
            &ProgressionRules::default(),
            &mut log,
        );

        assert_eq!(outcome, CombatOutcome::Exchanged { dealt: 5, taken: 4 });
        assert_eq!(enemies[0].hp, 7);
        assert_eq!(player.hp, 16);
    }

    #[test]
    fn fatal_counterattack_clamps_hp() {
        let mut player = player_at(5, 5);
        player.hp = 3;
        let mut enemies = vec![enemy_at(5, 5, 50, 9)];
        let mut log = MessageLog::default();

        let outcome = resolve_collisions(
            &mut player,
            &mut enemies,
            &ProgressionRules::default(),
            &mut log,
        );

        assert_eq!(outcome, CombatOutcome::PlayerSlain);
        assert_eq!(player.hp, 0);
    }

    #[test]
    fn boss_kill_grants_strength() {
        let mut player = player_at(5, 5);
        player.strength = 60;
        let mut boss = Enemy::from_template(&EnemyTemplate::boss(200), Point::new(5, 5));
        boss.xp_value = 1;
        let mut enemies = vec![boss];
        let mut log = MessageLog::default();

        resolve_collisions(
            &mut player,
            &mut enemies,
            &ProgressionRules::default(),
            &mut log,
        );

        assert!(enemies.is_empty());
        assert_eq!(player.strength, 65);
    }
}
