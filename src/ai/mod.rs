use bracket_geometry::prelude::{DistanceAlg, Point};
use bracket_random::prelude::RandomNumberGenerator;

use crate::{
    map::Viewport,
    session::entities::{Enemy, occupied},
};

/// Up, down, left, right: the only moves an enemy ever makes.
pub const CARDINALS: [Point; 4] = [
    Point { x: 0, y: -1 },
    Point { x: 0, y: 1 },
    Point { x: -1, y: 0 },
    Point { x: 1, y: 0 },
];

pub fn chebyshev(a: Point, b: Point) -> i32 {
    DistanceAlg::Chebyshev.distance2d(a, b) as i32
}

#[derive(Clone, Debug)]
pub struct BehaviorContext {
    pub chase_radius: i32,
}

impl BehaviorContext {
    pub const fn new(chase_radius: i32) -> Self {
        Self { chase_radius }
    }

    /// Picks the step an enemy at `from` wants to take this turn. The caller
    /// still has to check the destination.
    pub fn choose_step(
        &self,
        from: Point,
        player: Point,
        rng: &mut RandomNumberGenerator,
    ) -> Option<Point> {
        if chebyshev(from, player) <= self.chase_radius {
            step_towards(from, player)
        } else {
            Some(CARDINALS[rng.range(0, CARDINALS.len() as i32) as usize])
        }
    }
}

/// One cell along the axis with the larger gap; ties go horizontal.
pub fn step_towards(from: Point, to: Point) -> Option<Point> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0 && dy == 0 {
        return None;
    }
    if dx.abs() >= dy.abs() {
        Some(Point::new(dx.signum(), 0))
    } else {
        Some(Point::new(0, dy.signum()))
    }
}

/// Moves every enemy at most one cardinal step. Blocked steps are skipped.
pub fn advance_enemies(
    enemies: &mut [Enemy],
    player: Point,
    viewport: &Viewport,
    behavior: &BehaviorContext,
    rng: &mut RandomNumberGenerator,
) -> usize {
    let mut moved = 0;
    for idx in 0..enemies.len() {
        let from = enemies[idx].point();
        // Engaged enemies hold their ground.
        if from == player {
            continue;
        }
        let Some(step) = behavior.choose_step(from, player, rng) else {
            continue;
        };
        let target = Point::new(from.x + step.x, from.y + step.y);
        if !viewport.is_passable(target) || occupied(enemies, target, Some(idx)) {
            continue;
        }
        enemies[idx].x = target.x;
        enemies[idx].y = target.y;
        moved += 1;
    }
    moved
}
