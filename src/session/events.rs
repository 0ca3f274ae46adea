use std::collections::VecDeque;

pub const LOG_MAX_ENTRIES: usize = 8;

/// Most recent messages first.
#[derive(Clone, Debug, Default)]
pub struct MessageLog {
    entries: VecDeque<String>,
}

impl MessageLog {
    pub fn push<S: Into<String>>(&mut self, entry: S) {
        self.entries.push_front(entry.into());
        self.entries.truncate(LOG_MAX_ENTRIES);
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShiftOutcome {
    Shifted { boss_spawned: bool },
    /// A living boss holds the world in place.
    Refused,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Destination out of bounds or impassable; nothing changed.
    Blocked,
    /// The step would scroll the world while a boss lives; nothing changed.
    Barred,
    Moved {
        score_gained: u32,
        shift: Option<ShiftOutcome>,
    },
}

impl MoveOutcome {
    pub fn boss_spawned(&self) -> bool {
        matches!(
            self,
            MoveOutcome::Moved {
                shift: Some(ShiftOutcome::Shifted { boss_spawned: true }),
                ..
            }
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CombatOutcome {
    /// Nobody shares the player's cell.
    Quiet,
    EnemySlain {
        xp: i32,
        was_boss: bool,
        levels_gained: u32,
    },
    Exchanged {
        dealt: i32,
        taken: i32,
    },
    PlayerSlain,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub movement: MoveOutcome,
    pub combat: CombatOutcome,
    pub spawned: usize,
    pub boss_appeared: bool,
    pub game_over: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_keeps_newest_entries() {
        let mut log = MessageLog::default();
        for idx in 0..12 {
            log.push(format!("entry {idx}"));
        }
        assert_eq!(log.len(), LOG_MAX_ENTRIES);
        assert_eq!(log.latest(), Some("entry 11"));
        assert_eq!(log.entries().last(), Some("entry 4"));
    }
}
