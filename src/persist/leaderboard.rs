use std::{
    cmp::Ordering,
    fmt::Write as _,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::session::entities::sanitize_name;

use super::{PersistError, atomic_write};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub level: i32,
    pub distance: u32,
}

impl LeaderboardEntry {
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| other.level.cmp(&self.level))
    }

    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let name = parts.next()?;
        let level = parts.next()?.parse::<i32>().ok()?;
        let distance = parts.next()?.parse::<u32>().ok()?;
        if parts.next().is_some() || level <= 0 {
            return None;
        }
        Some(Self {
            name: sanitize_name(name),
            level,
            distance,
        })
    }
}

/// Best runs, sorted by distance then level, one entry per name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaderboard {
    capacity: usize,
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.name == name)
            .map(|idx| idx + 1)
    }

    /// Upsert by name. Returns true when the board changed.
    pub fn record(&mut self, name: &str, level: i32, distance: u32) -> bool {
        let name = sanitize_name(name);
        let changed = if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            if distance > entry.distance {
                entry.distance = distance;
                entry.level = level;
                true
            } else {
                false
            }
        } else if self.entries.len() < self.capacity {
            self.entries.push(LeaderboardEntry {
                name,
                level,
                distance,
            });
            true
        } else {
            // Sorted, so the weakest entry sits last.
            match self.entries.last_mut() {
                Some(lowest) if distance > lowest.distance => {
                    *lowest = LeaderboardEntry {
                        name,
                        level,
                        distance,
                    };
                    true
                }
                _ => false,
            }
        };
        self.entries.sort_by(LeaderboardEntry::rank_cmp);
        changed
    }

    /// Lenient parse: malformed lines are skipped, duplicates keep the best.
    pub fn parse(text: &str, capacity: usize) -> Self {
        let mut parsed: Vec<LeaderboardEntry> = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match LeaderboardEntry::parse(line) {
                Some(entry) => parsed.push(entry),
                None => warn!(line = line_no + 1, "skipping malformed leaderboard line"),
            }
        }

        parsed.sort_by(LeaderboardEntry::rank_cmp);
        let mut board = Self::new(capacity);
        for entry in parsed {
            if board.entries.iter().any(|kept| kept.name == entry.name) {
                continue;
            }
            board.entries.push(entry);
            if board.entries.len() == board.capacity {
                break;
            }
        }
        board
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(out, "{} {} {}", entry.name, entry.level, entry.distance);
        }
        out
    }
}

/// The leaderboard file: read, update, atomically replace.
#[derive(Clone, Debug)]
pub struct LeaderboardStore {
    path: PathBuf,
    capacity: usize,
}

impl LeaderboardStore {
    pub fn new<P: Into<PathBuf>>(path: P, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file is an empty board.
    pub fn load(&self) -> Leaderboard {
        match fs::read_to_string(&self.path) {
            Ok(text) => Leaderboard::parse(&text, self.capacity),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Leaderboard::new(self.capacity),
            Err(e) => {
                warn!(path = %self.path.display(), "cannot read leaderboard: {e}");
                Leaderboard::new(self.capacity)
            }
        }
    }

    pub fn save(&self, board: &Leaderboard) -> Result<(), PersistError> {
        atomic_write(&self.path, board.to_text().as_bytes())
    }

    pub fn record_score(
        &self,
        name: &str,
        level: i32,
        score: u32,
    ) -> Result<Leaderboard, PersistError> {
        let mut board = self.load();
        if board.record(name, level, score) {
            self.save(&board)?;
            info!(name, level, score, rank = ?board.rank_of(&sanitize_name(name)), "leaderboard updated");
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sorted_and_unique(board: &Leaderboard) {
        for pair in board.entries().windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!((a.distance, a.level) >= (b.distance, b.level));
        }
        let mut names: Vec<_> = board.entries().iter().map(|e| e.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), board.len());
    }

    #[test]
    fn entries_sort_by_distance_then_level() {
        let mut board = Leaderboard::new(10);
        board.record("amy", 2, 50);
        board.record("bob", 5, 50);
        board.record("cat", 1, 90);

        let names: Vec<_> = board.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["cat", "bob", "amy"]);
        assert_sorted_and_unique(&board);
    }

    #[test]
    fn re_entry_only_improves() {
        let mut board = Leaderboard::new(10);
        assert!(board.record("amy", 3, 40));
        assert!(!board.record("amy", 9, 30));
        assert_eq!(board.entries()[0].level, 3);
        assert!(board.record("amy", 4, 41));
        assert_eq!(board.len(), 1);
        assert_eq!(board.entries()[0].distance, 41);
    }

    #[test]
    fn full_board_evicts_only_for_strictly_better_scores() {
        let mut board = Leaderboard::new(3);
        board.record("a", 1, 10);
        board.record("b", 1, 20);
        board.record("c", 1, 30);

        assert!(!board.record("d", 9, 10));
        assert_eq!(board.len(), 3);
        assert!(board.rank_of("d").is_none());

        assert!(board.record("e", 1, 11));
        assert_eq!(board.len(), 3);
        assert!(board.rank_of("a").is_none());
        assert_eq!(board.rank_of("e"), Some(3));
        assert_sorted_and_unique(&board);
    }

    #[test]
    fn parse_skips_garbage_and_duplicates() {
        let text = "zed 3 100\nbroken line\nzed 1 20\nann 0 50\nbo 2 70 extra\nkim 2 70\n\n";
        let board = Leaderboard::parse(text, 10);

        assert_eq!(board.len(), 2);
        assert_eq!(board.entries()[0].name, "zed");
        assert_eq!(board.entries()[0].distance, 100);
        assert_eq!(board.entries()[1].name, "kim");
    }

    #[test]
    fn text_round_trip() {
        let mut board = Leaderboard::new(5);
        board.record("first", 4, 120);
        board.record("second", 2, 60);
        assert_eq!(Leaderboard::parse(&board.to_text(), 5), board);
    }

    #[test]
    fn store_records_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = LeaderboardStore::new(dir.path().join("leaderboard.txt"), 10);

        store.record_score("grace hopper", 3, 77).unwrap();
        let board = store.record_score("linus", 1, 12).unwrap();

        assert_eq!(board.len(), 2);
        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "grace_hopper 3 77\nlinus 1 12\n");
        assert_eq!(store.load(), board);
    }
}
