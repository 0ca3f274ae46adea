use std::{
    fs, io,
    path::{Path, PathBuf},
};

use bincode::Options;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    map::Cell,
    session::entities::{Enemy, MAX_NAME_LEN, Player},
};

use super::{PersistError, atomic_write};

const SAVE_MAGIC: [u8; 4] = *b"RGBY";
const SAVE_VERSION: u16 = 2;

/// Everything needed to resume a session exactly where it stopped.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSnapshot {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub width: i32,
    pub height: i32,
    /// Row-major, `width * height` cells.
    pub cells: Vec<Cell>,
    pub world_offset: u32,
    pub move_count: u32,
    pub last_boss_distance: Option<u32>,
    pub last_wave_boss_distance: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SaveHeader {
    magic: [u8; 4],
    version: u16,
    saved_at: i64,
}

/// The player as stored: the name is padded to `MAX_NAME_LEN` code points.
#[derive(Serialize, Deserialize)]
struct PlayerRecord {
    x: i32,
    y: i32,
    hp: i32,
    max_hp: i32,
    strength: i32,
    level: i32,
    xp: i32,
    xp_to_level: i32,
    score: u32,
    summit_row: i32,
    name_len: u8,
    name: Vec<u32>,
}

#[derive(Serialize, Deserialize)]
struct EnemySlot {
    active: bool,
    enemy: Enemy,
}

#[derive(Serialize, Deserialize)]
struct DistanceMark {
    set: bool,
    distance: u32,
}

/// On-disk layout. For a given map size and enemy capacity every field has
/// the same encoded width, so every save in a slot has the same length.
#[derive(Serialize, Deserialize)]
struct SaveRecord {
    header: SaveHeader,
    player: PlayerRecord,
    enemies: Vec<EnemySlot>,
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    world_offset: u32,
    move_count: u32,
    last_boss: DistanceMark,
    last_wave_boss: DistanceMark,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

impl PlayerRecord {
    fn from_player(player: &Player) -> Self {
        let mut name: Vec<u32> = player.name.chars().take(MAX_NAME_LEN).map(u32::from).collect();
        let name_len = name.len() as u8;
        name.resize(MAX_NAME_LEN, 0);
        Self {
            x: player.x,
            y: player.y,
            hp: player.hp,
            max_hp: player.max_hp,
            strength: player.strength,
            level: player.level,
            xp: player.xp,
            xp_to_level: player.xp_to_level,
            score: player.score,
            summit_row: player.summit_row,
            name_len,
            name,
        }
    }

    fn into_player(self) -> Option<Player> {
        let name = self
            .name
            .get(..usize::from(self.name_len))?
            .iter()
            .map(|code| char::from_u32(*code))
            .collect::<Option<String>>()?;
        Some(Player {
            x: self.x,
            y: self.y,
            hp: self.hp,
            max_hp: self.max_hp,
            strength: self.strength,
            level: self.level,
            xp: self.xp,
            xp_to_level: self.xp_to_level,
            score: self.score,
            summit_row: self.summit_row,
            name,
        })
    }
}

impl DistanceMark {
    fn new(distance: Option<u32>) -> Self {
        Self {
            set: distance.is_some(),
            distance: distance.unwrap_or_default(),
        }
    }

    fn get(&self) -> Option<u32> {
        self.set.then_some(self.distance)
    }
}

impl SaveRecord {
    fn new(snapshot: &GameSnapshot, capacity: usize, saved_at: i64) -> Result<Self, PersistError> {
        if snapshot.enemies.len() > capacity {
            return Err(PersistError::TooManyEnemies {
                count: snapshot.enemies.len(),
                capacity,
            });
        }
        let mut enemies: Vec<EnemySlot> = snapshot
            .enemies
            .iter()
            .map(|enemy| EnemySlot {
                active: true,
                enemy: enemy.clone(),
            })
            .collect();
        enemies.resize_with(capacity, || EnemySlot {
            active: false,
            enemy: Enemy::default(),
        });

        Ok(Self {
            header: SaveHeader {
                magic: SAVE_MAGIC,
                version: SAVE_VERSION,
                saved_at,
            },
            player: PlayerRecord::from_player(&snapshot.player),
            enemies,
            width: snapshot.width,
            height: snapshot.height,
            cells: snapshot.cells.clone(),
            world_offset: snapshot.world_offset,
            move_count: snapshot.move_count,
            last_boss: DistanceMark::new(snapshot.last_boss_distance),
            last_wave_boss: DistanceMark::new(snapshot.last_wave_boss_distance),
        })
    }

    /// `None` when the record does not describe a well-formed map.
    fn into_snapshot(self) -> Option<GameSnapshot> {
        if self.width <= 0 || self.height <= 0 {
            return None;
        }
        let expected = usize::try_from(self.width.checked_mul(self.height)?).ok()?;
        if self.cells.len() != expected {
            return None;
        }
        Some(GameSnapshot {
            player: self.player.into_player()?,
            enemies: self
                .enemies
                .into_iter()
                .filter(|slot| slot.active)
                .map(|slot| slot.enemy)
                .collect(),
            width: self.width,
            height: self.height,
            cells: self.cells,
            world_offset: self.world_offset,
            move_count: self.move_count,
            last_boss_distance: self.last_boss.get(),
            last_wave_boss_distance: self.last_wave_boss.get(),
        })
    }
}

/// What the main menu shows next to "Continue".
#[derive(Clone, Debug, PartialEq)]
pub struct SaveSummary {
    pub name: String,
    pub level: i32,
    pub score: u32,
    pub saved_at: Option<DateTime<Utc>>,
}

/// The single save slot on disk. `capacity` is the number of enemy slots
/// every record reserves.
#[derive(Clone, Debug)]
pub struct SaveSlot {
    path: PathBuf,
    capacity: usize,
}

impl SaveSlot {
    pub fn new<P: Into<PathBuf>>(path: P, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, snapshot: &GameSnapshot) -> Result<(), PersistError> {
        if !snapshot.player.is_alive() {
            return Err(PersistError::DeadPlayer);
        }
        let record = SaveRecord::new(snapshot, self.capacity, Utc::now().timestamp())?;
        let bytes = codec().serialize(&record).map_err(PersistError::Encode)?;
        atomic_write(&self.path, &bytes)?;
        info!(
            path = %self.path.display(),
            score = snapshot.player.score,
            bytes = bytes.len(),
            "game saved"
        );
        Ok(())
    }

    /// `Ok(None)` when there is nothing usable to resume. A save holding a
    /// dead player is deleted on the way.
    pub fn load(&self) -> Result<Option<GameSnapshot>, PersistError> {
        let Some((_, snapshot)) = self.read()? else {
            return Ok(None);
        };
        if !snapshot.player.is_alive() {
            warn!(path = %self.path.display(), "save holds a defeated player, discarding");
            self.delete()?;
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    pub fn peek(&self) -> Option<SaveSummary> {
        let (header, snapshot) = self.read().ok()??;
        let player = snapshot.player;
        if !player.is_alive() {
            return None;
        }
        Some(SaveSummary {
            name: player.name,
            level: player.level,
            score: player.score,
            saved_at: DateTime::from_timestamp(header.saved_at, 0),
        })
    }

    pub fn delete(&self) -> Result<(), PersistError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistError::io(&self.path, e)),
        }
    }

    fn read(&self) -> Result<Option<(SaveHeader, GameSnapshot)>, PersistError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistError::io(&self.path, e)),
        };
        let record: SaveRecord = match codec().deserialize(&bytes) {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %self.path.display(), "unreadable save, ignoring: {e}");
                return Ok(None);
            }
        };
        if record.header.magic != SAVE_MAGIC || record.header.version != SAVE_VERSION {
            warn!(
                path = %self.path.display(),
                version = record.header.version,
                "save header mismatch, ignoring"
            );
            return Ok(None);
        }
        let header = record.header.clone();
        let (width, height) = (record.width, record.height);
        let Some(snapshot) = record.into_snapshot() else {
            warn!(path = %self.path.display(), width, height, "save is malformed, ignoring");
            return Ok(None);
        };
        Ok(Some((header, snapshot)))
    }
}
