use std::time::Duration;

use tracing::{info, warn};

use crate::{
    config::GameConfig,
    persist::{Leaderboard, LeaderboardStore, SaveSlot},
    session::{Session, SessionView, events::TurnReport},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Save,
    Quit,
    ShowLeaderboard,
}

impl Command {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(Command::Up),
            's' => Some(Command::Down),
            'a' => Some(Command::Left),
            'd' => Some(Command::Right),
            'p' => Some(Command::Save),
            'q' => Some(Command::Quit),
            'l' => Some(Command::ShowLeaderboard),
            _ => None,
        }
    }

    pub fn delta(&self) -> Option<(i32, i32)> {
        match self {
            Command::Up => Some((0, -1)),
            Command::Down => Some((0, 1)),
            Command::Left => Some((-1, 0)),
            Command::Right => Some((1, 0)),
            _ => None,
        }
    }
}

/// Supplies one command per turn. `None` means input is exhausted.
pub trait CommandSource {
    fn next_command(&mut self) -> Option<Command>;
}

/// Draws whatever the session looks like right now.
pub trait RenderPort {
    fn present(&mut self, view: &SessionView<'_>);

    /// A banner that should stay up for `hold` before input resumes.
    fn announce(&mut self, _text: &str, _hold: Duration) {}

    fn present_leaderboard(&mut self, _board: &Leaderboard) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Continue(TurnReport),
    /// Nothing happened; the command did not apply.
    Ignored,
    Saved,
    SaveFailed(String),
    Quit,
    ShowLeaderboard(Leaderboard),
    GameOver { score: u32, level: i32, rank: Option<usize> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Saved,
    Quit,
    GameOver { score: u32, level: i32, rank: Option<usize> },
}

/// Owns a running session plus the files it persists to.
pub struct GameLoop {
    session: Session,
    saves: SaveSlot,
    board: LeaderboardStore,
}

impl GameLoop {
    pub fn new(session: Session, saves: SaveSlot, board: LeaderboardStore) -> Self {
        Self {
            session,
            saves,
            board,
        }
    }

    pub fn stores_for(config: &GameConfig) -> (SaveSlot, LeaderboardStore) {
        (
            SaveSlot::new(config.save_path.clone(), config.enemy_capacity()),
            LeaderboardStore::new(config.leaderboard_path.clone(), config.leaderboard_capacity),
        )
    }

    /// Starts fresh, discarding any save in the slot.
    pub fn start_new(config: GameConfig, seed: u64, name: &str) -> Self {
        let (saves, board) = Self::stores_for(&config);
        if let Err(e) = saves.delete() {
            warn!("could not clear old save: {e}");
        }
        Self::new(Session::new_game(config, seed, name), saves, board)
    }

    /// Resumes the saved session, if the slot holds one.
    pub fn resume(config: GameConfig, seed: u64) -> Option<Self> {
        let (saves, board) = Self::stores_for(&config);
        let snapshot = match saves.load() {
            Ok(snapshot) => snapshot?,
            Err(e) => {
                warn!("could not load save: {e}");
                return None;
            }
        };
        let session = Session::from_snapshot(config, seed, snapshot)?;
        info!(name = %session.player().name, score = session.player().score, "session resumed");
        Some(Self::new(session, saves, board))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn leaderboard(&self) -> Leaderboard {
        self.board.load()
    }

    pub fn handle(&mut self, command: Command) -> Step {
        if self.session.is_game_over() {
            return self.finish();
        }

        if let Some((dx, dy)) = command.delta() {
            let report = self.session.take_turn(dx, dy);
            if report.game_over {
                return self.finish();
            }
            return Step::Continue(report);
        }

        match command {
            Command::Save => match self.saves.save(&self.session.snapshot()) {
                Ok(()) => {
                    self.session.push_message("Game saved!");
                    Step::Saved
                }
                Err(e) => {
                    warn!("save failed: {e}");
                    self.session.push_message("Save failed!");
                    Step::SaveFailed(e.to_string())
                }
            },
            Command::Quit => {
                info!(score = self.session.player().score, "quit to menu");
                Step::Quit
            }
            Command::ShowLeaderboard => Step::ShowLeaderboard(self.board.load()),
            _ => Step::Ignored,
        }
    }

    /// Records the run and clears the save slot.
    fn finish(&mut self) -> Step {
        let player = self.session.player();
        let (score, level) = (player.score, player.level);
        let rank = match self.board.record_score(&player.name, level, score) {
            Ok(board) => board.rank_of(&player.name),
            Err(e) => {
                warn!("could not record score: {e}");
                None
            }
        };
        if let Err(e) = self.saves.delete() {
            warn!("could not remove save after game over: {e}");
        }
        info!(score, level, ?rank, "game over");
        Step::GameOver { score, level, rank }
    }

    /// Pulls commands until the session ends or input runs dry.
    pub fn run<I, R>(&mut self, input: &mut I, renderer: &mut R) -> RunOutcome
    where
        I: CommandSource,
        R: RenderPort,
    {
        let hold = self.session.config().banner_hold();
        renderer.present(&self.session.view());
        loop {
            let Some(command) = input.next_command() else {
                return RunOutcome::Quit;
            };
            match self.handle(command) {
                Step::Continue(report) => {
                    if report.boss_appeared {
                        renderer.announce("!!! BOSS AHEAD !!!", hold);
                    }
                }
                Step::Ignored | Step::SaveFailed(_) => {}
                Step::ShowLeaderboard(board) => renderer.present_leaderboard(&board),
                Step::Saved => {
                    renderer.present(&self.session.view());
                    return RunOutcome::Saved;
                }
                Step::Quit => return RunOutcome::Quit,
                Step::GameOver { score, level, rank } => {
                    renderer.present(&self.session.view());
                    return RunOutcome::GameOver { score, level, rank };
                }
            }
            renderer.present(&self.session.view());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_keys() {
        assert_eq!(Command::from_char('W'), Some(Command::Up));
        assert_eq!(Command::from_char('p'), Some(Command::Save));
        assert_eq!(Command::from_char('l'), Some(Command::ShowLeaderboard));
        assert_eq!(Command::from_char('z'), None);
        assert_eq!(Command::Left.delta(), Some((-1, 0)));
        assert_eq!(Command::Quit.delta(), None);
    }
}
