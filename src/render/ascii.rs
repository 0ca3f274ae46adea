use std::{fmt::Write as _, time::Duration};

use crate::{
    game::RenderPort,
    persist::Leaderboard,
    session::SessionView,
};

use super::cell_glyph;

/// Plain-text frame: map rows with entities drawn over them, then the
/// stats line and the newest log entry.
pub fn ascii_frame(view: &SessionView<'_>) -> String {
    let mut grid: Vec<Vec<char>> = view
        .viewport
        .rows()
        .map(|row| row.iter().map(|cell| cell_glyph(*cell)).collect())
        .collect();

    let mut put = |x: i32, y: i32, glyph: char| {
        if let Some(slot) = grid
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *slot = glyph;
        }
    };
    for enemy in view.enemies {
        put(enemy.x, enemy.y, if enemy.is_boss { 'B' } else { 'e' });
    }
    put(view.player.x, view.player.y, '@');

    let mut out = String::new();
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    let player = view.player;
    let _ = writeln!(
        out,
        "{} | HP: {}/{} | STR: {} | LVL: {} | XP: {}/{} | Score: {}",
        player.name,
        player.hp,
        player.max_hp,
        player.strength,
        player.level,
        player.xp,
        player.xp_to_level,
        player.score
    );
    if let Some(latest) = view.messages.latest() {
        let _ = writeln!(out, "> {latest}");
    }
    out
}

pub fn ascii_leaderboard(board: &Leaderboard) -> String {
    let mut out = String::from("=== LEADERBOARD ===\n");
    if board.is_empty() {
        out.push_str("No runs yet.\n");
    }
    for (idx, entry) in board.entries().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {:<12} LVL {:>3}  {:>5}",
            idx + 1,
            entry.name,
            entry.level,
            entry.distance
        );
    }
    out
}

/// Headless renderer. Keeps the latest frame instead of drawing it.
#[derive(Default)]
pub struct AsciiRenderer {
    pub last_frame: String,
    pub frames: usize,
    pub banners: Vec<String>,
    pub leaderboards: Vec<String>,
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderPort for AsciiRenderer {
    fn present(&mut self, view: &SessionView<'_>) {
        self.last_frame = ascii_frame(view);
        self.frames += 1;
    }

    // Banners are recorded, not waited on.
    fn announce(&mut self, text: &str, _hold: Duration) {
        self.banners.push(text.to_string());
    }

    fn present_leaderboard(&mut self, board: &Leaderboard) {
        self.leaderboards.push(ascii_leaderboard(board));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::GameConfig, session::Session};

    #[test]
    fn frame_draws_player_over_the_map() {
        let session = Session::new_game(GameConfig::default(), 7, "ascii");
        let frame = ascii_frame(&session.view());
        let lines: Vec<&str> = frame.lines().collect();

        assert_eq!(lines.len(), 12 + 2);
        assert!(lines.iter().take(12).all(|line| line.chars().count() == 40));
        assert_eq!(lines[6].chars().nth(20), Some('@'));
        assert!(lines[0].starts_with('|') && lines[0].ends_with('|'));
        assert!(lines[12].starts_with("ascii | HP: 20/20"));
    }

    #[test]
    fn renderer_keeps_latest_frame() {
        let session = Session::new_game(GameConfig::default(), 7, "ascii");
        let mut renderer = AsciiRenderer::new();
        renderer.present(&session.view());
        renderer.announce("!!! BOSS AHEAD !!!", Duration::from_millis(1));
        renderer.present_leaderboard(&Leaderboard::new(10));

        assert_eq!(renderer.frames, 1);
        assert!(renderer.last_frame.contains('@'));
        assert_eq!(renderer.banners, ["!!! BOSS AHEAD !!!"]);
        assert!(renderer.leaderboards[0].contains("No runs yet."));
    }
}
