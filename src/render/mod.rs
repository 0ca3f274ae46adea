pub mod ascii;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::{
    ai::chebyshev,
    map::Cell,
    persist::Leaderboard,
    session::{SessionView, events::MessageLog},
};

pub const NEARBY_RADIUS: i32 = 3;
pub const NEARBY_SHOWN: usize = 2;

pub fn cell_glyph(cell: Cell) -> char {
    match cell {
        Cell::Floor => '.',
        Cell::Border => '|',
        Cell::Water => '~',
        Cell::ObstacleLeft => '[',
        Cell::ObstacleRight => ']',
        Cell::BossMarker => '_',
    }
}

fn cell_colors(cell: Cell) -> (RGB, RGB) {
    match cell {
        Cell::Floor => (RGB::from_u8(90, 90, 90), RGB::named(BLACK)),
        Cell::Border => (RGB::named(GRAY), RGB::named(BLACK)),
        Cell::Water => (RGB::named(CYAN), RGB::from_u8(0, 30, 60)),
        Cell::ObstacleLeft | Cell::ObstacleRight => (RGB::named(BURLYWOOD), RGB::named(BLACK)),
        Cell::BossMarker => (RGB::named(YELLOW), RGB::from_u8(95, 0, 0)),
    }
}

pub fn draw_map(ctx: &mut BTerm, view: &SessionView<'_>, map_origin: Point) {
    for (y, row) in view.viewport.rows().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let (fg, bg) = cell_colors(*cell);
            ctx.set(
                map_origin.x + x as i32,
                map_origin.y + y as i32,
                fg,
                bg,
                to_cp437(cell_glyph(*cell)),
            );
        }
    }

    for enemy in view.enemies {
        let (glyph, color) = if enemy.is_boss {
            ('B', RGB::named(GOLD))
        } else {
            ('e', RGB::from_u8(255, 90, 90))
        };
        ctx.set(
            map_origin.x + enemy.x,
            map_origin.y + enemy.y,
            color,
            RGB::named(BLACK),
            to_cp437(glyph),
        );
    }

    ctx.set(
        map_origin.x + view.player.x,
        map_origin.y + view.player.y,
        RGB::named(WHITE),
        RGB::named(BLACK),
        to_cp437('@'),
    );
}

/// Player line, stats line, controls and the nearby-enemy panel.
pub fn draw_hud(ctx: &mut BTerm, view: &SessionView<'_>, top: i32) {
    let player = view.player;
    ctx.print_color(
        2,
        top,
        RGB::named(LIGHT_CYAN),
        RGB::named(BLACK),
        format!("Player: {}", player.name),
    );
    let hp_color = if player.hp * 10 <= player.max_hp * 3 {
        RGB::named(ORANGE)
    } else {
        RGB::named(YELLOW)
    };
    ctx.print_color(
        2,
        top + 1,
        hp_color,
        RGB::named(BLACK),
        format!(
            "HP: {}/{} | STR: {} | LVL: {} | XP: {}/{} | Score: {}",
            player.hp,
            player.max_hp,
            player.strength,
            player.level,
            player.xp,
            player.xp_to_level,
            player.score
        ),
    );
    ctx.print_color(
        2,
        top + 2,
        RGB::named(WHITE),
        RGB::named(BLACK),
        "Controls: WASD to move, P to save, L leaderboard, Q to quit",
    );

    ctx.print_color(
        2,
        top + 3,
        RGB::named(RED),
        RGB::named(BLACK),
        "Nearby enemies:",
    );
    let nearby: Vec<_> = view
        .enemies
        .iter()
        .filter(|enemy| chebyshev(enemy.point(), player.point()) <= NEARBY_RADIUS)
        .take(NEARBY_SHOWN)
        .collect();
    if nearby.is_empty() {
        ctx.print_color(18, top + 3, RGB::named(GRAY), RGB::named(BLACK), "None");
    }
    for (row, enemy) in nearby.iter().enumerate() {
        let (label, color) = if enemy.is_boss {
            ("BOSS", RGB::named(GOLD))
        } else {
            ("Enemy", RGB::from_u8(255, 90, 90))
        };
        ctx.print_color(
            4,
            top + 4 + row as i32,
            color,
            RGB::named(BLACK),
            format!("{label:<5} HP:{:<3} STR:{:<2}", enemy.hp, enemy.strength),
        );
    }
}

pub fn draw_log(ctx: &mut BTerm, log: &MessageLog, start_y: i32) {
    let (width, _) = ctx.get_char_size();
    let height = (log.len() as i32).min(5) + 2;
    let top = (start_y - 1).max(0);
    ctx.draw_box(
        0,
        top,
        width as i32 - 1,
        height,
        RGB::named(DARK_GRAY),
        RGB::named(BLACK),
    );
    ctx.print_color(2, top + 1, RGB::named(WHITE), RGB::named(BLACK), "Event Log");
    for (row, entry) in log.entries().take(5).enumerate() {
        ctx.print(2, top + 2 + row as i32, entry);
    }
}

pub fn draw_banner(ctx: &mut BTerm, text: &str, y: i32) {
    ctx.print_color_centered(y, RGB::named(RED), RGB::named(BLACK), text);
}

/// Ranked table; the row for `highlight` is drawn in green.
pub fn draw_leaderboard(ctx: &mut BTerm, board: &Leaderboard, highlight: Option<&str>, top: i32) {
    ctx.print_color(2, top, RGB::named(CYAN), RGB::named(BLACK), "=== LEADERBOARD ===");
    ctx.print_color(
        2,
        top + 1,
        RGB::named(LIGHT_BLUE),
        RGB::named(BLACK),
        "Rank  Name           Level  Distance",
    );
    if board.is_empty() {
        ctx.print_color(2, top + 2, RGB::named(GRAY), RGB::named(BLACK), "No runs yet.");
    }
    for (idx, entry) in board.entries().iter().enumerate() {
        let color = if Some(entry.name.as_str()) == highlight {
            RGB::named(LIGHT_GREEN)
        } else {
            match idx {
                0 => RGB::named(GOLD),
                1 => RGB::named(SILVER),
                2 => RGB::from_u8(205, 127, 50),
                _ => RGB::named(LIGHT_GRAY),
            }
        };
        ctx.print_color(
            2,
            top + 2 + idx as i32,
            color,
            RGB::named(BLACK),
            format!(
                "{:>2}.   {:<12.12}   {:>3}     {:>5}",
                idx + 1,
                entry.name,
                entry.level,
                entry.distance
            ),
        );
    }
}

/// Vertical list of options with a cursor on `selected`.
pub fn draw_menu(ctx: &mut BTerm, title: &str, options: &[String], selected: usize, top: i32) {
    ctx.print_color_centered(top, RGB::named(LIGHT_BLUE), RGB::named(BLACK), title);
    for (idx, option) in options.iter().enumerate() {
        let (fg, text) = if idx == selected {
            (RGB::named(LIGHT_GREEN), format!("> {option}"))
        } else {
            (RGB::named(WHITE), format!("  {option}"))
        };
        ctx.print_color_centered(top + 2 + idx as i32, fg, RGB::named(BLACK), &text);
    }
}
