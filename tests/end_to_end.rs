use std::{fs, path::Path};

use bracket_geometry::prelude::Point;
use roguebyte::{
    config::GameConfig,
    data::ProgressionRules,
    game::{Command, GameLoop, RunOutcome, Step},
    map::Viewport,
    persist::GameSnapshot,
    render::ascii::AsciiRenderer,
    scripted_input::ScriptedInput,
    session::{
        Session,
        entities::{Enemy, Player},
        events::CombatOutcome,
    },
};

fn config_in(dir: &Path) -> GameConfig {
    GameConfig {
        save_path: dir.join("savegame.dat"),
        leaderboard_path: dir.join("leaderboard.txt"),
        ..GameConfig::default()
    }
}

fn enemy(x: i32, y: i32, hp: i32, strength: i32) -> Enemy {
    Enemy {
        x,
        y,
        hp,
        strength,
        xp_value: 5,
        is_boss: false,
    }
}

/// A game on an obstacle-free map with hand-placed enemies.
fn staged_game(config: GameConfig, player: Player, enemies: Vec<Enemy>) -> GameLoop {
    let snapshot = GameSnapshot {
        player,
        enemies,
        width: config.map_width,
        height: config.map_height,
        cells: Viewport::open(config.map_width, config.map_height).cells,
        world_offset: 0,
        move_count: 0,
        last_boss_distance: None,
        last_wave_boss_distance: None,
    };
    let (saves, board) = GameLoop::stores_for(&config);
    let session = Session::from_snapshot(config, 3, snapshot).unwrap();
    GameLoop::new(session, saves, board)
}

fn player_at(name: &str, x: i32, y: i32) -> Player {
    Player::new(name, Point::new(x, y), &ProgressionRules::default())
}

#[test]
fn score_never_decreases_during_a_scripted_climb() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = GameLoop::start_new(config_in(dir.path()), 42, "climber");
    let mut last_score = 0;
    let mut max_offset = 0;

    for key in "wwwwawwdwwswwwwdwwwwawwwwwwsswwwwwwwwwwdwwww".chars() {
        let command = Command::from_char(key).unwrap();
        let step = game.handle(command);
        let score = game.session().player().score;
        assert!(score >= last_score, "score dropped from {last_score} to {score}");
        last_score = score;
        max_offset = max_offset.max(game.session().world_offset());
        if matches!(step, Step::GameOver { .. }) {
            break;
        }
    }
    assert!(game.session().enemies().len() <= game.session().config().enemy_capacity());
    assert!(max_offset <= last_score);
}

#[test]
fn attacking_an_adjacent_enemy_removes_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = staged_game(
        config_in(dir.path()),
        player_at("fighter", 10, 6),
        vec![enemy(10, 5, 5, 1), enemy(35, 10, 10, 4)],
    );

    let Step::Continue(report) = game.handle(Command::Up) else {
        panic!("expected the game to continue");
    };

    assert!(matches!(report.combat, CombatOutcome::EnemySlain { xp: 5, .. }));
    assert_eq!(game.session().enemies().len(), 1);
    assert_eq!(game.session().player().point(), Point::new(10, 5));
    assert_eq!(game.session().player().xp, 5);
    assert_eq!(game.session().player().score, 1);
}

#[test]
fn game_over_records_the_run_and_clears_the_save() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut doomed = player_at("doomed", 10, 6);
    doomed.hp = 1;
    let mut game = staged_game(config.clone(), doomed, vec![enemy(10, 5, 100, 50)]);

    assert_eq!(game.handle(Command::Save), Step::Saved);
    assert!(config.save_path.exists());

    let step = game.handle(Command::Up);
    assert_eq!(
        step,
        Step::GameOver {
            score: 1,
            level: 1,
            rank: Some(1)
        }
    );
    assert!(!config.save_path.exists());
    let board = fs::read_to_string(&config.leaderboard_path).unwrap();
    assert_eq!(board, "doomed 1 1\n");
    assert!(GameLoop::resume(config, 9).is_none());
}

#[test]
fn saved_game_resumes_where_it_stopped() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut game = staged_game(
        config.clone(),
        player_at("keeper", 20, 6),
        vec![enemy(3, 2, 10, 4), enemy(35, 10, 10, 4)],
    );
    for command in [Command::Left, Command::Left, Command::Down] {
        assert!(matches!(game.handle(command), Step::Continue(_)));
    }
    let before = game.session().snapshot();
    assert_eq!(game.handle(Command::Save), Step::Saved);

    let resumed = GameLoop::resume(config, 99).unwrap();
    let after = resumed.session().snapshot();
    assert_eq!(after.player, before.player);
    assert_eq!(after.enemies, before.enemies);
    assert_eq!(after.cells, before.cells);
    assert_eq!(after.move_count, before.move_count);
}

#[test]
fn scripted_run_stops_at_save_and_keeps_the_frame() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut game = staged_game(config.clone(), player_at("script", 20, 6), Vec::new());
    let mut input = ScriptedInput::from_script("# wander a bit\nadad\nl\np\nwwww\n");
    let mut renderer = AsciiRenderer::new();

    let outcome = game.run(&mut input, &mut renderer);

    assert_eq!(outcome, RunOutcome::Saved);
    assert_eq!(input.remaining(), 4);
    assert!(config.save_path.exists());
    assert_eq!(renderer.leaderboards.len(), 1);
    assert!(renderer.last_frame.contains("script | HP:"));
    assert!(renderer.frames >= 2);
}

#[test]
fn new_game_discards_an_existing_save() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut first = GameLoop::start_new(config.clone(), 5, "first");
    assert_eq!(first.handle(Command::Save), Step::Saved);
    assert!(config.save_path.exists());

    let _second = GameLoop::start_new(config.clone(), 6, "second");
    assert!(!config.save_path.exists());
}
