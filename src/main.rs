use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, anyhow};
use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use roguebyte::{
    config::GameConfig,
    game::{Command, GameLoop, RunOutcome, Step},
    persist::{Leaderboard, SaveSlot},
    render::{
        ascii::AsciiRenderer, draw_banner, draw_hud, draw_leaderboard, draw_log, draw_map,
        draw_menu,
    },
    scripted_input::ScriptedInput,
    session::entities::{DEFAULT_NAME, MAX_NAME_LEN, sanitize_name},
};

const MAP_ORIGIN_X: i32 = 2;
const MAP_ORIGIN_Y: i32 = 3;
const HUD_TOP: i32 = MAP_ORIGIN_Y + 14;
const LOG_PANEL_START: i32 = 26;
const GAME_OVER_HOLD_MS: f32 = 2500.0;

#[derive(Parser, Debug)]
#[command(name = "roguebyte")]
#[command(about = "Climb a scrolling dungeon, fight what crawls in it, climb the leaderboard")]
struct Args {
    /// RNG seed; defaults to the current time
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding the default game settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save slot path
    #[arg(long)]
    save: Option<PathBuf>,

    /// Leaderboard file path
    #[arg(long)]
    leaderboard: Option<PathBuf>,

    /// Play a script of keys headlessly and print the final frame
    #[arg(long)]
    script: Option<PathBuf>,

    /// Player name for scripted runs and the name prompt default
    #[arg(long, default_value = DEFAULT_NAME)]
    name: String,

    /// Where logs go while the terminal UI owns the screen
    #[arg(long, default_value = "roguebyte.log")]
    log_file: PathBuf,
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env("ROGUEBYTE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    if args.script.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        let file = File::create(&args.log_file)
            .with_context(|| format!("cannot open log file {}", args.log_file.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(save) = &args.save {
        config.save_path = save.clone();
    }
    if let Some(board) = &args.leaderboard {
        config.leaderboard_path = board.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run_script(config: GameConfig, seed: u64, name: &str, script: &Path) -> anyhow::Result<()> {
    let mut input = ScriptedInput::from_file(script)
        .with_context(|| format!("cannot read script {}", script.display()))?;
    let mut renderer = AsciiRenderer::new();
    let mut game = GameLoop::start_new(config, seed, name);
    let outcome = game.run(&mut input, &mut renderer);

    print!("{}", renderer.last_frame);
    for board in &renderer.leaderboards {
        print!("{board}");
    }
    match outcome {
        RunOutcome::Saved => println!("Saved after {} moves.", game.session().move_count()),
        RunOutcome::Quit => println!(
            "Stopped after {} moves. Score: {}",
            game.session().move_count(),
            game.session().player().score
        ),
        RunOutcome::GameOver { score, level, rank } => {
            println!("GAME OVER. Score: {score}, level {level}");
            if let Some(rank) = rank {
                println!("Leaderboard rank: {rank}");
            }
        }
    }
    Ok(())
}

enum Screen {
    MainMenu { selected: usize, choices: Vec<(MenuChoice, String)> },
    NameEntry { buffer: String },
    InGame,
    Leaderboard { board: Leaderboard, highlight: Option<String>, resume_game: bool },
    GameOver { score: u32, level: i32, rank: Option<usize>, remaining_ms: f32 },
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum MenuChoice {
    Continue,
    NewGame,
    Leaderboard,
    Exit,
}

struct RogueByteState {
    config: GameConfig,
    seed: u64,
    default_name: String,
    game: Option<GameLoop>,
    screen: Screen,
    banner: Option<(String, f32)>,
}

impl GameState for RogueByteState {
    fn tick(&mut self, ctx: &mut BTerm) {
        ctx.cls();
        match self.screen {
            Screen::MainMenu { .. } => self.tick_menu(ctx),
            Screen::NameEntry { .. } => self.tick_name_entry(ctx),
            Screen::InGame => self.tick_game(ctx),
            Screen::Leaderboard { .. } => self.tick_leaderboard(ctx),
            Screen::GameOver { .. } => self.tick_game_over(ctx),
        }
    }
}

impl RogueByteState {
    fn new(config: GameConfig, seed: u64, default_name: String) -> Self {
        let mut state = Self {
            config,
            seed,
            default_name,
            game: None,
            screen: Screen::InGame,
            banner: None,
        };
        state.screen = state.main_menu();
        state
    }

    fn main_menu(&self) -> Screen {
        Screen::MainMenu {
            selected: 0,
            choices: self.menu_choices(),
        }
    }

    fn menu_choices(&self) -> Vec<(MenuChoice, String)> {
        let mut choices = Vec::new();
        let slot = SaveSlot::new(self.config.save_path.clone(), self.config.enemy_capacity());
        if let Some(summary) = slot.peek() {
            let when = summary
                .saved_at
                .map(|at| at.format(" %Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            choices.push((
                MenuChoice::Continue,
                format!(
                    "Continue ({} LVL {} dist {}{when})",
                    summary.name, summary.level, summary.score
                ),
            ));
        }
        choices.push((MenuChoice::NewGame, "New Game".to_string()));
        choices.push((MenuChoice::Leaderboard, "Leaderboard".to_string()));
        choices.push((MenuChoice::Exit, "Exit".to_string()));
        choices
    }

    fn tick_menu(&mut self, ctx: &mut BTerm) {
        let Screen::MainMenu { selected, choices } = &mut self.screen else {
            return;
        };
        *selected = (*selected).min(choices.len() - 1);

        let mut picked = None;
        if let Some(key) = ctx.key {
            match key {
                VirtualKeyCode::Up | VirtualKeyCode::W => {
                    *selected = (*selected + choices.len() - 1) % choices.len();
                }
                VirtualKeyCode::Down | VirtualKeyCode::S => {
                    *selected = (*selected + 1) % choices.len();
                }
                VirtualKeyCode::Return | VirtualKeyCode::NumpadEnter => {
                    picked = choices.get(*selected).map(|(choice, _)| *choice);
                }
                VirtualKeyCode::Escape | VirtualKeyCode::Q => picked = Some(MenuChoice::Exit),
                _ => {}
            }
        }

        ctx.print_color_centered(8, RGB::named(YELLOW), RGB::named(BLACK), "R O G U E B Y T E");
        let labels: Vec<String> = choices.iter().map(|(_, label)| label.clone()).collect();
        draw_menu(ctx, "Main Menu", &labels, *selected, 12);
        ctx.print_color_centered(
            20,
            RGB::named(GRAY),
            RGB::named(BLACK),
            "W/S to choose, Enter to confirm",
        );

        match picked {
            Some(MenuChoice::Continue) => {
                match GameLoop::resume(self.config.clone(), self.seed) {
                    Some(game) => {
                        self.game = Some(game);
                        self.screen = Screen::InGame;
                    }
                    None => {
                        warn!("save could not be resumed");
                        self.screen = self.main_menu();
                    }
                }
            }
            Some(MenuChoice::NewGame) => {
                self.screen = Screen::NameEntry {
                    buffer: String::new(),
                };
            }
            Some(MenuChoice::Leaderboard) => {
                let (_, store) = GameLoop::stores_for(&self.config);
                self.screen = Screen::Leaderboard {
                    board: store.load(),
                    highlight: None,
                    resume_game: false,
                };
            }
            Some(MenuChoice::Exit) => {
                info!("exiting");
                ctx.quit();
            }
            None => {}
        }
    }

    fn tick_name_entry(&mut self, ctx: &mut BTerm) {
        let Screen::NameEntry { buffer } = &mut self.screen else {
            return;
        };
        let mut confirmed = false;
        let mut cancelled = false;
        if let Some(key) = ctx.key {
            match key {
                VirtualKeyCode::Return | VirtualKeyCode::NumpadEnter => confirmed = true,
                VirtualKeyCode::Escape => cancelled = true,
                VirtualKeyCode::Back => {
                    buffer.pop();
                }
                other => {
                    if let Some(c) = key_char(other, ctx.shift) {
                        if buffer.chars().count() < MAX_NAME_LEN {
                            buffer.push(c);
                        }
                    }
                }
            }
        }

        ctx.print_color_centered(12, RGB::named(LIGHT_BLUE), RGB::named(BLACK), "Enter your name:");
        ctx.print_color_centered(14, RGB::named(WHITE), RGB::named(BLACK), format!("{buffer}_"));
        ctx.print_color_centered(
            16,
            RGB::named(GRAY),
            RGB::named(BLACK),
            format!("Enter to start, empty for {}", self.default_name),
        );

        if cancelled {
            self.screen = self.main_menu();
        } else if confirmed {
            let name = if buffer.trim().is_empty() {
                self.default_name.clone()
            } else {
                sanitize_name(buffer)
            };
            self.seed = self.seed.wrapping_add(1);
            self.game = Some(GameLoop::start_new(self.config.clone(), self.seed, &name));
            self.banner = None;
            self.screen = Screen::InGame;
        }
    }

    fn tick_game(&mut self, ctx: &mut BTerm) {
        let Some(game) = self.game.as_mut() else {
            self.screen = self.main_menu();
            return;
        };

        if let Some((_, remaining)) = self.banner.as_mut() {
            *remaining -= ctx.frame_time_ms;
            if *remaining <= 0.0 {
                self.banner = None;
            }
        } else if let Some(command) = ctx.key.and_then(key_command) {
            match game.handle(command) {
                Step::Continue(report) => {
                    if report.boss_appeared {
                        self.banner = Some((
                            "!!! BOSS AHEAD !!!".to_string(),
                            self.config.banner_millis as f32,
                        ));
                    }
                }
                Step::Ignored | Step::SaveFailed(_) => {}
                Step::Saved | Step::Quit => {
                    self.game = None;
                    self.screen = self.main_menu();
                    return;
                }
                Step::ShowLeaderboard(board) => {
                    self.screen = Screen::Leaderboard {
                        highlight: Some(game.session().player().name.clone()),
                        board,
                        resume_game: true,
                    };
                    return;
                }
                Step::GameOver { score, level, rank } => {
                    self.screen = Screen::GameOver {
                        score,
                        level,
                        rank,
                        remaining_ms: GAME_OVER_HOLD_MS,
                    };
                    return;
                }
            }
        }

        let view = game.session().view();
        ctx.print_color_centered(
            1,
            RGB::named(YELLOW),
            RGB::named(BLACK),
            format!("RogueByte | Distance {}", view.world_offset),
        );
        draw_map(ctx, &view, Point::new(MAP_ORIGIN_X, MAP_ORIGIN_Y));
        draw_hud(ctx, &view, HUD_TOP);
        draw_log(ctx, view.messages, LOG_PANEL_START);
        if let Some((text, _)) = &self.banner {
            draw_banner(ctx, text, MAP_ORIGIN_Y + view.viewport.height / 2);
        }
    }

    fn tick_leaderboard(&mut self, ctx: &mut BTerm) {
        let Screen::Leaderboard {
            board,
            highlight,
            resume_game,
        } = &self.screen
        else {
            return;
        };
        draw_leaderboard(ctx, board, highlight.as_deref(), 4);
        ctx.print_color(
            2,
            8 + board.capacity() as i32,
            RGB::named(GRAY),
            RGB::named(BLACK),
            "Press any key to return",
        );
        if ctx.key.is_some() {
            self.screen = if *resume_game && self.game.is_some() {
                Screen::InGame
            } else {
                self.game = None;
                self.main_menu()
            };
        }
    }

    fn tick_game_over(&mut self, ctx: &mut BTerm) {
        let Screen::GameOver {
            score,
            level,
            rank,
            remaining_ms,
        } = &mut self.screen
        else {
            return;
        };
        ctx.print_color_centered(12, RGB::named(RED), RGB::named(BLACK), "GAME OVER");
        ctx.print_color_centered(
            14,
            RGB::named(WHITE),
            RGB::named(BLACK),
            format!("Final score: {score}  Level: {level}"),
        );
        if let Some(rank) = rank {
            ctx.print_color_centered(
                16,
                RGB::named(LIGHT_GREEN),
                RGB::named(BLACK),
                format!("You placed #{rank} on the leaderboard"),
            );
        }

        *remaining_ms -= ctx.frame_time_ms;
        if *remaining_ms > 0.0 {
            return;
        }
        let highlight = self
            .game
            .take()
            .map(|game| game.session().player().name.clone());
        let (_, store) = GameLoop::stores_for(&self.config);
        self.screen = Screen::Leaderboard {
            board: store.load(),
            highlight,
            resume_game: false,
        };
    }
}

fn key_command(key: VirtualKeyCode) -> Option<Command> {
    match key {
        VirtualKeyCode::Up | VirtualKeyCode::W => Some(Command::Up),
        VirtualKeyCode::Down | VirtualKeyCode::S => Some(Command::Down),
        VirtualKeyCode::Left | VirtualKeyCode::A => Some(Command::Left),
        VirtualKeyCode::Right | VirtualKeyCode::D => Some(Command::Right),
        VirtualKeyCode::P => Some(Command::Save),
        VirtualKeyCode::Q | VirtualKeyCode::Escape => Some(Command::Quit),
        VirtualKeyCode::L => Some(Command::ShowLeaderboard),
        _ => None,
    }
}

fn key_char(key: VirtualKeyCode, shift: bool) -> Option<char> {
    let letter = letter_to_option(key);
    if (0..26).contains(&letter) {
        let c = (b'a' + letter as u8) as char;
        return Some(if shift { c.to_ascii_uppercase() } else { c });
    }
    let c = match key {
        VirtualKeyCode::Key0 => '0',
        VirtualKeyCode::Key1 => '1',
        VirtualKeyCode::Key2 => '2',
        VirtualKeyCode::Key3 => '3',
        VirtualKeyCode::Key4 => '4',
        VirtualKeyCode::Key5 => '5',
        VirtualKeyCode::Key6 => '6',
        VirtualKeyCode::Key7 => '7',
        VirtualKeyCode::Key8 => '8',
        VirtualKeyCode::Key9 => '9',
        VirtualKeyCode::Minus => '-',
        VirtualKeyCode::Space => '_',
        _ => return None,
    };
    Some(c)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;
    let config = load_config(&args)?;
    let seed = args
        .seed
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64);
    info!(seed, save = %config.save_path.display(), "starting");

    if let Some(script) = &args.script {
        return run_script(config, seed, &args.name, script);
    }

    let context = BTermBuilder::simple80x50()
        .with_title("RogueByte")
        .build()
        .map_err(|e| anyhow!("terminal init failed: {e}"))?;
    let game_state = RogueByteState::new(config, seed, sanitize_name(&args.name));
    main_loop(context, game_state).map_err(|e| anyhow!("terminal loop failed: {e}"))
}
