pub mod ui;

use crate::ui::{
    layout::FrameLayout,
    screen::current_screen,
    stats_view::StatsView,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use type_defender::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    corpus::{length_slot, LengthSelection, WordCorpus, LENGTH_SLOTS},
    runtime::{
        is_interrupt, key_input, CrosstermEventSource, FixedTicker, GameEvent, GameEventSource,
        Runner, Ticker,
    },
    stats::{CsvStatsTable, HighScoreFile, SessionStore},
    tracker::SessionSummary,
    Game, Hotspot, TickInput, TickOutcome,
};

/// terminal typing arcade: type the words before they cross the screen
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Words drift in from the right. Type one and press Enter or Space to destroy it; every word that escapes off the left edge costs a life. Clear a wave to face a bigger one."
)]
pub struct Cli {
    /// lives at the start of each game
    #[clap(short = 'l', long)]
    lives: Option<i32>,

    /// milliseconds per frame
    #[clap(short = 't', long)]
    tick_rate_ms: Option<u64>,

    /// word list to draw from, one word per line
    #[clap(short = 'w', long)]
    word_list: Option<PathBuf>,

    /// chance (0 to 1) that a word arrives with one letter uppercased
    #[clap(long)]
    typo_probability: Option<f64>,

    /// word lengths to start with, comma separated (8 means 8 and longer)
    #[clap(long, value_delimiter = ',')]
    lengths: Option<Vec<usize>>,

    /// where finished games are recorded
    #[clap(long)]
    stats_file: Option<PathBuf>,

    /// where the best score is kept
    #[clap(long)]
    high_score_file: Option<PathBuf>,

    /// directory for the log file
    #[clap(long)]
    log_dir: Option<PathBuf>,

    /// seed for reproducible waves
    #[clap(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Layer command-line flags over the stored configuration
    fn apply(&self, config: &mut Config) {
        if let Some(lives) = self.lives {
            config.lives = lives;
        }
        if let Some(ms) = self.tick_rate_ms {
            config.tick_rate_ms = ms.max(1);
        }
        if let Some(path) = &self.word_list {
            config.word_list = Some(path.clone());
        }
        if let Some(p) = self.typo_probability {
            config.typo_probability = p.clamp(0.0, 1.0);
        }
        if let Some(lengths) = &self.lengths {
            let mut slots = [false; LENGTH_SLOTS];
            for slot in lengths.iter().filter_map(|len| length_slot(*len)) {
                slots[slot] = true;
            }
            config.length_selection = LengthSelection::new(slots);
        }
    }

    fn stats_path(&self) -> PathBuf {
        self.stats_file
            .clone()
            .or_else(AppDirs::stats_path)
            .unwrap_or_else(|| PathBuf::from("statistics.csv"))
    }

    fn high_score_path(&self) -> PathBuf {
        self.high_score_file
            .clone()
            .or_else(AppDirs::high_score_path)
            .unwrap_or_else(|| PathBuf::from("high_score.txt"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Playing,
    Stats,
}

pub struct App {
    pub game: Game<StdRng, CsvStatsTable>,
    pub state: AppState,
    pub stats_view: StatsView,
    pub last_session: Option<SessionSummary>,
}

impl App {
    pub fn new(game: Game<StdRng, CsvStatsTable>) -> Self {
        Self {
            game,
            state: AppState::Playing,
            stats_view: StatsView::default(),
            last_session: None,
        }
    }

    /// Fold a tick's outcome into the screen state. Returns false once the
    /// player has quit.
    pub fn apply(&mut self, outcome: TickOutcome) -> bool {
        if let Some(summary) = outcome.session_ended {
            self.last_session = Some(summary);
        }
        if outcome.open_stats {
            self.stats_view = StatsView::open(self.game.store().load_all());
            self.state = AppState::Stats;
        }
        !outcome.quit
    }

    /// Queue a key for the next tick. While paused the menu shortcuts become
    /// hotspot activations.
    pub fn queue_key(&self, key: &KeyEvent, pending: &mut TickInput) {
        if self.game.state().paused {
            if let Some(hotspot) = pause_shortcut(key) {
                pending.hotspots.push(hotspot);
                return;
            }
        }
        pending.keys.push(key_input(key));
    }
}

fn pause_shortcut(key: &KeyEvent) -> Option<Hotspot> {
    match key.code {
        KeyCode::Char('r') => Some(Hotspot::Resume),
        KeyCode::Char('q') => Some(Hotspot::Quit),
        KeyCode::Char('s') => Some(Hotspot::Stats),
        KeyCode::Char(c @ '2'..='8') => c
            .to_digit(10)
            .map(|d| Hotspot::LengthToggle(d as usize - 2)),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = init_logging(cli.log_dir.clone().or_else(AppDirs::log_dir));

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply(&mut config);

    let corpus = match &config.word_list {
        Some(path) => WordCorpus::from_file(path)?,
        None => WordCorpus::embedded()?,
    }
    .with_typo_probability(config.typo_probability);

    let high_score_file = HighScoreFile::with_path(cli.high_score_path());
    let best = high_score_file.load().unwrap_or_else(|e| {
        warn!(error = %e, "starting with no high score");
        0
    });

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let store = CsvStatsTable::with_path(cli.stats_path());
    let game = Game::new(config.session_config(), corpus, store, rng)?
        .with_high_score(best, Some(high_score_file));
    let mut app = App::new(game);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(config.tick_rate_ms.max(1))),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    // Only the length selection is remembered; flags stay one-off.
    let mut saved = config_store.load();
    saved.length_selection = app.game.state().selection;
    if let Err(e) = config_store.save(&saved) {
        warn!(path = %config_store.path().display(), error = %e, "could not save config");
    }

    result
}

/// Log to a file only; the terminal belongs to the game.
fn init_logging(dir: Option<PathBuf>) -> Option<WorkerGuard> {
    let dir = dir?;
    std::fs::create_dir_all(&dir).ok()?;

    let file_appender = tracing_appender::rolling::never(&dir, "type-defender.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::INFO.into()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false),
        )
        .init();

    info!(dir = %dir.display(), "logging initialized");
    Some(guard)
}

fn start_tui<B: Backend, E: GameEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    let mut pending = TickInput::new();
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            GameEvent::Tick => {
                let input = std::mem::take(&mut pending);
                let outcome = match app.game.tick(&input) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        app.game.persist_high_score();
                        return Err(e.into());
                    }
                };
                if !app.apply(outcome) {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
            GameEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            GameEvent::Key(key) => {
                // ctrl+c to quit
                if is_interrupt(&key) {
                    app.game.persist_high_score();
                    break;
                }
                match app.state {
                    AppState::Playing => app.queue_key(&key, &mut pending),
                    AppState::Stats => {
                        if current_screen(&app.state).on_key(key, app) {
                            terminal.draw(|f| ui(app, f))?;
                        }
                    }
                }
            }
            GameEvent::Click(column, row) => {
                if app.state == AppState::Playing {
                    let size = terminal.size()?;
                    let layout = FrameLayout::new(Rect::new(0, 0, size.width, size.height));
                    if let Some(hotspot) =
                        layout.hit_test(app.game.state().paused, column, row)
                    {
                        pending.hotspots.push(hotspot);
                    }
                }
            }
        }
    }

    info!(score = app.game.state().score, best = app.game.high_score(), "exiting");
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    current_screen(&app.state).render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;
    use tempfile::{tempdir, TempDir};
    use type_defender::{
        runtime::TestEventSource,
        session::SessionConfig,
        tracker::Tracker,
    };

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let corpus = WordCorpus::new(["cat", "dog", "owl"])
            .unwrap()
            .with_typo_probability(0.0);
        let game = Game::new(
            SessionConfig::default(),
            corpus,
            CsvStatsTable::with_path(dir.path().join("statistics.csv")),
            StdRng::seed_from_u64(11),
        )
        .unwrap();
        (App::new(game), dir)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["type-defender"]);
        assert_eq!(cli.lives, None);
        assert_eq!(cli.tick_rate_ms, None);
        assert_eq!(cli.word_list, None);
        assert_eq!(cli.lengths, None);
        assert_eq!(cli.seed, None);

        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "type-defender",
            "-l",
            "2",
            "--tick-rate-ms",
            "40",
            "--typo-probability",
            "1.5",
            "--lengths",
            "3,5,12,1",
            "-w",
            "/tmp/words.txt",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.lives, 2);
        assert_eq!(config.tick_rate_ms, 40);
        assert_eq!(config.typo_probability, 1.0);
        assert_eq!(config.word_list, Some(PathBuf::from("/tmp/words.txt")));
        assert_eq!(
            config.length_selection,
            LengthSelection::new([false, true, false, true, false, false, true])
        );
    }

    #[test]
    fn test_cli_paths_prefer_flags() {
        let cli = Cli::parse_from([
            "type-defender",
            "--stats-file",
            "/tmp/s.csv",
            "--high-score-file",
            "/tmp/h.txt",
        ]);
        assert_eq!(cli.stats_path(), PathBuf::from("/tmp/s.csv"));
        assert_eq!(cli.high_score_path(), PathBuf::from("/tmp/h.txt"));
    }

    #[test]
    fn test_pause_shortcuts() {
        assert_eq!(pause_shortcut(&key(KeyCode::Char('r'))), Some(Hotspot::Resume));
        assert_eq!(pause_shortcut(&key(KeyCode::Char('q'))), Some(Hotspot::Quit));
        assert_eq!(pause_shortcut(&key(KeyCode::Char('s'))), Some(Hotspot::Stats));
        assert_eq!(
            pause_shortcut(&key(KeyCode::Char('2'))),
            Some(Hotspot::LengthToggle(0))
        );
        assert_eq!(
            pause_shortcut(&key(KeyCode::Char('8'))),
            Some(Hotspot::LengthToggle(6))
        );
        assert_eq!(pause_shortcut(&key(KeyCode::Char('9'))), None);
        assert_eq!(pause_shortcut(&key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_shortcuts_only_while_paused() {
        let (mut app, _dir) = test_app();
        let mut pending = TickInput::new();
        app.queue_key(&key(KeyCode::Char('r')), &mut pending);
        assert_eq!(pending.hotspots, vec![Hotspot::Resume]);
        assert!(pending.keys.is_empty());

        let outcome = app.game.tick(&pending).unwrap();
        app.apply(outcome);
        assert!(!app.game.state().paused);

        let mut pending = TickInput::new();
        app.queue_key(&key(KeyCode::Char('r')), &mut pending);
        assert!(pending.hotspots.is_empty());
        assert_eq!(pending.keys, vec![type_defender::KeyInput::Char('r')]);
    }

    #[test]
    fn test_stats_hotspot_opens_stats_screen() {
        let (mut app, _dir) = test_app();
        let mut tracker = Tracker::new();
        tracker.word_completed("cat");
        let mut store = CsvStatsTable::with_path(app.game.store().path());
        tracker.persist_session(90, &mut store).unwrap();

        let outcome = app.game.tick(&TickInput::new().hotspot(Hotspot::Stats)).unwrap();
        assert!(app.apply(outcome));
        assert_eq!(app.state, AppState::Stats);
        assert_eq!(app.stats_view.rows().len(), 1);

        assert!(current_screen(&app.state).on_key(key(KeyCode::Right), &mut app));
        assert!(current_screen(&app.state).on_key(key(KeyCode::Char('b')), &mut app));
        assert_eq!(app.state, AppState::Playing);
    }

    #[test]
    fn test_quit_outcome_stops_the_app() {
        let (mut app, _dir) = test_app();
        let outcome = app.game.tick(&TickInput::new().hotspot(Hotspot::Quit)).unwrap();
        assert!(!app.apply(outcome));
    }

    #[test]
    fn test_start_tui_quits_from_pause_menu() {
        let (mut app, _dir) = test_app();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Key(key(KeyCode::Char('q')))).unwrap();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );

        start_tui(&mut terminal, &mut app, &runner).unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(rendered.contains("paused"));
    }

    #[test]
    fn test_start_tui_saves_best_score_on_error() {
        let dir = tempdir().unwrap();
        let best = HighScoreFile::with_path(dir.path().join("high_score.txt"));
        let corpus = WordCorpus::new(["cat"]).unwrap().with_typo_probability(0.0);
        let game = Game::new(
            SessionConfig::default(),
            corpus,
            CsvStatsTable::with_path(dir.path().join("statistics.csv")),
            StdRng::seed_from_u64(5),
        )
        .unwrap()
        .with_high_score(700, Some(best.clone()));
        let mut app = App::new(game);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let (tx, rx) = mpsc::channel();
        // deselect 3-letter words, leaving only the empty 2-letter bucket
        tx.send(GameEvent::Key(key(KeyCode::Char('3')))).unwrap();
        tx.send(GameEvent::Key(key(KeyCode::Char('r')))).unwrap();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );

        assert!(start_tui(&mut terminal, &mut app, &runner).is_err());
        assert_eq!(best.load().unwrap(), 700);
    }

    #[test]
    fn test_click_on_resume_starts_play() {
        let (mut app, _dir) = test_app();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let layout = FrameLayout::new(Rect::new(0, 0, 80, 24));
        let resume = layout.resume_button;
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Click(resume.x, resume.y)).unwrap();
        drop(tx);
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );

        let mut pending = TickInput::new();
        match runner.step() {
            GameEvent::Click(column, row) => {
                let spot = layout.hit_test(app.game.state().paused, column, row);
                pending.hotspots.extend(spot);
            }
            other => panic!("expected a click, got {other:?}"),
        }
        let outcome = app.game.tick(&pending).unwrap();
        app.apply(outcome);
        assert!(!app.game.state().paused);
        assert_eq!(app.game.state().targets.len(), 1);

        terminal.draw(|f| ui(&app, f)).unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(rendered.contains("[ Pause ]"));
    }
}
