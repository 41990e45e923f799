pub mod app_dirs;
pub mod config;
pub mod results;
pub mod runtime;
pub mod session;
pub mod shape;
pub mod ui;
pub mod util;

use crate::config::{Config, ConfigStore, FileConfigStore};
use crate::results::{FileResultsSink, HistoryLog, ResultsSink};
use crate::runtime::{
    CrosstermEventSource, DeferredTimers, EventSource, FixedTicker, GameEvent, Runner, Ticker,
    TimerKind,
};
use crate::session::Session;
use crate::ui::SummaryView;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    io,
    path::PathBuf,
    time::{Duration, Instant, SystemTime},
};

const TICK_RATE_MS: u64 = 50;

/// terminal reaction-time trainer
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Shapes blip onto the canvas at random positions and intervals; click the blue squares before the round is over. Every completed round writes a results_<epoch>.json document with the full click log."
)]
pub struct Cli {
    /// number of seconds a round lasts
    #[clap(short = 's', long)]
    seconds: Option<u64>,

    /// directory the per-round results files are written to
    #[clap(long)]
    results_dir: Option<PathBuf>,

    /// seed for the spawn randomness (repeatable rounds)
    #[clap(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Layer command-line overrides on top of the persisted config
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(secs) = self.seconds {
            cfg.duration_secs = secs;
        }
        if let Some(dir) = &self.results_dir {
            cfg.results_dir = Some(dir.clone());
        }
        cfg
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Idle,
    Running,
    Summary,
}

#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub state: AppState,
    pub overlay: Option<SummaryView>,
    pub arena_area: Rect,
}

impl App {
    pub fn new(config: &Config, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            session: Session::with_rng(Duration::from_secs(config.duration_secs), rng),
            state: AppState::Idle,
            overlay: None,
            arena_area: Rect::default(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = cli.apply(FileConfigStore::new().load());

    let sink = match &config.results_dir {
        Some(dir) => FileResultsSink::with_dir(dir),
        None => FileResultsSink::new(),
    };
    let history = HistoryLog::new();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, cli.seed);
    let events = CrosstermEventSource::new();
    let ticker = FixedTicker::new(Duration::from_millis(TICK_RATE_MS));
    let runner = Runner::new(events, ticker);
    let mut timers = DeferredTimers::new();
    let res = run_game(&mut terminal, &mut app, &runner, &mut timers, &sink, &history);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run_game<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    timers: &mut DeferredTimers,
    sink: &dyn ResultsSink,
    history: &HistoryLog,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| {
            let arena = ui::draw(f, &app.session, app.overlay.as_ref(), SystemTime::now());
            app.arena_area = arena;
        })?;

        match runner.step() {
            GameEvent::Tick => {
                for kind in timers.due(Instant::now()) {
                    match kind {
                        TimerKind::Spawn => app.session.spawn_shape(timers),
                        TimerKind::RoundOver => finish_round(app, sink, history),
                    }
                }
            }
            GameEvent::Click { column, row } => {
                if app.state == AppState::Running {
                    if let Some((x, y)) = ui::map_click(app.arena_area, column, row) {
                        app.session.on_click(x, y);
                    }
                }
            }
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    break;
                }
                match app.state {
                    AppState::Idle => match key.code {
                        KeyCode::Char('s') | KeyCode::Enter => {
                            app.session.start(timers);
                            app.state = AppState::Running;
                        }
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        _ => {}
                    },
                    // The round cannot be ended early; quitting mid-round is
                    // the window-close analog and writes nothing
                    AppState::Running => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        _ => {}
                    },
                    // Blocking confirmation: only a keypress dismisses it
                    AppState::Summary => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        _ => {
                            app.overlay = None;
                            app.state = AppState::Idle;
                        }
                    },
                }
            }
        }
    }

    Ok(())
}

/// Fired once per round by the round-over timer. A failed write surfaces on
/// the overlay; the session still lands back in Idle either way.
fn finish_round(app: &mut App, sink: &dyn ResultsSink, history: &HistoryLog) {
    let saved = app.session.end(sink);
    let summary = app.session.summary();
    let notice = match saved {
        Ok(path) => {
            if let Err(err) = history.append(&summary, app.session.duration) {
                Some(format!("history log not updated: {}", err))
            } else {
                Some(format!("results saved to {}", path.display()))
            }
        }
        Err(err) => Some(format!("could not save results: {}", err)),
    };
    app.overlay = Some(SummaryView { summary, notice });
    app.state = AppState::Summary;
}
