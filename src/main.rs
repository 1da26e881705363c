mod app;
mod config;
mod entities;
mod events;
mod helpers;
mod models;
mod repository;
mod ui;

use anyhow::{Context, Result};
use app::{App, ModalState};
use clap::Parser;
use config::Config;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, poll},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use events::handle_key_event;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    fs::{self, OpenOptions},
    io::{self, Stdout},
    path::PathBuf,
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};
use ui::{render_loading_screen, render_ui};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Browse the packages of a Python virtual environment
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Virtual environment root (the directory holding bin/pip)
    #[arg(env = "VIRTUAL_ENV")]
    venv: Option<PathBuf>,

    /// Config file to read instead of ~/.config/pip-explorer/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Registry host used for project webpages
    #[arg(long)]
    registry: Option<String>,
}

fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    // stderr shares the tty with the alternate screen, so records always go to the file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(registry) = cli.registry {
        config.registry = registry;
    }
    init_logging(&config)?;

    let venv = cli.venv.or_else(|| config.venv.clone());
    log::info!("starting with virtual environment {:?}", venv);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = load_app(&mut terminal, &config, venv).and_then(|app| match app {
        Some(mut app) => run_app(&mut terminal, &mut app),
        None => Ok(()),
    });

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Shows the loading screen while the first resync runs on another thread.
/// Returns `None` when the user quits before it finishes.
fn load_app(
    terminal: &mut Tui,
    config: &Config,
    venv: Option<PathBuf>,
) -> Result<Option<App>> {
    let start_time = Instant::now();
    let mut loading_dots = 0;
    let mut last_dot_update = Instant::now();

    let (tx, rx) = mpsc::channel();
    let thread_config = config.clone();
    thread::spawn(move || {
        let app = App::new(&thread_config, venv);
        // The receiver is gone if the user already quit
        let _ = tx.send(app);
    });

    loop {
        if last_dot_update.elapsed() >= Duration::from_millis(200) {
            loading_dots = (loading_dots + 1) % 4;
            last_dot_update = Instant::now();
        }

        terminal.draw(|f| render_loading_screen(f, loading_dots, start_time.elapsed()))?;

        match rx.try_recv() {
            Ok(app) => return Ok(Some(app)),
            Err(mpsc::TryRecvError::Disconnected) => {
                return Err(anyhow::anyhow!("loading packages failed unexpectedly"));
            }
            Err(mpsc::TryRecvError::Empty) => {}
        }

        if poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && key.code == KeyCode::Char('q')
        {
            return Ok(None);
        }
    }
}

fn run_app(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| render_ui(f, app))?;

        // The updating modal is on screen now; pip blocks until it is done
        if app.modal_state == ModalState::Updating {
            app.run_pending_update();
            continue;
        }

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(app, key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
