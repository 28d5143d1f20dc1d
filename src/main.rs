use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::prelude::*;
use simplelog::{Config, LevelFilter, WriteLogger};

use qsnek::highscore::DEFAULT_HIGH_SCORE_FILE;
use qsnek::{Difficulty, Engine, GameConfig, JsonFileStore};

mod ui;

use ui::App;

const FRAME_RATE: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "qsnek", about = "Snake in the terminal, with golden apples")]
struct Args {
    /// Speed preselected in the menu
    #[arg(long, value_enum, default_value_t = Difficulty::Normal)]
    difficulty: Difficulty,

    #[arg(long, default_value = DEFAULT_HIGH_SCORE_FILE)]
    high_score_file: PathBuf,

    #[arg(long, default_value = "qsnek.log")]
    log_file: PathBuf,

    /// Seed for food placement, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), io::Error> {
    let args = Args::parse();

    // Set up logging before anything else
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(level, Config::default(), File::create(&args.log_file)?)
        .expect("Failed to initialize logger");

    info!("Starting qsnek");

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let store = JsonFileStore::new(&args.high_score_file);
    let engine = Engine::new(GameConfig::default(), rng, store);
    let mut app = App::new(engine, args.difficulty);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("Exiting qsnek");
    result
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), io::Error> {
    let mut last_frame = Instant::now();

    while !app.should_exit() {
        terminal.draw(|f| app.render(f))?;

        let timeout = FRAME_RATE.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_input(key);
                }
            }
        }

        let now = Instant::now();
        app.update(now - last_frame);
        last_frame = now;
    }

    Ok(())
}
