mod app;
mod config;
mod decompose;
mod dnd;
mod domain;
mod input;
mod logging;
mod notifications;
mod persistence;
mod reminder;
mod store;
mod ui;

use anyhow::Result;
use app::AppState;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use store::TaskStore;
use tracing::info;

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "A terminal task manager with calendar scheduling and reminders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export all tasks to a JSON file
    Export {
        /// Output file path. Defaults to ~/.taskdeck/tasks-YYYY-MM-DD.json
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Import tasks from a JSON file, replacing the current set
    Import {
        /// File to import
        file: String,
    },
    /// Delete all tasks
    Clear,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Export { output }) => {
            let store = TaskStore::open_default()?;
            let path = match output {
                Some(path) => PathBuf::from(path),
                None => persistence::default_export_file()?,
            };
            persistence::export_to_file(&path, store.export_tasks())?;
            println!(
                "Exported {} tasks to {}",
                store.tasks().len(),
                path.display()
            );
            Ok(())
        }
        Some(Commands::Import { file }) => {
            let tasks = persistence::import_from_file(&file)?;
            let count = tasks.len();
            let mut store = TaskStore::open_default()?;
            store.import_tasks(tasks);
            println!("Imported {} tasks from {}", count, file);
            Ok(())
        }
        Some(Commands::Clear) => {
            let mut store = TaskStore::open_default()?;
            let count = store.tasks().len();
            store.clear_all_tasks();
            println!("Deleted {} tasks", count);
            Ok(())
        }
        None => run_tui(),
    }
}

fn run_tui() -> Result<()> {
    persistence::ensure_app_dir()?;
    logging::init()?;
    info!("starting taskdeck");

    let store = TaskStore::open_default()?;
    let config = config::load_default_config()?;
    let mut app = AppState::new(store, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout so ticking keeps running
        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press {
                    let should_quit = input::handle_key(app, key)?;
                    if should_quit {
                        return Ok(());
                    }
                }
            }
        }

        // Reminder scan, toast expiry
        app.tick();

        // Apply any finished subtask decompositions
        app.poll_decompositions();
    }
}
