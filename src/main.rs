//! Servform - Service Request Form
//!
//! Runs the service request wizard in the terminal: step navigation with
//! validation, a mouse-drawn signature, document attachment and submission
//! checks, using the same application layer as the browser build.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use tracing_subscriber::EnvFilter;

use servform::application::{App, AppMode};
use servform::domain::FormDefinition;
use servform::infrastructure::FormRepository;
use servform::presentation::{render_ui, signature_cells, InputHandler};

#[derive(Debug, Parser)]
#[command(name = "servform", version, about = "Fill in a service request from the terminal")]
struct Args {
    /// JSON form definition to use instead of the built-in form
    #[arg(long, value_name = "PATH")]
    form: Option<PathBuf>,

    /// Write the built-in form definition as JSON and exit
    #[arg(long, value_name = "PATH")]
    dump_form: Option<PathBuf>,

    /// Append logs to this file (filtered by RUST_LOG, default "info")
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// Entry point for the terminal service request form.
///
/// # Errors
///
/// Returns an error if the form definition cannot be loaded, if the log
/// file cannot be opened, or if terminal setup fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }

    if let Some(path) = args.dump_form.as_deref() {
        FormRepository::save_definition(&FormDefinition::default(), path)?;
        println!("Wrote form definition to {}", path.display());
        return Ok(());
    }

    let definition = match args.form.as_deref() {
        Some(path) => FormRepository::load_definition(path)?,
        None => FormDefinition::default(),
    };
    let mut app = App::new(definition)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// The alternate screen owns stdout, so logs only go to a file.
fn init_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Main event loop.
///
/// Keeps the signature surface matched to its on-screen box, renders, and
/// dispatches key and mouse input until the user presses 'q' in normal mode.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        let size = terminal.size()?;
        if let Some(cells) = signature_cells(Rect::new(0, 0, size.width, size.height), app) {
            app.sync_signature_area(cells);
        }

        terminal.draw(|f| render_ui(f, app))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') if matches!(app.mode, AppMode::Normal) => return Ok(()),
                _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
            },
            Event::Mouse(mouse) => InputHandler::handle_mouse_event(app, mouse),
            _ => {}
        }
    }
}
