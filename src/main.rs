mod app;
mod capture;
mod catalog;
mod config;
mod logging;
mod store;
mod ui;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;

use app::App;
use capture::CommandCapture;
use catalog::{Catalog, DirectDisplay, DisplayAdapter, InlineDisplay};
use config::{Config, DisplayMode};
use store::{DataDirStore, FileKvStore};

fn parse_args() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("snapshelf {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config_path
}

fn print_help() {
    println!(
        r#"snapshelf - TUI photo album with camera capture

USAGE:
    snapshelf [OPTIONS]

OPTIONS:
    --config, -c PATH   Path to config file
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    SNAPSHELF_LOG       Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/snapshelf/config.toml"#
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = parse_args();

    // Initialize logging (uses journald on Linux, file fallback otherwise)
    let _ = logging::init(Some(Config::config_dir().join("logs")));

    // Load configuration
    let config = match config_path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };

    // Wire the catalog's capability handles from config
    let kv = FileKvStore::new(config.album.prefs_dir.clone());
    let files = DataDirStore::new(config.album.data_dir.clone());
    let camera = CommandCapture::new(config.capture.clone());
    let display: Box<dyn DisplayAdapter> = match config.album.display {
        DisplayMode::Direct => Box::new(DirectDisplay),
        DisplayMode::Inline => Box::new(InlineDisplay),
    };
    let catalog = Catalog::new(
        config.album.catalog_key.clone(),
        Box::new(kv),
        Box::new(files),
        Box::new(camera),
        display,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let result = match App::new(config, catalog) {
        Ok(mut app) => app.run(&mut terminal).await,
        Err(e) => Err(e),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
