//! GameDeck Launcher
//!
//! Terminal frontend for the local game library. Without a subcommand it
//! starts the TUI; subcommands run one library operation and exit.

mod app;
mod commands;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gamedeck_config::{LauncherConfig, OsKey, Platform};
use gamedeck_library::{Library, ReconcilePolicy};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// GameDeck - local game library and launcher
#[derive(Parser)]
#[command(name = "gamedeck")]
#[command(about = "Scan, organize and launch your local games")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, env = "GAMEDECK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Library database, overriding the configured one
    #[arg(long, env = "GAMEDECK_DATABASE", global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List games
    List {
        /// Only games of this platform
        #[arg(long)]
        platform: Option<Platform>,

        /// Only favorites
        #[arg(long)]
        favorites: bool,

        /// Case-insensitive title filter
        #[arg(long, default_value = "")]
        search: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Scan every configured folder
    Scan,

    /// Launch a game by id
    Launch {
        id: String,

        /// Print the launch request instead of running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Toggle a game's favorite flag
    Favorite { id: String },

    /// Add a Steam app
    AddSteam { app_id: String, title: String },

    /// Add a single ROM
    AddRom {
        title: String,

        #[arg(long)]
        platform: Platform,

        #[arg(long)]
        path: String,

        #[arg(long)]
        emulator: Option<String>,
    },

    /// Create or update an emulator's executable for one OS
    AddEmulator {
        /// Existing emulator id; a new one is created when omitted
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        name: String,

        #[arg(long)]
        platform: Platform,

        /// OS slot to set, defaults to the running OS
        #[arg(long)]
        os: Option<OsKey>,

        #[arg(long)]
        exe: String,

        /// Space separated argument template
        #[arg(long, default_value = "")]
        args: String,
    },

    /// Register a folder for scanning
    AddFolder {
        name: String,

        #[arg(long)]
        platform: Platform,

        #[arg(long)]
        path: String,

        #[arg(long)]
        emulator: Option<String>,
    },

    /// Remove a folder definition
    RemoveFolder {
        id: String,

        /// Also remove games found under the folder
        #[arg(long)]
        prune: bool,
    },

    /// Write the settings and games as JSON
    Export {
        /// Output file, stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replace the library with a JSON export
    Import { input: PathBuf },
}

/// Set up logging. The TUI owns the terminal, so it logs to a file.
fn init_logging(config: &LauncherConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if to_file {
        let path = config.log_file();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}

/// Open the library and seed the emulator catalog on first boot
fn open_library(config: &LauncherConfig, database: Option<&Path>) -> Result<Library> {
    let db_path = database
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.database_path());

    let mut library = Library::open(&db_path)
        .with_context(|| format!("Failed to open library at {}", db_path.display()))?
        .with_policy(ReconcilePolicy::from_preserve_edits(
            config.library.preserve_user_edits,
        ));

    if library.settings().emulators.is_empty() {
        match config.load_catalog() {
            Ok(catalog) => {
                library.seed_emulators(catalog.into_emulators())?;
            }
            Err(e) => tracing::warn!("Emulator catalog not loaded: {}", e),
        }
    }

    Ok(library)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = LauncherConfig::load_or_default(cli.config.as_deref())?;
    init_logging(&config, cli.command.is_none())?;

    info!("GameDeck starting...");

    let mut library = open_library(&config, cli.database.as_deref())?;

    match cli.command {
        None => app::run(library).await?,
        Some(Commands::List {
            platform,
            favorites,
            search,
            json,
        }) => commands::list(&library, platform, favorites, &search, json)?,
        Some(Commands::Scan) => commands::scan(&mut library).await?,
        Some(Commands::Launch { id, dry_run }) => commands::launch(&library, &id, dry_run)?,
        Some(Commands::Favorite { id }) => commands::favorite(&mut library, &id)?,
        Some(Commands::AddSteam { app_id, title }) => {
            let id = library.add_steam_app(&app_id, &title)?;
            println!("{}", id);
        }
        Some(Commands::AddRom {
            title,
            platform,
            path,
            emulator,
        }) => {
            let id = library.add_rom_game(&title, platform, &path, emulator)?;
            println!("{}", id);
        }
        Some(Commands::AddEmulator {
            id,
            name,
            platform,
            os,
            exe,
            args,
        }) => commands::add_emulator(
            &mut library,
            id.as_deref(),
            &name,
            platform,
            os.unwrap_or_else(OsKey::current),
            &exe,
            &args,
        )?,
        Some(Commands::AddFolder {
            name,
            platform,
            path,
            emulator,
        }) => {
            let id = library.add_game_folder(&name, platform, &path, emulator)?;
            println!("{}", id);
        }
        Some(Commands::RemoveFolder { id, prune }) => {
            commands::remove_folder(&mut library, &id, prune)?
        }
        Some(Commands::Export { output }) => commands::export(&library, output.as_deref())?,
        Some(Commands::Import { input }) => commands::import(&mut library, &input)?,
    }

    info!("GameDeck exiting");
    Ok(())
}
