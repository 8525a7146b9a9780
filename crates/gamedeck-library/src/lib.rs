//! Game library management for GameDeck
//!
//! Handles folder scanning, title normalization, library reconciliation and
//! the persisted settings/library store.
//!
//! Data flows from the store's folder definitions through the tree collector
//! and the match engine, gets titled by the normalizer, and is merged back
//! into the store's game list by the reconciler.

mod database;
mod game;
mod library;
mod matcher;
mod reconcile;
mod scanner;
mod state;
mod title;
mod tree;

pub use database::StateDatabase;
pub use game::{Game, GameKey};
pub use library::Library;
pub use matcher::{FolderMatches, MatchRule, find_matches, match_listing};
pub use reconcile::{ReconcilePolicy, dedup_by_identity, reconcile};
pub use scanner::{FolderScan, ScanReport, games_from_matches, scan_folder, scan_folders};
pub use state::LibraryState;
pub use title::{PS3_PLACEHOLDER_TITLE, is_package_layout, title_from_path};
pub use tree::{SkippedDir, TreeListing, collect_tree};

use gamedeck_config::{ConfigError, Platform};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Game not found: {0}")]
    GameNotFound(String),

    #[error("Game folder not found: {0}")]
    FolderNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while walking a folder
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while reading `path`
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
            _ => ScanError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

/// A game folder definition that must not be stored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Folder path is empty")]
    EmptyPath,

    #[error("No emulator selected for {0} folder")]
    MissingEmulator(Platform),

    #[error("Emulator not found: {0}")]
    UnknownEmulator(String),

    #[error("Emulator {emulator_id} runs {emulator_platform} games, folder is {folder_platform}")]
    PlatformMismatch {
        emulator_id: String,
        emulator_platform: Platform,
        folder_platform: Platform,
    },
}

/// Library views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collection {
    /// All games
    #[default]
    All,
    /// Favorites
    Favorites,
    /// One platform
    Platform(Platform),
}

impl Collection {
    /// Tabs shown by the launcher, in order
    pub fn tabs() -> Vec<Collection> {
        let mut tabs = vec![Collection::All, Collection::Favorites];
        tabs.extend(Platform::ALL.into_iter().map(Collection::Platform));
        tabs
    }

    pub fn contains(&self, game: &Game) -> bool {
        match self {
            Collection::All => true,
            Collection::Favorites => game.favorite,
            Collection::Platform(platform) => game.platform == *platform,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Collection::All => "ALL",
            Collection::Favorites => "FAVORITES",
            Collection::Platform(Platform::Steam) => "STEAM",
            Collection::Platform(Platform::Ps2) => "PS2",
            Collection::Platform(Platform::Ps3) => "PS3",
            Collection::Platform(Platform::Gba) => "GBA",
            Collection::Platform(Platform::Custom) => "CUSTOM",
        }
    }
}
