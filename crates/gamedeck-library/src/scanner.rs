//! Scanning configured game folders

use crate::game::Game;
use crate::matcher::find_matches;
use crate::title::title_from_path;
use crate::tree::SkippedDir;
use crate::ScanError;
use gamedeck_config::GameFolder;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome for one folder
#[derive(Debug)]
pub struct FolderScan {
    pub folder_id: String,
    pub folder_name: String,
    pub path: PathBuf,
    pub games_found: usize,
    /// Set when the folder could not be walked at all
    pub error: Option<ScanError>,
    /// Subdirectories that could not be read
    pub skipped: Vec<SkippedDir>,
}

/// Result of scanning every folder
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Fresh game entries in scan order, not yet deduplicated
    pub games: Vec<Game>,
    pub folders: Vec<FolderScan>,
    pub duration_ms: u64,
}

impl ScanReport {
    pub fn games_found(&self) -> usize {
        self.games.len()
    }

    /// Human readable problems, one per failed folder or skipped directory
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for folder in &self.folders {
            if let Some(err) = &folder.error {
                errors.push(format!("{}: {}", folder.folder_name, err));
            }
            for skipped in &folder.skipped {
                errors.push(format!("{}: {}", folder.folder_name, skipped.error));
            }
        }
        errors
    }
}

/// Build fresh game entries for a folder's matched files
pub fn games_from_matches(folder: &GameFolder, paths: &[PathBuf]) -> Vec<Game> {
    paths
        .iter()
        .map(|path| {
            let rom_path = path.to_string_lossy().to_string();
            let title = title_from_path(&rom_path, folder.platform);
            Game::rom(title, folder.platform, rom_path, folder.emulator_id.clone())
        })
        .collect()
}

/// Scan one folder into fresh game entries
pub async fn scan_folder(folder: &GameFolder) -> (Vec<Game>, FolderScan) {
    let path = PathBuf::from(&folder.path);
    let mut scan = FolderScan {
        folder_id: folder.id.clone(),
        folder_name: folder.name.clone(),
        path: path.clone(),
        games_found: 0,
        error: None,
        skipped: Vec::new(),
    };

    match find_matches(Path::new(&folder.path), folder.platform).await {
        Ok(matches) => {
            let games = games_from_matches(folder, &matches.paths);
            scan.games_found = games.len();
            scan.skipped = matches.skipped;
            (games, scan)
        }
        Err(e) => {
            tracing::warn!("Scan of {} failed: {}", path.display(), e);
            scan.error = Some(e);
            (Vec::new(), scan)
        }
    }
}

/// Scan folders one after another.
///
/// Steam folders are skipped. A folder that fails is reported and the
/// remaining folders are still scanned.
pub async fn scan_folders(folders: &[GameFolder]) -> ScanReport {
    let start = Instant::now();
    let mut report = ScanReport::default();

    for folder in folders {
        if folder.platform.is_store() {
            tracing::debug!("Skipping store folder {}", folder.name);
            continue;
        }

        tracing::info!("Scanning {} ({})", folder.name, folder.path);
        let (games, scan) = scan_folder(folder).await;
        report.games.extend(games);
        report.folders.push(scan);
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        "Scan finished: {} games from {} folders in {}ms",
        report.games_found(),
        report.folders.len(),
        report.duration_ms
    );

    report
}
