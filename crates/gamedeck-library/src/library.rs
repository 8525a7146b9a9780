//! Persisted library store
//!
//! `Library` owns the in-memory `LibraryState` and writes a full snapshot to
//! its database after every successful mutation. A mutation is applied to a
//! copy of the state first; the copy replaces the live state only once it
//! has been saved, so a failed write leaves the library as it was.

use crate::database::StateDatabase;
use crate::game::Game;
use crate::reconcile::ReconcilePolicy;
use crate::scanner::{ScanReport, scan_folders};
use crate::state::LibraryState;
use crate::{Collection, LibraryError};
use gamedeck_config::{
    EmulatorDef, EmulatorMap, EmulatorOsConfig, GameFolder, OsKey, Platform, Settings,
};
use std::path::Path;

/// Settings and games backed by a `StateDatabase`
pub struct Library {
    state: LibraryState,
    db: StateDatabase,
    policy: ReconcilePolicy,
}

impl Library {
    /// Open the library stored at `path`, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let db = StateDatabase::open(path.as_ref())?;
        let state = db.load()?;

        tracing::info!(
            "Opened library at {} ({} games, {} folders)",
            path.as_ref().display(),
            state.games.len(),
            state.settings.game_folders.len()
        );

        Ok(Self {
            state,
            db,
            policy: ReconcilePolicy::default(),
        })
    }

    /// Empty library that lives only in memory
    pub fn in_memory() -> Result<Self, LibraryError> {
        Ok(Self {
            state: LibraryState::new(),
            db: StateDatabase::in_memory()?,
            policy: ReconcilePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn games(&self) -> &[Game] {
        &self.state.games
    }

    pub fn game(&self, id: &str) -> Option<&Game> {
        self.state.game(id)
    }

    pub fn filter_games(&self, collection: Collection, query: &str) -> Vec<&Game> {
        self.state.filter_games(collection, query)
    }

    /// Apply `change` to a copy of the state, save it, then swap it in
    fn update<T>(
        &mut self,
        change: impl FnOnce(&mut LibraryState) -> Result<T, LibraryError>,
    ) -> Result<T, LibraryError> {
        let mut next = self.state.clone();
        let value = change(&mut next)?;
        self.db.save(&next)?;
        self.state = next;
        Ok(value)
    }

    pub fn add_steam_app(&mut self, app_id: &str, title: &str) -> Result<String, LibraryError> {
        let id = self.update(|state| Ok(state.add_steam_app(app_id, title)))?;
        tracing::info!("Added Steam app {} ({})", title, app_id);
        Ok(id)
    }

    pub fn add_rom_game(
        &mut self,
        title: &str,
        platform: Platform,
        rom_path: &str,
        emulator_id: Option<String>,
    ) -> Result<String, LibraryError> {
        let id = self.update(|state| {
            Ok(state.add_rom_game(title, platform, rom_path, emulator_id))
        })?;
        tracing::info!("Added {} game {}", platform, title);
        Ok(id)
    }

    pub fn set_games(&mut self, games: Vec<Game>) -> Result<(), LibraryError> {
        self.update(|state| {
            state.set_games(games);
            Ok(())
        })
    }

    /// Flip a game's favorite flag and return the new value
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool, LibraryError> {
        self.update(|state| {
            state
                .toggle_favorite(id)
                .ok_or_else(|| LibraryError::GameNotFound(id.to_string()))
        })
    }

    pub fn set_emulators(&mut self, emulators: EmulatorMap) -> Result<(), LibraryError> {
        self.update(|state| {
            state.set_emulators(emulators);
            Ok(())
        })
    }

    /// Install the catalog when no emulators are configured. Returns whether
    /// anything was written.
    pub fn seed_emulators(&mut self, emulators: EmulatorMap) -> Result<bool, LibraryError> {
        let count = emulators.len();
        if !self.state.settings.emulators.is_empty() {
            return Ok(false);
        }
        self.update(|state| Ok(state.seed_emulators(emulators)))?;
        tracing::info!("Seeded {} emulators from catalog", count);
        Ok(true)
    }

    pub fn upsert_emulator(
        &mut self,
        id: Option<&str>,
        name: &str,
        platform: Platform,
        os: OsKey,
        config: EmulatorOsConfig,
    ) -> Result<String, LibraryError> {
        self.update(|state| Ok(state.upsert_emulator(id, name, platform, os, config)))
    }

    pub fn save_emulator(&mut self, id: &str, def: EmulatorDef) -> Result<(), LibraryError> {
        self.update(|state| {
            state.save_emulator(id, def);
            Ok(())
        })
    }

    /// Validate and store a new folder, returning its id
    pub fn add_game_folder(
        &mut self,
        name: &str,
        platform: Platform,
        path: &str,
        emulator_id: Option<String>,
    ) -> Result<String, LibraryError> {
        let id = self.update(|state| {
            Ok(state.add_game_folder(name, platform, path, emulator_id)?)
        })?;
        tracing::info!("Added {} folder {} at {}", platform, name, path);
        Ok(id)
    }

    /// Remove a folder definition. Its games stay until pruned.
    pub fn remove_game_folder(&mut self, id: &str) -> Result<GameFolder, LibraryError> {
        self.update(|state| {
            state
                .remove_game_folder(id)
                .ok_or_else(|| LibraryError::FolderNotFound(id.to_string()))
        })
    }

    /// Drop games under `folder_path` and return how many went
    pub fn prune_games_by_folder(&mut self, folder_path: &str) -> Result<usize, LibraryError> {
        if self.state.games_under_folder(folder_path).is_empty() {
            return Ok(0);
        }
        let removed = self.update(|state| Ok(state.prune_games_by_folder(folder_path)))?;
        tracing::info!("Pruned {} games under {}", removed, folder_path);
        Ok(removed)
    }

    /// Scan every configured folder and merge the result into the game list.
    ///
    /// Folders that scan cleanly have their games rebuilt. A folder whose
    /// root could not be walked keeps the games already listed under it.
    pub async fn rescan(&mut self) -> Result<ScanReport, LibraryError> {
        let folders = self.state.settings.game_folders.clone();
        let report = scan_folders(&folders).await;

        let fresh = self.fresh_games(&report);
        let policy = self.policy;
        self.update(|state| {
            state.apply_scan(fresh, policy);
            Ok(())
        })?;

        for error in report.errors() {
            tracing::warn!("{}", error);
        }

        Ok(report)
    }

    /// Scanned games per folder, in folder order, with failed folders
    /// standing in their current entries
    fn fresh_games(&self, report: &ScanReport) -> Vec<Game> {
        let mut scanned = report.games.iter();
        let mut fresh = Vec::with_capacity(report.games.len());

        for folder in &report.folders {
            if folder.error.is_some() {
                let kept = self.state.games_under_folder(&folder.path.to_string_lossy());
                tracing::info!("Keeping {} games from {}", kept.len(), folder.folder_name);
                fresh.extend(kept);
            } else {
                fresh.extend(scanned.by_ref().take(folder.games_found).cloned());
            }
        }

        fresh
    }

    pub fn export_json(&self) -> Result<String, LibraryError> {
        Ok(self.state.to_json()?)
    }

    /// Replace the whole state with a JSON document
    pub fn import_json(&mut self, json: &str) -> Result<(), LibraryError> {
        let next = LibraryState::from_json(json)?;
        self.update(|state| {
            *state = next;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn rom_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.iso"), b"iso").unwrap();
        fs::write(dir.path().join("sub").join("b.chd"), b"chd").unwrap();
        fs::write(dir.path().join("readme.txt"), b"txt").unwrap();
        dir
    }

    fn library_with_folder(library: &mut Library, path: &Path) -> String {
        let emu = library
            .upsert_emulator(
                Some("pcsx2"),
                "PCSX2",
                Platform::Ps2,
                OsKey::Linux,
                EmulatorOsConfig::new("pcsx2-qt", vec!["${ROM}".into()]),
            )
            .unwrap();
        library
            .add_game_folder("PS2", Platform::Ps2, &path.to_string_lossy(), Some(emu))
            .unwrap()
    }

    #[test]
    fn test_toggle_unknown_game() {
        let mut library = Library::in_memory().unwrap();
        let err = library.toggle_favorite("missing").unwrap_err();
        assert!(matches!(err, LibraryError::GameNotFound(_)));
    }

    #[test]
    fn test_invalid_folder_is_not_stored() {
        let mut library = Library::in_memory().unwrap();
        let err = library
            .add_game_folder("PS2", Platform::Ps2, "/roms", None)
            .unwrap_err();

        assert!(matches!(err, LibraryError::Validation(_)));
        assert!(library.settings().game_folders.is_empty());
    }

    #[test]
    fn test_mutations_are_persisted() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("library.db");

        let id = {
            let mut library = Library::open(&db_path).unwrap();
            let id = library.add_steam_app("570", "Dota 2").unwrap();
            library.toggle_favorite(&id).unwrap();
            id
        };

        let library = Library::open(&db_path).unwrap();
        assert_eq!(library.games().len(), 1);
        assert!(library.game(&id).unwrap().favorite);
    }

    #[test]
    fn test_failed_save_keeps_previous_state() {
        let mut library = Library::in_memory().unwrap();
        library.add_steam_app("570", "Dota 2").unwrap();
        library
            .db
            .connection()
            .execute_batch("DROP TABLE game_folders")
            .unwrap();

        let result = library.add_game_folder("Steam", Platform::Steam, "/steam", None);

        assert!(matches!(result, Err(LibraryError::Sqlite(_))));
        assert!(library.settings().game_folders.is_empty());
        assert_eq!(library.games().len(), 1);
    }

    #[test]
    fn test_seed_only_when_empty() {
        let mut library = Library::in_memory().unwrap();
        let mut map = EmulatorMap::new();
        map.insert("pcsx2".into(), EmulatorDef::new("PCSX2", Platform::Ps2));

        assert!(library.seed_emulators(map.clone()).unwrap());
        assert!(!library.seed_emulators(EmulatorMap::new()).unwrap());
        assert_eq!(library.settings().emulators, map);
    }

    #[tokio::test]
    async fn test_rescan_drops_favorites() {
        let roms = rom_tree();
        let mut library = Library::in_memory().unwrap();
        library_with_folder(&mut library, roms.path());
        library.add_steam_app("570", "Dota 2").unwrap();

        let report = library.rescan().await.unwrap();
        assert_eq!(report.games_found(), 2);
        assert_eq!(library.games().len(), 3);

        let scanned = library.games()[1].id.clone();
        library.toggle_favorite(&scanned).unwrap();

        library.rescan().await.unwrap();

        assert_eq!(library.games().len(), 3);
        assert!(library.games().iter().all(|g| !g.favorite));
        assert_eq!(library.games()[0].title, "Dota 2");
    }

    #[tokio::test]
    async fn test_rescan_carry_forward_keeps_favorites() {
        let roms = rom_tree();
        let mut library = Library::in_memory()
            .unwrap()
            .with_policy(ReconcilePolicy::CarryForward);
        library_with_folder(&mut library, roms.path());

        library.rescan().await.unwrap();
        let scanned = library.games()[0].id.clone();
        library.toggle_favorite(&scanned).unwrap();

        library.rescan().await.unwrap();

        let game = library.game(&scanned).unwrap();
        assert!(game.favorite);
        assert_eq!(library.games().len(), 2);
    }

    #[tokio::test]
    async fn test_rescan_reports_missing_folder() {
        let roms = rom_tree();
        let mut library = Library::in_memory().unwrap();
        library_with_folder(&mut library, &roms.path().join("gone"));

        let report = library.rescan().await.unwrap();

        assert_eq!(report.errors().len(), 1);
        assert!(library.games().is_empty());
    }

    #[test]
    fn test_remove_folder_then_prune() {
        let mut library = Library::in_memory().unwrap();
        let roms = rom_tree();
        let folder_id = library_with_folder(&mut library, roms.path());
        let path = roms.path().join("a.iso");
        library
            .add_rom_game("A", Platform::Ps2, &path.to_string_lossy(), None)
            .unwrap();

        let folder = library.remove_game_folder(&folder_id).unwrap();
        assert_eq!(library.games().len(), 1);

        let removed = library.prune_games_by_folder(&folder.path).unwrap();
        assert_eq!(removed, 1);
        assert!(library.games().is_empty());

        let err = library.remove_game_folder(&folder_id).unwrap_err();
        assert!(matches!(err, LibraryError::FolderNotFound(_)));
    }

    #[test]
    fn test_json_export_import() {
        let mut library = Library::in_memory().unwrap();
        library.add_steam_app("570", "Dota 2").unwrap();
        let json = library.export_json().unwrap();
        assert!(json.contains("steamAppId"));

        let mut other = Library::in_memory().unwrap();
        other.import_json(&json).unwrap();
        assert_eq!(other.state(), library.state());
    }
}
