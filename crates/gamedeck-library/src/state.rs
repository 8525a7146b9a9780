//! In-memory settings and library model
//!
//! Every mutation here is total: it cannot fail once its inputs are
//! validated. `add_game_folder` is the one operation that validates, and it
//! does so before touching the folder list.

use crate::game::{Game, new_id};
use crate::reconcile::{ReconcilePolicy, reconcile};
use crate::{Collection, ValidationError};
use gamedeck_config::{
    EmulatorDef, EmulatorMap, EmulatorOsConfig, GameFolder, OsKey, Platform, Settings,
};
use serde::{Deserialize, Serialize};

/// Settings document plus the game list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryState {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub games: Vec<Game>,
}

impl LibraryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn game(&self, id: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    /// Add a Steam title
    pub fn add_steam_app(&mut self, app_id: &str, title: &str) -> String {
        let game = Game::steam(app_id, title);
        let id = game.id.clone();
        self.games.push(game);
        id
    }

    /// Add a single ROM by hand
    pub fn add_rom_game(
        &mut self,
        title: &str,
        platform: Platform,
        rom_path: &str,
        emulator_id: Option<String>,
    ) -> String {
        let game = Game::rom(title, platform, rom_path, emulator_id);
        let id = game.id.clone();
        self.games.push(game);
        id
    }

    pub fn set_games(&mut self, games: Vec<Game>) {
        self.games = games;
    }

    /// Flip a game's favorite flag, returning the new value
    pub fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let game = self.games.iter_mut().find(|g| g.id == id)?;
        game.favorite = !game.favorite;
        Some(game.favorite)
    }

    pub fn set_emulators(&mut self, emulators: EmulatorMap) {
        self.settings.emulators = emulators;
    }

    /// Install `emulators` only when none are configured yet
    pub fn seed_emulators(&mut self, emulators: EmulatorMap) -> bool {
        if !self.settings.emulators.is_empty() {
            return false;
        }
        self.settings.emulators = emulators;
        true
    }

    /// Set one OS slot of an emulator, creating the emulator if needed.
    ///
    /// `name` and `platform` only apply to a new emulator; an existing one
    /// keeps its own. Other OS slots are never removed. Returns the id,
    /// minted when `id` is `None`.
    pub fn upsert_emulator(
        &mut self,
        id: Option<&str>,
        name: &str,
        platform: Platform,
        os: OsKey,
        config: EmulatorOsConfig,
    ) -> String {
        let id = id.map(str::to_string).unwrap_or_else(new_id);

        self.settings
            .emulators
            .entry(id.clone())
            .or_insert_with(|| EmulatorDef::new(name, platform))
            .set_config(os, config);

        id
    }

    /// Replace an emulator definition wholesale, platform included
    pub fn save_emulator(&mut self, id: &str, def: EmulatorDef) {
        self.settings.emulators.insert(id.to_string(), def);
    }

    /// Check that a folder may be stored.
    ///
    /// Non-store folders need an existing emulator of the same platform.
    pub fn validate_folder(
        &self,
        platform: Platform,
        path: &str,
        emulator_id: Option<&str>,
    ) -> Result<(), ValidationError> {
        if path.trim().is_empty() {
            return Err(ValidationError::EmptyPath);
        }
        if platform.is_store() {
            return Ok(());
        }

        let emulator_id = emulator_id.ok_or(ValidationError::MissingEmulator(platform))?;
        let emulator = self
            .settings
            .emulator(emulator_id)
            .ok_or_else(|| ValidationError::UnknownEmulator(emulator_id.to_string()))?;

        if emulator.platform != platform {
            return Err(ValidationError::PlatformMismatch {
                emulator_id: emulator_id.to_string(),
                emulator_platform: emulator.platform,
                folder_platform: platform,
            });
        }

        Ok(())
    }

    /// Register a folder for scanning
    pub fn add_game_folder(
        &mut self,
        name: &str,
        platform: Platform,
        path: &str,
        emulator_id: Option<String>,
    ) -> Result<String, ValidationError> {
        self.validate_folder(platform, path, emulator_id.as_deref())?;

        let id = new_id();
        self.settings.game_folders.push(GameFolder {
            id: id.clone(),
            name: name.to_string(),
            platform,
            path: path.to_string(),
            emulator_id,
        });
        Ok(id)
    }

    /// Remove a folder definition. Its games stay until pruned.
    pub fn remove_game_folder(&mut self, id: &str) -> Option<GameFolder> {
        let index = self.settings.game_folders.iter().position(|f| f.id == id)?;
        Some(self.settings.game_folders.remove(index))
    }

    /// Drop every game whose ROM path starts with `folder_path`, ignoring
    /// case. Returns how many were removed.
    pub fn prune_games_by_folder(&mut self, folder_path: &str) -> usize {
        let prefix = folder_path.to_lowercase();
        let before = self.games.len();
        self.games.retain(|game| !is_under(game, &prefix));
        before - self.games.len()
    }

    /// Games whose ROM path starts with `folder_path`, ignoring case
    pub fn games_under_folder(&self, folder_path: &str) -> Vec<Game> {
        let prefix = folder_path.to_lowercase();
        self.games
            .iter()
            .filter(|game| is_under(game, &prefix))
            .cloned()
            .collect()
    }

    /// Merge freshly scanned games into the list
    pub fn apply_scan(&mut self, fresh: Vec<Game>, policy: ReconcilePolicy) {
        self.games = reconcile(&self.games, fresh, policy);
    }

    /// Games in `collection` whose title contains `query` (any case), in
    /// library order
    pub fn filter_games(&self, collection: Collection, query: &str) -> Vec<&Game> {
        let query = query.trim().to_lowercase();
        self.games
            .iter()
            .filter(|game| collection.contains(game))
            .filter(|game| query.is_empty() || game.title.to_lowercase().contains(&query))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn is_under(game: &Game, prefix: &str) -> bool {
    game.rom_path()
        .is_some_and(|path| path.to_lowercase().starts_with(prefix))
}
