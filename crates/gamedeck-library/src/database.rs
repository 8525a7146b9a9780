//! Library persistence using SQLite
//!
//! The whole `LibraryState` is written as one snapshot per save. Rows carry
//! a `position` column so folders and games load back in the order they
//! were saved.

use crate::game::Game;
use crate::state::LibraryState;
use crate::LibraryError;
use gamedeck_config::{EmulatorDef, EmulatorOsConfig, GameFolder, OsKey, Platform};
use rusqlite::{Connection, Transaction, params};
use std::path::Path;

/// SQLite backed store for settings and games
pub struct StateDatabase {
    conn: Connection,
}

impl StateDatabase {
    /// Open or create a database
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        let db = Self { conn };
        db.init_schema()?;

        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self, LibraryError> {
        let conn = Connection::open_in_memory()?;

        let db = Self { conn };
        db.init_schema()?;

        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), LibraryError> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS emulators (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                platform TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS emulator_configs (
                emulator_id TEXT NOT NULL,
                os TEXT NOT NULL,
                exe TEXT NOT NULL,
                args TEXT NOT NULL,
                PRIMARY KEY (emulator_id, os),
                FOREIGN KEY (emulator_id) REFERENCES emulators(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS game_folders (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL,
                name TEXT NOT NULL,
                platform TEXT NOT NULL,
                path TEXT NOT NULL,
                emulator_id TEXT
            );

            CREATE TABLE IF NOT EXISTS games (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL,
                title TEXT NOT NULL,
                platform TEXT NOT NULL,
                steam_app_id TEXT,
                rom_path TEXT,
                emulator_id TEXT,
                favorite INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_games_platform ON games(platform);
            CREATE INDEX IF NOT EXISTS idx_games_rom_path ON games(rom_path);
        "#,
        )?;

        Ok(())
    }

    /// Replace the stored snapshot with `state`
    pub fn save(&mut self, state: &LibraryState) -> Result<(), LibraryError> {
        let tx = self.conn.transaction()?;

        tx.execute_batch(
            "DELETE FROM emulator_configs;
             DELETE FROM emulators;
             DELETE FROM game_folders;
             DELETE FROM games;",
        )?;

        Self::insert_emulators(&tx, state)?;
        Self::insert_folders(&tx, &state.settings.game_folders)?;
        Self::insert_games(&tx, &state.games)?;

        tx.commit()?;

        tracing::debug!(
            "Saved {} emulators, {} folders, {} games",
            state.settings.emulators.len(),
            state.settings.game_folders.len(),
            state.games.len()
        );
        Ok(())
    }

    fn insert_emulators(tx: &Transaction, state: &LibraryState) -> Result<(), LibraryError> {
        let mut emulator_stmt =
            tx.prepare("INSERT INTO emulators (id, name, platform) VALUES (?1, ?2, ?3)")?;
        let mut config_stmt = tx.prepare(
            "INSERT INTO emulator_configs (emulator_id, os, exe, args) VALUES (?1, ?2, ?3, ?4)",
        )?;

        for (id, def) in &state.settings.emulators {
            emulator_stmt.execute(params![id, def.name, def.platform.as_str()])?;

            for os in OsKey::ALL {
                if let Some(config) = def.config_for(os) {
                    let args = serde_json::to_string(&config.args)?;
                    config_stmt.execute(params![id, os.as_str(), config.exe, args])?;
                }
            }
        }

        Ok(())
    }

    fn insert_folders(tx: &Transaction, folders: &[GameFolder]) -> Result<(), LibraryError> {
        let mut stmt = tx.prepare(
            r#"INSERT INTO game_folders (position, id, name, platform, path, emulator_id)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        )?;

        for (position, folder) in folders.iter().enumerate() {
            stmt.execute(params![
                position as i64,
                folder.id,
                folder.name,
                folder.platform.as_str(),
                folder.path,
                folder.emulator_id,
            ])?;
        }

        Ok(())
    }

    fn insert_games(tx: &Transaction, games: &[Game]) -> Result<(), LibraryError> {
        let mut stmt = tx.prepare(
            r#"INSERT INTO games
               (position, id, title, platform, steam_app_id, rom_path, emulator_id, favorite)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
        )?;

        for (position, game) in games.iter().enumerate() {
            stmt.execute(params![
                position as i64,
                game.id,
                game.title,
                game.platform.as_str(),
                game.steam_app_id,
                game.rom_path,
                game.emulator_id,
                game.favorite,
            ])?;
        }

        Ok(())
    }

    /// Load the stored snapshot. An empty database loads as the default state.
    pub fn load(&self) -> Result<LibraryState, LibraryError> {
        let mut state = LibraryState::new();

        let mut stmt = self
            .conn
            .prepare("SELECT id, name, platform FROM emulators ORDER BY id")?;
        let emulators = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (id, name, platform) in emulators {
            let platform: Platform = platform.parse()?;
            state
                .settings
                .emulators
                .insert(id, EmulatorDef::new(name, platform));
        }

        let mut stmt = self
            .conn
            .prepare("SELECT emulator_id, os, exe, args FROM emulator_configs")?;
        let configs = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (emulator_id, os, exe, args) in configs {
            let os: OsKey = os.parse()?;
            let args: Vec<String> = serde_json::from_str(&args)?;
            let def = state
                .settings
                .emulators
                .get_mut(&emulator_id)
                .ok_or_else(|| {
                    LibraryError::Database(format!("config for unknown emulator {}", emulator_id))
                })?;
            def.set_config(os, EmulatorOsConfig::new(exe, args));
        }

        state.settings.game_folders = self.load_folders()?;
        state.games = self.load_games()?;

        Ok(state)
    }

    fn load_folders(&self) -> Result<Vec<GameFolder>, LibraryError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, platform, path, emulator_id FROM game_folders ORDER BY position",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>("id")?,
                    row.get::<_, String>("name")?,
                    row.get::<_, String>("platform")?,
                    row.get::<_, String>("path")?,
                    row.get::<_, Option<String>>("emulator_id")?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name, platform, path, emulator_id)| -> Result<GameFolder, LibraryError> {
                Ok(GameFolder {
                    id,
                    name,
                    platform: platform.parse()?,
                    path,
                    emulator_id,
                })
            })
            .collect()
    }

    fn load_games(&self) -> Result<Vec<Game>, LibraryError> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, title, platform, steam_app_id, rom_path, emulator_id, favorite
               FROM games ORDER BY position"#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>("id")?,
                    row.get::<_, String>("title")?,
                    row.get::<_, String>("platform")?,
                    row.get::<_, Option<String>>("steam_app_id")?,
                    row.get::<_, Option<String>>("rom_path")?,
                    row.get::<_, Option<String>>("emulator_id")?,
                    row.get::<_, bool>("favorite")?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(id, title, platform, steam_app_id, rom_path, emulator_id, favorite)|
                 -> Result<Game, LibraryError> {
                    Ok(Game {
                        id,
                        title,
                        platform: platform.parse()?,
                        steam_app_id,
                        rom_path,
                        emulator_id,
                        favorite,
                    })
                },
            )
            .collect()
    }

    /// Get total game count
    pub fn game_count(&self) -> Result<i64, LibraryError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use tempfile::TempDir;

    fn sample_state() -> LibraryState {
        let mut state = LibraryState::new();
        let emu = state.upsert_emulator(
            Some("pcsx2"),
            "PCSX2",
            Platform::Ps2,
            OsKey::Win,
            EmulatorOsConfig::new("\"C:\\PCSX2\\pcsx2.exe\"", vec!["-batch".into(), "${ROM}".into()]),
        );
        state.upsert_emulator(
            Some(emu.as_str()),
            "ignored",
            Platform::Ps2,
            OsKey::Linux,
            EmulatorOsConfig::new("pcsx2-qt", vec![]),
        );
        state
            .add_game_folder("PS2", Platform::Ps2, "/roms/ps2", Some(emu.clone()))
            .unwrap();
        state
            .add_game_folder("Steam", Platform::Steam, "/steam", None)
            .unwrap();
        state.add_steam_app("570", "Dota 2");
        let fav = state.add_rom_game("B", Platform::Ps2, "/roms/ps2/b.iso", Some(emu.clone()));
        state.add_rom_game("A", Platform::Ps2, "/roms/ps2/a.iso", Some(emu));
        state.toggle_favorite(&fav);
        state
    }

    #[test]
    fn test_database_creation() {
        let db = StateDatabase::in_memory().unwrap();
        assert_eq!(db.game_count().unwrap(), 0);
        assert_eq!(db.load().unwrap(), LibraryState::default());
    }

    #[test]
    fn test_round_trip_is_exact() {
        let mut db = StateDatabase::in_memory().unwrap();
        let state = sample_state();

        db.save(&state).unwrap();

        assert_eq!(db.game_count().unwrap(), 3);
        assert_eq!(db.load().unwrap(), state);
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let mut db = StateDatabase::in_memory().unwrap();
        let mut state = sample_state();
        db.save(&state).unwrap();

        state.prune_games_by_folder("/roms/ps2");
        state.settings.game_folders.clear();
        db.save(&state).unwrap();

        let loaded = db.load().unwrap();
        assert_eq!(loaded.games.len(), 1);
        assert!(loaded.settings.game_folders.is_empty());
        assert_eq!(loaded.settings.emulators.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_survive() {
        let mut db = StateDatabase::in_memory().unwrap();
        let game = Game::steam("570", "Dota 2");
        let mut state = LibraryState::new();
        state.set_games(vec![game.clone(), game]);

        db.save(&state).unwrap();

        assert_eq!(db.load().unwrap().games.len(), 2);
    }

    #[test]
    fn test_unknown_platform_is_rejected_on_load() {
        let db = StateDatabase::in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO games (position, id, title, platform) VALUES (0, 'x', 'X', 'n64')",
                [],
            )
            .unwrap();

        let err = db.load().unwrap_err();
        assert!(matches!(err, LibraryError::Config(_)));
    }

    #[test]
    fn test_file_database_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("library.db");
        let state = sample_state();

        {
            let mut db = StateDatabase::open(&path).unwrap();
            db.save(&state).unwrap();
        }

        let db = StateDatabase::open(&path).unwrap();
        assert_eq!(db.load().unwrap(), state);
    }
}
