//! Game records

use gamedeck_config::Platform;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A game in the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub title: String,
    pub platform: Platform,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_app_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rom_path: Option<String>,

    /// Emulator to launch with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emulator_id: Option<String>,

    #[serde(default)]
    pub favorite: bool,
}

/// Identity used to merge and deduplicate games
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameKey {
    Rom(String),
    Titled(Platform, String),
}

/// Fresh random identity
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Game {
    /// A Steam title, launched through its app id
    pub fn steam(app_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            platform: Platform::Steam,
            steam_app_id: Some(app_id.into()),
            rom_path: None,
            emulator_id: None,
            favorite: false,
        }
    }

    /// A ROM/ISO image run through an emulator
    pub fn rom(
        title: impl Into<String>,
        platform: Platform,
        rom_path: impl Into<String>,
        emulator_id: Option<String>,
    ) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            platform,
            steam_app_id: None,
            rom_path: Some(rom_path.into()),
            emulator_id,
            favorite: false,
        }
    }

    /// ROM path, ignoring blank values
    pub fn rom_path(&self) -> Option<&str> {
        self.rom_path.as_deref().filter(|path| !path.is_empty())
    }

    /// Entries with a ROM path come from scans and are rebuilt on re-scan
    pub fn is_scanned(&self) -> bool {
        self.rom_path().is_some()
    }

    pub fn identity_key(&self) -> GameKey {
        match self.rom_path() {
            Some(path) => GameKey::Rom(path.to_string()),
            None => GameKey::Titled(self.platform, self.title.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key() {
        let rom = Game::rom("A", Platform::Ps2, "/r/a.iso", None);
        assert_eq!(rom.identity_key(), GameKey::Rom("/r/a.iso".into()));

        let steam = Game::steam("570", "Dota 2");
        assert_eq!(
            steam.identity_key(),
            GameKey::Titled(Platform::Steam, "Dota 2".into())
        );

        let blank = Game::rom("B", Platform::Gba, "", None);
        assert!(!blank.is_scanned());
        assert_eq!(blank.identity_key(), GameKey::Titled(Platform::Gba, "B".into()));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Game::steam("570", "Dota 2");
        let b = Game::steam("570", "Dota 2");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_json_shape() {
        let game = Game::steam("570", "Dota 2");
        let value = serde_json::to_value(&game).unwrap();
        assert_eq!(value["steamAppId"], "570");
        assert_eq!(value["platform"], "steam");
        assert!(value.get("romPath").is_none());

        let parsed: Game = serde_json::from_value(serde_json::json!({
            "id": "x",
            "title": "Halo",
            "platform": "custom",
            "romPath": "C:\\Games\\halo.exe"
        }))
        .unwrap();
        assert!(!parsed.favorite);
        assert_eq!(parsed.rom_path(), Some("C:\\Games\\halo.exe"));
    }
}
