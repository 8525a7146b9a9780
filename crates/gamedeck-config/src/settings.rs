//! Emulator and game folder definitions
//!
//! These types make up the persisted settings document: a list of game
//! folders plus a mapping of emulator id to definition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{OsKey, Platform};

/// Emulator id -> definition
pub type EmulatorMap = BTreeMap<String, EmulatorDef>;

/// Executable and argument template for one operating system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulatorOsConfig {
    /// Executable path, possibly wrapped in quotes
    pub exe: String,

    /// Argument template. `${ROM}` is replaced with the ROM path at launch.
    #[serde(default)]
    pub args: Vec<String>,
}

impl EmulatorOsConfig {
    pub fn new(exe: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            exe: exe.into(),
            args,
        }
    }

    /// Split a space separated argument string, dropping empty pieces.
    /// An empty string yields the bare `${ROM}` template.
    pub fn parse_args(args: &str) -> Vec<String> {
        let parsed: Vec<String> = args.split_whitespace().map(str::to_string).collect();
        if parsed.is_empty() {
            vec![ROM_PLACEHOLDER.to_string()]
        } else {
            parsed
        }
    }
}

/// Placeholder substituted with the ROM path in argument templates
pub const ROM_PLACEHOLDER: &str = "${ROM}";

/// A named emulator with up to one configuration per OS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulatorDef {
    pub name: String,
    pub platform: Platform,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win: Option<EmulatorOsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<EmulatorOsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<EmulatorOsConfig>,
}

impl EmulatorDef {
    /// Create a definition with no OS slots filled in
    pub fn new(name: impl Into<String>, platform: Platform) -> Self {
        Self {
            name: name.into(),
            platform,
            win: None,
            mac: None,
            linux: None,
        }
    }

    /// Set the slot for an OS
    pub fn with_config(mut self, os: OsKey, config: EmulatorOsConfig) -> Self {
        self.set_config(os, config);
        self
    }

    pub fn config_for(&self, os: OsKey) -> Option<&EmulatorOsConfig> {
        match os {
            OsKey::Win => self.win.as_ref(),
            OsKey::Mac => self.mac.as_ref(),
            OsKey::Linux => self.linux.as_ref(),
        }
    }

    /// Replace one OS slot, leaving the others alone
    pub fn set_config(&mut self, os: OsKey, config: EmulatorOsConfig) {
        let slot = match os {
            OsKey::Win => &mut self.win,
            OsKey::Mac => &mut self.mac,
            OsKey::Linux => &mut self.linux,
        };
        *slot = Some(config);
    }

    /// The emulator has no usable executable for this OS yet
    pub fn needs_configuration(&self, os: OsKey) -> bool {
        self.config_for(os)
            .is_none_or(|config| config.exe.trim().is_empty())
    }

    /// OS slots that are filled in
    pub fn configured_os(&self) -> Vec<OsKey> {
        OsKey::ALL
            .into_iter()
            .filter(|os| self.config_for(*os).is_some())
            .collect()
    }
}

/// A directory registered for scanning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFolder {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emulator_id: Option<String>,
}

/// Persisted settings document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub game_folders: Vec<GameFolder>,

    #[serde(default)]
    pub emulators: EmulatorMap,
}

impl Settings {
    /// Emulators whose platform matches, as `(id, definition)` pairs
    pub fn emulators_for_platform(&self, platform: Platform) -> Vec<(&str, &EmulatorDef)> {
        self.emulators
            .iter()
            .filter(|(_, def)| def.platform == platform)
            .map(|(id, def)| (id.as_str(), def))
            .collect()
    }

    pub fn emulator(&self, id: &str) -> Option<&EmulatorDef> {
        self.emulators.get(id)
    }

    pub fn folder(&self, id: &str) -> Option<&GameFolder> {
        self.game_folders.iter().find(|f| f.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcsx2() -> EmulatorDef {
        EmulatorDef::new("PCSX2", Platform::Ps2).with_config(
            OsKey::Win,
            EmulatorOsConfig::new("C:\\PCSX2\\pcsx2.exe", vec!["${ROM}".into()]),
        )
    }

    #[test]
    fn test_set_config_keeps_other_slots() {
        let mut def = pcsx2();
        def.set_config(OsKey::Linux, EmulatorOsConfig::new("/usr/bin/pcsx2", vec![]));

        assert!(def.win.is_some());
        assert!(def.linux.is_some());
        assert_eq!(def.configured_os(), vec![OsKey::Win, OsKey::Linux]);
    }

    #[test]
    fn test_needs_configuration() {
        let def = pcsx2();
        assert!(!def.needs_configuration(OsKey::Win));
        assert!(def.needs_configuration(OsKey::Mac));

        let blank = EmulatorDef::new("Blank", Platform::Gba)
            .with_config(OsKey::Linux, EmulatorOsConfig::new("  ", vec![]));
        assert!(blank.needs_configuration(OsKey::Linux));
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(
            EmulatorOsConfig::parse_args("-batch  ${ROM} "),
            vec!["-batch".to_string(), "${ROM}".to_string()]
        );
        assert_eq!(EmulatorOsConfig::parse_args("   "), vec!["${ROM}".to_string()]);
    }

    #[test]
    fn test_settings_json_shape() {
        let mut settings = Settings::default();
        settings.emulators.insert("pcsx2".into(), pcsx2());
        settings.game_folders.push(GameFolder {
            id: "f1".into(),
            name: "PS2 ROMs".into(),
            platform: Platform::Ps2,
            path: "/roms/ps2".into(),
            emulator_id: Some("pcsx2".into()),
        });

        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["gameFolders"][0]["emulatorId"], "pcsx2");
        assert_eq!(value["emulators"]["pcsx2"]["platform"], "ps2");
        assert_eq!(value["emulators"]["pcsx2"]["win"]["args"][0], "${ROM}");
        assert!(value["emulators"]["pcsx2"].get("mac").is_none());

        let back: Settings = serde_json::from_value(value).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_emulators_for_platform() {
        let mut settings = Settings::default();
        settings.emulators.insert("pcsx2".into(), pcsx2());
        settings
            .emulators
            .insert("mgba".into(), EmulatorDef::new("mGBA", Platform::Gba));

        let ps2 = settings.emulators_for_platform(Platform::Ps2);
        assert_eq!(ps2.len(), 1);
        assert_eq!(ps2[0].0, "pcsx2");
        assert!(settings.emulators_for_platform(Platform::Ps3).is_empty());
    }
}
