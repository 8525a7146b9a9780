//! Bundled emulator catalog
//!
//! A TOML table of emulator id -> `{name, platform?, win?, mac?, linux?}`
//! shipped with the binary and installed when no emulators are configured.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::{ConfigError, EmulatorDef, EmulatorMap, EmulatorOsConfig, Platform};

const BUNDLED_CATALOG: &str = include_str!("../data/emulators.toml");

/// One catalog entry before its platform has been resolved
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub name: String,

    #[serde(default)]
    pub platform: Option<Platform>,

    #[serde(default)]
    pub win: Option<EmulatorOsConfig>,

    #[serde(default)]
    pub mac: Option<EmulatorOsConfig>,

    #[serde(default)]
    pub linux: Option<EmulatorOsConfig>,
}

impl CatalogEntry {
    /// Resolve into a definition, guessing the platform from `id` if absent
    pub fn into_def(self, id: &str) -> EmulatorDef {
        EmulatorDef {
            name: self.name,
            platform: self.platform.unwrap_or_else(|| infer_platform(id)),
            win: self.win,
            mac: self.mac,
            linux: self.linux,
        }
    }
}

/// Parsed catalog file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct EmulatorCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl EmulatorCatalog {
    /// The catalog compiled into the binary
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::parse(BUNDLED_CATALOG)
    }

    /// Load a catalog from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let catalog: Self = toml::from_str(contents)?;
        tracing::debug!("Parsed emulator catalog with {} entries", catalog.len());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every entry into an emulator definition
    pub fn into_emulators(self) -> EmulatorMap {
        self.entries
            .into_iter()
            .map(|(id, entry)| {
                let def = entry.into_def(&id);
                (id, def)
            })
            .collect()
    }
}

/// Best-effort guess of an emulator's platform from its id.
///
/// Only used for catalog entries that omit `platform`; anything not
/// recognised is `custom`.
pub fn infer_platform(id: &str) -> Platform {
    let lower = id.to_lowercase();
    if lower.contains("pcsx2") {
        Platform::Ps2
    } else if lower.contains("rpcs3") {
        Platform::Ps3
    } else {
        Platform::Custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OsKey;

    #[test]
    fn test_infer_platform() {
        assert_eq!(infer_platform("pcsx2"), Platform::Ps2);
        assert_eq!(infer_platform("PCSX2-nightly"), Platform::Ps2);
        assert_eq!(infer_platform("rpcs3"), Platform::Ps3);
        assert_eq!(infer_platform("mgba"), Platform::Custom);
    }

    #[test]
    fn test_bundled_catalog() {
        let emulators = EmulatorCatalog::bundled().unwrap().into_emulators();

        assert_eq!(emulators["pcsx2"].platform, Platform::Ps2);
        assert_eq!(emulators["rpcs3"].platform, Platform::Ps3);
        assert_eq!(emulators["mgba"].platform, Platform::Gba);

        let win = emulators["pcsx2"].config_for(OsKey::Win).unwrap();
        assert!(win.exe.ends_with("pcsx2-qt.exe"));
        assert_eq!(win.args.last().map(String::as_str), Some("${ROM}"));
    }

    #[test]
    fn test_explicit_platform_wins_over_inference() {
        let catalog = EmulatorCatalog::parse(
            r#"
[rpcs3-fork]
name = "Not really RPCS3"
platform = "custom"

[my-emu]
name = "Something"

[my-emu.linux]
exe = "/opt/emu/run"
"#,
        )
        .unwrap();

        let emulators = catalog.into_emulators();
        assert_eq!(emulators["rpcs3-fork"].platform, Platform::Custom);
        assert_eq!(emulators["my-emu"].platform, Platform::Custom);
        assert!(emulators["my-emu"].linux.as_ref().unwrap().args.is_empty());
    }

    #[test]
    fn test_unknown_platform_in_catalog_is_rejected() {
        let result = EmulatorCatalog::parse(
            r#"
[dolphin]
name = "Dolphin"
platform = "gamecube"
"#,
        );
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }
}
