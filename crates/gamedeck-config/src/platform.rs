//! Platform and operating-system keys

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// Target system a game, folder or emulator belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Store titles launched through a `steam://` URI
    Steam,
    Ps2,
    Ps3,
    Gba,
    /// Anything else, usually native executables
    Custom,
}

impl Platform {
    /// Every platform, in display order
    pub const ALL: [Platform; 5] = [
        Platform::Steam,
        Platform::Ps2,
        Platform::Ps3,
        Platform::Gba,
        Platform::Custom,
    ];

    /// Lowercase identifier used in persisted state
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Steam => "steam",
            Platform::Ps2 => "ps2",
            Platform::Ps3 => "ps3",
            Platform::Gba => "gba",
            Platform::Custom => "custom",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Steam => "Steam",
            Platform::Ps2 => "PlayStation 2",
            Platform::Ps3 => "PlayStation 3",
            Platform::Gba => "Game Boy Advance",
            Platform::Custom => "Custom",
        }
    }

    /// Titles on this platform are launched through a store URI, not an emulator
    pub fn is_store(&self) -> bool {
        matches!(self, Platform::Steam)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "steam" => Ok(Platform::Steam),
            "ps2" => Ok(Platform::Ps2),
            "ps3" => Ok(Platform::Ps3),
            "gba" => Ok(Platform::Gba),
            "custom" => Ok(Platform::Custom),
            _ => Err(ConfigError::UnknownPlatform(s.to_string())),
        }
    }
}

/// Operating system slot of an emulator definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsKey {
    Win,
    Mac,
    Linux,
}

impl OsKey {
    pub const ALL: [OsKey; 3] = [OsKey::Win, OsKey::Mac, OsKey::Linux];

    /// OS slot for the running host. Unknown targets fall back to `linux`.
    pub fn current() -> Self {
        Self::from_target_os(std::env::consts::OS)
    }

    /// Map a Rust `target_os` name onto a slot
    pub fn from_target_os(os: &str) -> Self {
        match os {
            "windows" => OsKey::Win,
            "macos" => OsKey::Mac,
            _ => OsKey::Linux,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsKey::Win => "win",
            OsKey::Mac => "mac",
            OsKey::Linux => "linux",
        }
    }
}

impl fmt::Display for OsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "win" | "windows" => Ok(OsKey::Win),
            "mac" | "macos" | "darwin" => Ok(OsKey::Mac),
            "linux" => Ok(OsKey::Linux),
            _ => Err(ConfigError::UnknownOs(s.to_string())),
        }
    }
}
