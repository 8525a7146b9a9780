//! Launch request resolution

use crate::EmulatorError;
use gamedeck_config::{EmulatorOsConfig, OsKey, Platform, ROM_PLACEHOLDER, Settings};
use gamedeck_library::Game;
use serde::Serialize;
use std::path::PathBuf;

/// Strip every leading and trailing `"` from `s`
pub fn dequote(s: &str) -> &str {
    s.trim_matches('"')
}

/// URI that starts a Steam app through the Steam client
pub fn steam_uri(app_id: &str) -> String {
    format!("steam://rungameid/{}", app_id)
}

/// Directory part of a path, split on either separator
fn parent_dir(path: &str) -> Option<String> {
    let index = path.rfind(['/', '\\'])?;
    if index == 0 {
        return Some(path[..1].to_string());
    }
    Some(path[..index].to_string())
}

/// Process to spawn for a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchRequest {
    /// Executable, quotes removed
    pub exe: String,

    /// Arguments with the ROM path substituted
    pub args: Vec<String>,

    /// Working directory: the executable's directory, when it has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    /// ROM file the request was built for
    #[serde(skip)]
    pub rom: Option<PathBuf>,
}

impl LaunchRequest {
    /// Build a request from an emulator's OS slot and a ROM path.
    ///
    /// Quotes around the executable and the ROM path are removed before
    /// every `${ROM}` in every argument is replaced.
    pub fn for_rom(config: &EmulatorOsConfig, rom_path: &str) -> Self {
        let exe = dequote(config.exe.trim()).to_string();
        let rom = dequote(rom_path.trim());

        let args = config
            .args
            .iter()
            .map(|arg| arg.replace(ROM_PLACEHOLDER, rom))
            .collect();

        Self {
            cwd: parent_dir(&exe),
            exe,
            args,
            rom: Some(PathBuf::from(rom)),
        }
    }

    /// The full command line, for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.exe.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// What launching a game means on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    /// Run an emulator
    Process(LaunchRequest),
    /// Hand a URI to the OS opener
    StoreUri(String),
}

/// Work out how to launch `game` on `os`
pub fn resolve_launch(
    game: &Game,
    settings: &Settings,
    os: OsKey,
) -> Result<LaunchTarget, EmulatorError> {
    if game.platform == Platform::Steam {
        let app_id = game
            .steam_app_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                EmulatorError::ConfigurationMissing(format!("{} has no Steam app id", game.title))
            })?;
        return Ok(LaunchTarget::StoreUri(steam_uri(app_id.trim())));
    }

    let rom_path = game.rom_path().ok_or_else(|| {
        EmulatorError::ConfigurationMissing(format!("{} has no ROM path", game.title))
    })?;

    let emulator_id = game.emulator_id.as_deref().ok_or_else(|| {
        EmulatorError::ConfigurationMissing(format!("{} has no emulator assigned", game.title))
    })?;

    let emulator = settings.emulator(emulator_id).ok_or_else(|| {
        EmulatorError::ConfigurationMissing(format!("emulator {} is not defined", emulator_id))
    })?;

    if emulator.needs_configuration(os) {
        return Err(EmulatorError::ConfigurationMissing(format!(
            "no {} executable for {}",
            os, emulator.name
        )));
    }

    let config = emulator.config_for(os).ok_or_else(|| {
        EmulatorError::ConfigurationMissing(format!("no {} executable for {}", os, emulator.name))
    })?;

    Ok(LaunchTarget::Process(LaunchRequest::for_rom(config, rom_path)))
}
