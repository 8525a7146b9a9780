//! Emulator launching for GameDeck
//!
//! Turns a library entry into something the OS can run: a process request
//! built from the emulator's per-OS template, or a store URI.

mod launcher;
mod process;

pub use launcher::{LaunchRequest, LaunchTarget, dequote, resolve_launch, steam_uri};
pub use process::{GameLauncher, LaunchResult, opener_command};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("Emulator not found: {0}")]
    EmulatorNotFound(PathBuf),

    #[error("ROM not found: {0}")]
    RomNotFound(PathBuf),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Launch failed: {0}")]
    LaunchFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
