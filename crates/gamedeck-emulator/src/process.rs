//! Spawning games

use crate::launcher::{LaunchRequest, LaunchTarget};
use crate::EmulatorError;
use gamedeck_config::OsKey;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// Launch result
#[derive(Debug)]
pub struct LaunchResult {
    /// Child process handle
    pub child: Child,

    /// PID of the launched process
    pub pid: u32,

    /// Program that was started
    pub program: String,
}

/// Command that opens `uri` with the OS default handler
pub fn opener_command(os: OsKey, uri: &str) -> Command {
    let mut cmd = match os {
        OsKey::Win => {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        }
        OsKey::Mac => Command::new("open"),
        OsKey::Linux => Command::new("xdg-open"),
    };
    cmd.arg(uri);
    cmd
}

/// Starts launch targets as detached processes
pub struct GameLauncher {
    os: OsKey,
}

impl Default for GameLauncher {
    fn default() -> Self {
        Self {
            os: OsKey::current(),
        }
    }
}

impl GameLauncher {
    /// Create a launcher for the running OS
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a launcher that opens URIs the way `os` does
    pub fn for_os(os: OsKey) -> Self {
        Self { os }
    }

    pub fn os(&self) -> OsKey {
        self.os
    }

    /// Find the executable a request names.
    ///
    /// Anything with a path separator must exist as given; a bare name is
    /// looked up on `PATH`.
    pub fn resolve_executable(exe: &str) -> Result<PathBuf, EmulatorError> {
        let path = Path::new(exe);
        if exe.contains(['/', '\\']) || path.is_absolute() {
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            return Err(EmulatorError::EmulatorNotFound(path.to_path_buf()));
        }

        which::which(exe).map_err(|e| {
            tracing::debug!("{} not on PATH: {}", exe, e);
            EmulatorError::EmulatorNotFound(path.to_path_buf())
        })
    }

    /// Launch a target
    pub fn launch(&self, target: &LaunchTarget) -> Result<LaunchResult, EmulatorError> {
        match target {
            LaunchTarget::Process(request) => self.spawn(request),
            LaunchTarget::StoreUri(uri) => self.open_uri(uri),
        }
    }

    /// Verify and spawn an emulator process
    pub fn spawn(&self, request: &LaunchRequest) -> Result<LaunchResult, EmulatorError> {
        let exe = Self::resolve_executable(&request.exe)?;

        if let Some(rom) = &request.rom
            && !rom.exists()
        {
            return Err(EmulatorError::RomNotFound(rom.clone()));
        }

        let mut cmd = Command::new(&exe);
        cmd.args(&request.args);

        if let Some(cwd) = &request.cwd {
            cmd.current_dir(cwd);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        tracing::info!("Launching {}", request.command_line());

        let child = cmd.spawn().map_err(|e| {
            EmulatorError::LaunchFailed(format!("Failed to spawn {}: {}", request.exe, e))
        })?;

        let pid = child.id();
        tracing::debug!("Started {} as pid {}", exe.display(), pid);

        Ok(LaunchResult {
            child,
            pid,
            program: request.exe.clone(),
        })
    }

    /// Hand a URI to the OS opener
    pub fn open_uri(&self, uri: &str) -> Result<LaunchResult, EmulatorError> {
        let mut cmd = opener_command(self.os, uri);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        tracing::info!("Opening {}", uri);

        let program = cmd.get_program().to_string_lossy().to_string();
        let child = cmd.spawn().map_err(|e| {
            EmulatorError::LaunchFailed(format!("Failed to open {} with {}: {}", uri, program, e))
        })?;

        Ok(LaunchResult {
            pid: child.id(),
            child,
            program,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_opener_per_os() {
        let uri = "steam://rungameid/570";

        let cmd = opener_command(OsKey::Linux, uri);
        assert_eq!(cmd.get_program(), "xdg-open");
        assert_eq!(args_of(&cmd), vec![uri]);

        let cmd = opener_command(OsKey::Mac, uri);
        assert_eq!(cmd.get_program(), "open");

        let cmd = opener_command(OsKey::Win, uri);
        assert_eq!(cmd.get_program(), "cmd");
        assert_eq!(args_of(&cmd), vec!["/C", "start", "", uri]);
    }

    #[test]
    fn test_missing_executable_path() {
        let err = GameLauncher::resolve_executable("/definitely/not/here/emu").unwrap_err();
        assert!(matches!(err, EmulatorError::EmulatorNotFound(_)));
    }

    #[test]
    fn test_unknown_bare_command() {
        let err =
            GameLauncher::resolve_executable("gamedeck-no-such-emulator-binary").unwrap_err();
        assert!(matches!(err, EmulatorError::EmulatorNotFound(_)));
    }

    #[test]
    fn test_default_os_is_host() {
        assert_eq!(GameLauncher::new().os(), OsKey::current());
        assert_eq!(GameLauncher::for_os(OsKey::Win).os(), OsKey::Win);
    }
}
