//! Headless subcommands

use anyhow::{Context, Result, bail};
use gamedeck_config::{EmulatorOsConfig, OsKey, Platform};
use gamedeck_emulator::{GameLauncher, LaunchTarget, resolve_launch};
use gamedeck_library::{Collection, Library};
use std::path::Path;

pub fn list(
    library: &Library,
    platform: Option<Platform>,
    favorites: bool,
    search: &str,
    json: bool,
) -> Result<()> {
    let collection = match platform {
        Some(platform) => Collection::Platform(platform),
        None => Collection::All,
    };

    let games: Vec<_> = library
        .filter_games(collection, search)
        .into_iter()
        .filter(|game| !favorites || game.favorite)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&games)?);
        return Ok(());
    }

    for game in games {
        let star = if game.favorite { "*" } else { " " };
        println!("{} {:<36} {:<6} {}", star, game.id, game.platform.as_str(), game.title);
    }
    Ok(())
}

pub async fn scan(library: &mut Library) -> Result<()> {
    let report = library.rescan().await?;

    for folder in &report.folders {
        match &folder.error {
            Some(e) => println!("{:<20} failed: {}", folder.folder_name, e),
            None => println!("{:<20} {} games", folder.folder_name, folder.games_found),
        }
        for skipped in &folder.skipped {
            println!("{:<20} skipped {}", "", skipped.path.display());
        }
    }

    println!(
        "{} games found in {}ms, library has {} games",
        report.games_found(),
        report.duration_ms,
        library.games().len()
    );
    Ok(())
}

pub fn launch(library: &Library, id: &str, dry_run: bool) -> Result<()> {
    let Some(game) = library.game(id) else {
        bail!("Game not found: {}", id);
    };

    let launcher = GameLauncher::new();
    let target = resolve_launch(game, library.settings(), launcher.os())?;

    if dry_run {
        match &target {
            LaunchTarget::Process(request) => {
                println!("{}", serde_json::to_string_pretty(request)?)
            }
            LaunchTarget::StoreUri(uri) => println!("{}", uri),
        }
        return Ok(());
    }

    let result = launcher
        .launch(&target)
        .with_context(|| format!("Failed to launch {}", game.title))?;
    println!("Launched {} (pid {})", game.title, result.pid);
    Ok(())
}

pub fn favorite(library: &mut Library, id: &str) -> Result<()> {
    let favorite = library.toggle_favorite(id)?;
    println!("{}", if favorite { "Added to favorites" } else { "Removed from favorites" });
    Ok(())
}

pub fn add_emulator(
    library: &mut Library,
    id: Option<&str>,
    name: &str,
    platform: Platform,
    os: OsKey,
    exe: &str,
    args: &str,
) -> Result<()> {
    let config = EmulatorOsConfig::new(exe, EmulatorOsConfig::parse_args(args));
    let id = library.upsert_emulator(id, name, platform, os, config)?;
    println!("{}", id);
    Ok(())
}

pub fn remove_folder(library: &mut Library, id: &str, prune: bool) -> Result<()> {
    let folder = library.remove_game_folder(id)?;
    println!("Removed folder {}", folder.name);

    if prune {
        let removed = library.prune_games_by_folder(&folder.path)?;
        println!("Removed {} games under {}", removed, folder.path);
    }
    Ok(())
}

pub fn export(library: &Library, output: Option<&Path>) -> Result<()> {
    let json = library.export_json()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn import(library: &mut Library, input: &Path) -> Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    library.import_json(&json)?;
    println!(
        "Imported {} games and {} folders",
        library.games().len(),
        library.settings().game_folders.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_folder_with_prune() {
        let mut library = Library::in_memory().unwrap();
        add_emulator(&mut library, Some("pcsx2"), "PCSX2", Platform::Ps2, OsKey::Linux, "pcsx2-qt", "")
            .unwrap();
        let folder = library
            .add_game_folder("PS2", Platform::Ps2, "/roms/ps2", Some("pcsx2".into()))
            .unwrap();
        library
            .add_rom_game("A", Platform::Ps2, "/roms/ps2/a.iso", Some("pcsx2".into()))
            .unwrap();
        library.add_steam_app("570", "Dota 2").unwrap();

        remove_folder(&mut library, &folder, true).unwrap();

        assert!(library.settings().game_folders.is_empty());
        assert_eq!(library.games().len(), 1);
    }

    #[test]
    fn test_add_emulator_blank_args_use_rom_only() {
        let mut library = Library::in_memory().unwrap();
        add_emulator(&mut library, Some("mgba"), "mGBA", Platform::Gba, OsKey::Linux, "mgba", "")
            .unwrap();

        let def = library.settings().emulator("mgba").unwrap();
        assert_eq!(def.config_for(OsKey::Linux).unwrap().args, vec!["${ROM}"]);
    }

    #[test]
    fn test_export_then_import() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");

        let mut library = Library::in_memory().unwrap();
        library.add_steam_app("570", "Dota 2").unwrap();
        export(&library, Some(&path)).unwrap();

        let mut other = Library::in_memory().unwrap();
        import(&mut other, &path).unwrap();

        assert_eq!(other.state(), library.state());
    }

    #[test]
    fn test_launch_unknown_game() {
        let library = Library::in_memory().unwrap();
        assert!(launch(&library, "missing", true).is_err());
    }
}
