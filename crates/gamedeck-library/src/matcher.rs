//! Selecting installed titles from a folder listing

use crate::title::is_package_layout;
use crate::tree::{SkippedDir, TreeListing, collect_tree};
use crate::ScanError;
use gamedeck_config::Platform;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const PS2_EXTENSIONS: &[&str] = &[".iso", ".chd", ".cue", ".bin"];
const GBA_EXTENSIONS: &[&str] = &[".gba", ".zip"];
const CUSTOM_EXTENSIONS: &[&str] = &[".exe"];

const PACKAGE_DIR: &str = "PS3_GAME";
const PACKAGE_CONTENT_DIR: &str = "USRDIR";
const PACKAGE_BOOT_FILE: &str = "EBOOT.BIN";

/// How a platform decides which files are games
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Case-insensitive suffix allow-list. Empty matches nothing.
    Extensions(&'static [&'static str]),
    /// `PS3_GAME/USRDIR/EBOOT.BIN` folder layout
    PackageLayout,
}

impl MatchRule {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Ps3 => MatchRule::PackageLayout,
            Platform::Ps2 => MatchRule::Extensions(PS2_EXTENSIONS),
            Platform::Gba => MatchRule::Extensions(GBA_EXTENSIONS),
            Platform::Custom => MatchRule::Extensions(CUSTOM_EXTENSIONS),
            Platform::Steam => MatchRule::Extensions(&[]),
        }
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let path = path.to_string_lossy().to_lowercase();
    extensions.iter().any(|ext| path.ends_with(ext))
}

fn dir_name_is(dir: &Path, name: &str) -> bool {
    dir.file_name()
        .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case(name))
}

/// Existence probe. A failed probe counts as absent.
async fn exists(path: &Path) -> bool {
    match tokio::fs::try_exists(path).await {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!("Probe failed for {}: {}", path.display(), e);
            false
        }
    }
}

async fn match_package_layout(listing: &TreeListing) -> Vec<PathBuf> {
    let direct: Vec<PathBuf> = listing
        .files
        .iter()
        .filter(|file| is_package_layout(&file.to_string_lossy()))
        .cloned()
        .collect();

    if !direct.is_empty() {
        return direct;
    }

    // Some dumps only surface the container directories; confirm the boot
    // file on disk before counting them.
    let mut seen = HashSet::new();
    let mut probed = Vec::new();

    for dir in &listing.dirs {
        let candidate = if dir_name_is(dir, PACKAGE_CONTENT_DIR) {
            dir.join(PACKAGE_BOOT_FILE)
        } else if dir_name_is(dir, PACKAGE_DIR) {
            dir.join(PACKAGE_CONTENT_DIR).join(PACKAGE_BOOT_FILE)
        } else {
            continue;
        };

        if seen.contains(&candidate) || !exists(&candidate).await {
            continue;
        }
        seen.insert(candidate.clone());
        probed.push(candidate);
    }

    probed
}

/// Apply `platform`'s rule to a listing.
///
/// Files come back in listing order, so a given tree state always yields
/// the same sequence.
pub async fn match_listing(listing: &TreeListing, platform: Platform) -> Vec<PathBuf> {
    match MatchRule::for_platform(platform) {
        MatchRule::Extensions(extensions) => listing
            .files
            .iter()
            .filter(|file| has_extension(file, extensions))
            .cloned()
            .collect(),
        MatchRule::PackageLayout => match_package_layout(listing).await,
    }
}

/// Matches found in one folder
#[derive(Debug, Default)]
pub struct FolderMatches {
    pub paths: Vec<PathBuf>,
    /// Directories the walk could not read
    pub skipped: Vec<SkippedDir>,
}

/// Walk `root` and return the files that are games for `platform`
pub async fn find_matches(root: &Path, platform: Platform) -> Result<FolderMatches, ScanError> {
    let listing = collect_tree(root).await?;
    let paths = match_listing(&listing, platform).await;

    tracing::debug!(
        "Matched {} {} titles under {}",
        paths.len(),
        platform,
        root.display()
    );

    Ok(FolderMatches {
        paths,
        skipped: listing.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn listing_of(files: &[&str]) -> TreeListing {
        TreeListing {
            files: files.iter().map(PathBuf::from).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ps2_extensions_ignore_case() {
        let listing = listing_of(&["a.iso", "b.txt", "C.ISO"]);

        let matches = match_listing(&listing, Platform::Ps2).await;

        assert_eq!(matches, vec![PathBuf::from("a.iso"), PathBuf::from("C.ISO")]);
    }

    #[tokio::test]
    async fn test_per_platform_allow_lists() {
        let listing = listing_of(&["/r/a.gba", "/r/b.zip", "/r/c.exe", "/r/d.chd", "/r/e.pkg"]);

        assert_eq!(match_listing(&listing, Platform::Gba).await.len(), 2);
        assert_eq!(
            match_listing(&listing, Platform::Custom).await,
            vec![PathBuf::from("/r/c.exe")]
        );
        assert_eq!(
            match_listing(&listing, Platform::Ps2).await,
            vec![PathBuf::from("/r/d.chd")]
        );
        assert!(match_listing(&listing, Platform::Steam).await.is_empty());
    }

    #[tokio::test]
    async fn test_ps3_direct_matches() {
        let listing = listing_of(&[
            "/ps3/Game1/PS3_GAME/USRDIR/EBOOT.BIN",
            "/ps3/Game1/PS3_GAME/PARAM.SFO",
            "/ps3/Game2/ps3_game/usrdir/eboot.bin",
            "/ps3/loose.iso",
        ]);

        let matches = match_listing(&listing, Platform::Ps3).await;

        assert_eq!(
            matches,
            vec![
                PathBuf::from("/ps3/Game1/PS3_GAME/USRDIR/EBOOT.BIN"),
                PathBuf::from("/ps3/Game2/ps3_game/usrdir/eboot.bin"),
            ]
        );
    }

    #[tokio::test]
    async fn test_ps3_fallback_probes_disk() {
        let dir = TempDir::new().unwrap();
        let usrdir = dir.path().join("Game1").join("PS3_GAME").join("USRDIR");
        fs::create_dir_all(&usrdir).unwrap();
        fs::write(usrdir.join("EBOOT.BIN"), b"SCE").unwrap();

        let listing = TreeListing {
            dirs: vec![usrdir.clone()],
            ..Default::default()
        };

        let matches = match_listing(&listing, Platform::Ps3).await;

        assert_eq!(matches, vec![usrdir.join("EBOOT.BIN")]);
    }

    #[tokio::test]
    async fn test_ps3_fallback_from_container_dir() {
        let dir = TempDir::new().unwrap();
        let package = dir.path().join("Game1").join("PS3_GAME");
        fs::create_dir_all(package.join("USRDIR")).unwrap();
        fs::write(package.join("USRDIR").join("EBOOT.BIN"), b"SCE").unwrap();

        let listing = TreeListing {
            dirs: vec![package.clone(), package.join("USRDIR")],
            ..Default::default()
        };

        let matches = match_listing(&listing, Platform::Ps3).await;

        assert_eq!(matches, vec![package.join("USRDIR").join("EBOOT.BIN")]);
    }

    #[tokio::test]
    async fn test_ps3_fallback_requires_boot_file() {
        let dir = TempDir::new().unwrap();
        let usrdir = dir.path().join("Empty").join("PS3_GAME").join("USRDIR");
        fs::create_dir_all(&usrdir).unwrap();

        let listing = TreeListing {
            dirs: vec![usrdir.parent().unwrap().to_path_buf(), usrdir],
            ..Default::default()
        };

        assert!(match_listing(&listing, Platform::Ps3).await.is_empty());
    }

    #[tokio::test]
    async fn test_find_matches_walks_tree() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("game.GBA"), b"rom").unwrap();
        fs::write(dir.path().join("notes.txt"), b"txt").unwrap();

        let found = find_matches(dir.path(), Platform::Gba).await.unwrap();

        assert_eq!(found.paths, vec![dir.path().join("nested").join("game.GBA")]);
        assert!(found.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_find_matches_missing_root() {
        let dir = TempDir::new().unwrap();
        let result = find_matches(&dir.path().join("gone"), Platform::Ps2).await;
        assert!(matches!(result, Err(ScanError::NotFound(_))));
    }
}
