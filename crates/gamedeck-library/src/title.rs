//! Display titles from file paths
//!
//! Pure string functions; nothing here touches the filesystem. Paths are
//! split on both `/` and `\` so Windows paths normalize the same way on
//! every host.

use gamedeck_config::Platform;

/// Extensions stripped from file names, matched case-insensitively
const KNOWN_EXTENSIONS: [&str; 8] = ["iso", "chd", "bin", "cue", "pkg", "gba", "zip", "exe"];

/// Trailing segments of a PS3 game folder's boot executable
const PACKAGE_LAYOUT: [&str; 3] = ["PS3_GAME", "USRDIR", "EBOOT.BIN"];

/// Title used when a package layout has no usable game directory name
pub const PS3_PLACEHOLDER_TITLE: &str = "PS3 Game";

fn segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\']).collect()
}

/// Path ends in `PS3_GAME/USRDIR/EBOOT.BIN` (any case, any separator)
pub fn is_package_layout(path: &str) -> bool {
    let parts = segments(path);
    parts.len() >= PACKAGE_LAYOUT.len()
        && parts[parts.len() - PACKAGE_LAYOUT.len()..]
            .iter()
            .zip(PACKAGE_LAYOUT)
            .all(|(part, expected)| part.eq_ignore_ascii_case(expected))
}

/// Name of the directory holding `PS3_GAME`, if there is one
fn package_title(path: &str) -> Option<&str> {
    let parts = segments(path);
    let index = parts.len().checked_sub(PACKAGE_LAYOUT.len() + 1)?;
    let name = parts[index].trim();

    // Empty for rooted paths, `C:` for a drive root
    if name.is_empty() || name.ends_with(':') {
        None
    } else {
        Some(name)
    }
}

fn strip_known_extension(name: &str) -> &str {
    for ext in KNOWN_EXTENSIONS {
        let Some(dot) = name.len().checked_sub(ext.len() + 1) else {
            continue;
        };
        if let Some(suffix) = name.get(dot..)
            && suffix.starts_with('.')
            && suffix[1..].eq_ignore_ascii_case(ext)
        {
            return &name[..dot];
        }
    }
    name
}

/// Display title for a scanned file.
///
/// The last path segment loses one known extension, dots and underscores
/// become spaces, and the result is trimmed. PS3 package layouts are titled
/// after the directory that contains `PS3_GAME`.
pub fn title_from_path(path: &str, platform: Platform) -> String {
    if platform == Platform::Ps3 && is_package_layout(path) {
        return package_title(path)
            .unwrap_or(PS3_PLACEHOLDER_TITLE)
            .to_string();
    }

    let base = path
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(path);

    strip_known_extension(base)
        .replace(['.', '_'], " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_titles() {
        let cases = [
            ("/roms/ps2/Final_Fantasy_X.iso", "Final Fantasy X"),
            ("C:\\roms\\gba\\pokemon.emerald.GBA", "pokemon emerald"),
            ("D:/mixed\\seps/Game_Name.chd", "Game Name"),
            ("/roms/ps2/Disc.1.CUE", "Disc 1"),
            ("/games/tool.exe", "tool"),
            ("/roms/other/readme.txt", "readme txt"),
            ("archive.zip", "archive"),
            ("/roms/ps2/ Spaced _.bin", "Spaced"),
        ];

        for (path, expected) in cases {
            assert_eq!(title_from_path(path, Platform::Ps2), expected, "path: {}", path);
        }
    }

    #[test]
    fn test_only_one_extension_is_stripped() {
        assert_eq!(title_from_path("/r/game.bin.iso", Platform::Ps2), "game bin");
    }

    #[test]
    fn test_trailing_separator() {
        assert_eq!(title_from_path("/roms/custom/Game_Dir/", Platform::Custom), "Game Dir");
    }

    #[test]
    fn test_package_layout_detection() {
        assert!(is_package_layout("/games/Demon/PS3_GAME/USRDIR/EBOOT.BIN"));
        assert!(is_package_layout("E:\\ps3\\Demon\\ps3_game\\usrdir\\eboot.bin"));
        assert!(is_package_layout("PS3_GAME/USRDIR/EBOOT.BIN"));
        assert!(!is_package_layout("/games/Demon/USRDIR/EBOOT.BIN"));
        assert!(!is_package_layout("/games/Demon/PS3_GAME/USRDIR/EBOOT.BIN.bak"));
    }

    #[test]
    fn test_package_layout_title() {
        assert_eq!(
            title_from_path("/games/Game1/PS3_GAME/USRDIR/EBOOT.BIN", Platform::Ps3),
            "Game1"
        );
        assert_eq!(
            title_from_path("E:/ps3\\Demon's Souls\\PS3_GAME/usrdir/EBOOT.BIN", Platform::Ps3),
            "Demon's Souls"
        );
    }

    #[test]
    fn test_package_layout_placeholder() {
        assert_eq!(
            title_from_path("PS3_GAME/USRDIR/EBOOT.BIN", Platform::Ps3),
            PS3_PLACEHOLDER_TITLE
        );
        assert_eq!(
            title_from_path("/PS3_GAME/USRDIR/EBOOT.BIN", Platform::Ps3),
            PS3_PLACEHOLDER_TITLE
        );
        assert_eq!(
            title_from_path("C:\\PS3_GAME\\USRDIR\\EBOOT.BIN", Platform::Ps3),
            PS3_PLACEHOLDER_TITLE
        );
    }

    #[test]
    fn test_package_layout_only_for_ps3() {
        assert_eq!(
            title_from_path("/games/Game1/PS3_GAME/USRDIR/EBOOT.BIN", Platform::Ps2),
            "EBOOT"
        );
    }

    #[test]
    fn test_deterministic() {
        let path = "/roms/ps2/Some_Game.v2.iso";
        let first = title_from_path(path, Platform::Ps2);
        for _ in 0..5 {
            assert_eq!(title_from_path(path, Platform::Ps2), first);
        }
    }

    #[test]
    fn test_non_ascii_names() {
        assert_eq!(title_from_path("/roms/gba/ポケモン.gba", Platform::Gba), "ポケモン");
        assert_eq!(title_from_path("/roms/gba/é", Platform::Gba), "é");
    }
}
