//! Save file role classification.
//!
//! Roles are derived from the exact file name and, for per-player saves,
//! the name of the containing directory. Only `.sav` files are considered.

use std::path::Path;

use palwatch_types::FileRole;

/// Directory holding per-player saves.
const PLAYERS_DIR: &str = "Players";

/// Classify `path` by file role.
///
/// Returns `None` for anything that is not a `.sav` file.
pub fn classify_path(path: &Path) -> Option<FileRole> {
    let is_sav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "sav");
    if !is_sav {
        return None;
    }

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let role = match name {
        "Level.sav" => FileRole::Level,
        "LevelMeta.sav" => FileRole::Meta,
        "LocalData.sav" => FileRole::Local,
        "WorldOption.sav" => FileRole::WorldOption,
        "GlobalPalStorage.sav" => FileRole::GlobalStorage,
        "UserOption.sav" => FileRole::UserOption,
        _ if parent_dir_name(path) == Some(PLAYERS_DIR) => FileRole::Player,
        _ => FileRole::Unknown,
    };
    Some(role)
}

/// File name component of `path` for display in events.
pub fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

fn parent_dir_name(path: &Path) -> Option<&str> {
    path.parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(path: &str) -> Option<FileRole> {
        classify_path(Path::new(path))
    }

    #[test]
    fn known_world_files() {
        let world = "/games/SaveGames/0/ABCDEF";
        assert_eq!(role(&format!("{world}/Level.sav")), Some(FileRole::Level));
        assert_eq!(role(&format!("{world}/LevelMeta.sav")), Some(FileRole::Meta));
        assert_eq!(role(&format!("{world}/LocalData.sav")), Some(FileRole::Local));
        assert_eq!(role(&format!("{world}/WorldOption.sav")), Some(FileRole::WorldOption));
        assert_eq!(
            role(&format!("{world}/GlobalPalStorage.sav")),
            Some(FileRole::GlobalStorage)
        );
        assert_eq!(role(&format!("{world}/UserOption.sav")), Some(FileRole::UserOption));
    }

    #[test]
    fn player_saves_are_recognized_by_directory() {
        assert_eq!(
            role("/games/SaveGames/0/ABCDEF/Players/00000000000000000000000000000001.sav"),
            Some(FileRole::Player)
        );
    }

    #[test]
    fn other_sav_files_are_unknown() {
        assert_eq!(role("/games/SaveGames/0/ABCDEF/backup/Level_old.sav"), Some(FileRole::Unknown));
    }

    #[test]
    fn known_names_win_over_players_directory() {
        assert_eq!(role("/x/Players/Level.sav"), Some(FileRole::Level));
    }

    #[test]
    fn non_sav_files_are_ignored() {
        assert_eq!(role("/games/SaveGames/0/ABCDEF/Level.sav.tmp"), None);
        assert_eq!(role("/games/SaveGames/0/ABCDEF/Level.json"), None);
        assert_eq!(role("/games/SaveGames/0/ABCDEF/Players"), None);
        assert_eq!(role("/games/SaveGames/0/ABCDEF/Level.SAV"), None);
    }

    #[test]
    fn display_name_is_the_file_name() {
        assert_eq!(display_name(Path::new("/a/b/LocalData.sav")), "LocalData.sav");
    }
}
