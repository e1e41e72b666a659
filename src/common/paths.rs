//! Project folder resolution and harness configuration paths
//!
//! Test code runs either from a developer checkout (`.../travelnew/<module>`)
//! or from a CI pipeline workspace whose path also contains
//! `_travelnew_pipeline`. Folder lookups are anchored on the `travelnew`
//! root folder so both layouts resolve to the same shared folders.

use std::path::PathBuf;

/// Name of the project root folder
pub const ROOT_FOLDER: &str = "travelnew";

/// Marker present in the workspace path of pipeline builds
pub const PIPELINE_FOLDER: &str = "_travelnew_pipeline";

/// Folder holding driver binaries, relative to the root folder
pub const LIB_FOLDER: &str = "lib/";

/// Folder holding test definition data, relative to the root folder
pub const TEST_DEFINITION_DATA_FOLDER: &str = "testdefinitions/src/test/data/";

/// Name used for the harness configuration directory
const APP_NAME: &str = "sut-harness";

/// Resolve the driver library folder for a working directory
pub fn lib_folder(absolute_path: &str) -> String {
    resolve_folder(absolute_path, ROOT_FOLDER, PIPELINE_FOLDER, LIB_FOLDER)
}

/// Resolve the test data folder for a working directory
pub fn test_data_folder(absolute_path: &str) -> String {
    resolve_folder(
        absolute_path,
        ROOT_FOLDER,
        PIPELINE_FOLDER,
        TEST_DEFINITION_DATA_FOLDER,
    )
}

/// Map `absolute_path` to `folder`, anchored on the `root` path component.
///
/// Everything before the first path component equal to `root` is kept as the
/// prefix. Pipeline workspaces (paths containing `pipeline`) keep the root
/// folder in the result; developer checkouts do not. If `root` never appears
/// as a component the whole input is used as the prefix.
pub fn resolve_folder(absolute_path: &str, root: &str, pipeline: &str, folder: &str) -> String {
    let prefix = match find_component(absolute_path, root) {
        Some(idx) => &absolute_path[..idx],
        None => absolute_path,
    };

    if absolute_path.contains(pipeline) {
        format!("{}{}/{}", prefix, root, folder)
    } else {
        format!("{}{}", prefix, folder)
    }
}

/// Byte offset of the first occurrence of `name` as a whole path component
fn find_component(path: &str, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    let is_sep = |c: Option<char>| matches!(c, None | Some('/') | Some('\\'));

    path.match_indices(name).map(|(idx, _)| idx).find(|&idx| {
        let before = path[..idx].chars().next_back();
        let after = path[idx + name.len()..].chars().next();
        is_sep(before) && is_sep(after)
    })
}

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/sut-harness/`
/// - macOS: `~/Library/Application Support/sut-harness/`
/// - Windows: `%APPDATA%\sut-harness\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the harness settings file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
