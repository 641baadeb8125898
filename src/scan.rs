use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

const GODOT_PROJECT_FILE: &str = "project.godot";
const MANIFEST_FILE: &str = "Cargo.toml";
const ADDONS_DIR: &str = "addons";

/// Directories that never contain project manifests or markers worth
/// scanning: build output, VCS state, and the engine's import cache.
const SKIP_DIRS: &[&str] = &["target", ".git", ".godot"];

fn is_scannable(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return true;
    }
    entry
        .file_name()
        .to_str()
        .is_none_or(|name| !SKIP_DIRS.contains(&name))
}

/// Finds every `Cargo.toml` under `root`. When the walk comes up empty the
/// search is retried one level up, so a command run from inside the engine
/// subdirectory still finds the sibling native subproject.
pub fn find_manifests(root: &Path) -> Vec<PathBuf> {
    let found = files_named(root, MANIFEST_FILE);
    if found.is_empty()
        && let Some(parent) = root.parent()
    {
        return files_named(parent, MANIFEST_FILE);
    }
    found
}

fn files_named(root: &Path, file_name: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(is_scannable)
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(DirEntry::into_path)
        .collect()
}

pub fn is_godot_project_dir(dir: &Path) -> bool {
    dir.join(GODOT_PROJECT_FILE).is_file()
}

/// Resolves the Godot project root closest to `start`: the directory itself,
/// the parent of the first `project.godot` found beneath it, or the same
/// search repeated from each ancestor directory in turn.
pub fn find_godot_root(start: &Path) -> anyhow::Result<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if is_godot_project_dir(&dir) {
            return Ok(dir);
        }
        if let Some(marker) = files_named(&dir, GODOT_PROJECT_FILE).into_iter().next()
            && let Some(parent) = marker.parent()
        {
            return Ok(parent.to_path_buf());
        }
        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => anyhow::bail!(
                "no Godot project (project.godot) found in or around {}",
                start.display()
            ),
        }
    }
}

/// Collects every directory named `addons` under `root`, at any depth,
/// without descending into a matched directory.
pub fn find_addon_dirs(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    collect_addon_dirs(root, &mut found);
    found
}

fn collect_addon_dirs(dir: &Path, found: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();
    paths.sort();

    for path in paths {
        if !path.is_dir() {
            continue;
        }
        if path.file_name().is_some_and(|name| name == ADDONS_DIR) {
            found.push(path);
        } else {
            collect_addon_dirs(&path, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn finds_manifests_and_skips_build_dirs() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("rust/src")).expect("mkdir");
        fs::create_dir_all(temp.path().join("rust/target/debug")).expect("mkdir");
        fs::write(temp.path().join("rust/Cargo.toml"), "[package]\n").expect("write");
        fs::write(temp.path().join("rust/target/debug/Cargo.toml"), "[package]\n").expect("write");

        let found = find_manifests(temp.path());
        assert_eq!(found, vec![temp.path().join("rust/Cargo.toml")]);
    }

    #[test]
    fn falls_back_to_parent_when_root_has_no_manifest() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("godot")).expect("mkdir");
        fs::create_dir_all(temp.path().join("rust")).expect("mkdir");
        fs::write(temp.path().join("rust/Cargo.toml"), "[package]\n").expect("write");

        let found = find_manifests(&temp.path().join("godot"));
        assert_eq!(found, vec![temp.path().join("rust/Cargo.toml")]);
    }

    #[test]
    fn resolves_godot_root_beneath_and_above() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("game/godot")).expect("mkdir");
        fs::write(temp.path().join("game/godot/project.godot"), "").expect("write");

        let below = find_godot_root(temp.path()).expect("resolve from above");
        assert_eq!(below, temp.path().join("game/godot"));

        fs::create_dir_all(temp.path().join("game/godot/scenes")).expect("mkdir");
        let above = find_godot_root(&temp.path().join("game/godot/scenes")).expect("resolve");
        assert_eq!(above, temp.path().join("game/godot"));
    }

    #[test]
    fn addon_dirs_found_at_multiple_depths_without_descending() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("addons/foo")).expect("mkdir");
        fs::create_dir_all(temp.path().join("bundle/nested/addons/bar")).expect("mkdir");

        let found = find_addon_dirs(temp.path());
        assert_eq!(
            found,
            vec![
                temp.path().join("addons"),
                temp.path().join("bundle/nested/addons"),
            ]
        );
    }
}
