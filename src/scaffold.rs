//! Creates the on-disk skeleton of a Godot + Rust project: the engine
//! project stub, the GDExtension descriptor, the native subproject, and the
//! entry-point source stub.

use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use toml_edit::DocumentMut;
use tracing::info;

use crate::config::Config;
use crate::manifest;
use crate::toolchain;

pub const RUST_DIR: &str = "rust";
const GDEXTENSION_FILE: &str = "rust.gdextension";
const GODOT_PROJECT_FILE: &str = "project.godot";

const LIB_STUB: &str = r#"use godot::prelude::*;

struct RustExtension;

#[gdextension]
unsafe impl ExtensionLibrary for RustExtension {}
"#;

const GITIGNORE: &str = "target/\n.godot/\n";

/// Cargo.toml sections appended to the generated native subproject: the
/// cdylib crate type the engine loads, plus the usual fast-dev profile.
const CARGO_EXTENSION_SECTIONS: &str = r#"
[lib]
crate-type = ["cdylib"]

[profile.dev]
opt-level = 0

[profile.dev.package."*"]
opt-level = 3
"#;

/// Renders the GDExtension descriptor with library paths for the eight
/// supported platform/build/architecture combinations.
fn gdextension_contents(project_name: &str, rust_dir: &str) -> String {
    format!(
        r#"[configuration]
entry_symbol = "gdext_rust_init"
compatibility_minimum = 4.1
reloadable = true

[libraries]
linux.debug.x86_64 =     "res://{rust_dir}/target/debug/lib{project_name}.so"
linux.release.x86_64 =   "res://{rust_dir}/target/release/lib{project_name}.so"
windows.debug.x86_64 =   "res://{rust_dir}/target/debug/{project_name}.dll"
windows.release.x86_64 = "res://{rust_dir}/target/release/{project_name}.dll"
macos.debug =            "res://{rust_dir}/target/debug/lib{project_name}.dylib"
macos.release =          "res://{rust_dir}/target/release/lib{project_name}.dylib"
macos.debug.arm64 =      "res://{rust_dir}/target/debug/lib{project_name}.dylib"
macos.release.arm64 =    "res://{rust_dir}/target/release/lib{project_name}.dylib"
"#
    )
}

/// Writes the empty engine project marker, creating the directory first.
pub fn create_godot_stub(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create project directory {}", dir.display()))?;
    let marker = dir.join(GODOT_PROJECT_FILE);
    fs::write(&marker, "").with_context(|| format!("failed to write {}", marker.display()))
}

/// Writes the GDExtension descriptor into `dir`. `rust_dir` is the path of
/// the native subproject relative to the descriptor's location.
pub fn write_gdextension(dir: &Path, project_name: &str, rust_dir: &str) -> anyhow::Result<()> {
    let path = dir.join(GDEXTENSION_FILE);
    println!("{}", format!("Creating GDExtension descriptor: {GDEXTENSION_FILE}").cyan());
    fs::write(&path, gdextension_contents(project_name, rust_dir))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Scaffolds the native subproject under `<parent>/rust`: generates a
/// library crate, renames it after the project so the built artifact
/// matches the descriptor, appends the extension manifest settings, adds
/// the engine binding, and runs a first build.
pub fn create_rust_project(
    config: &Config,
    parent: &Path,
    project_name: &str,
) -> anyhow::Result<()> {
    println!(
        "{}",
        format!("Creating Rust subproject \"{project_name}/{RUST_DIR}\"").cyan()
    );
    toolchain::run(
        &config.cargo_bin,
        &["new", RUST_DIR, "--vcs", "none", "--lib"],
        parent,
    )?;

    let rust_root = parent.join(RUST_DIR);
    manifest::rename_package(project_name, &rust_root)?;
    apply_extension_manifest_settings(&rust_root)?;

    println!("{}", "Adding the godot crate".cyan());
    toolchain::run(&config.cargo_bin, &["add", "godot"], &rust_root)?;
    println!("{}", "Building the Rust subproject".cyan());
    toolchain::run(&config.cargo_bin, &["build"], &rust_root)?;
    Ok(())
}

/// Sets `resolver = "2"` on the generated package and appends the cdylib
/// and profile sections, preserving whatever cargo generated around them.
fn apply_extension_manifest_settings(rust_root: &Path) -> anyhow::Result<()> {
    let path = rust_root.join("Cargo.toml");
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let mut doc: DocumentMut = raw
        .parse()
        .with_context(|| format!("failed to parse manifest {}", path.display()))?;
    doc["package"]["resolver"] = toml_edit::value("2");

    let mut contents = doc.to_string();
    contents.push_str(CARGO_EXTENSION_SECTIONS);
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Replaces the generated `lib.rs` with the extension entry-point stub.
pub fn write_lib_stub(root: &Path) -> anyhow::Result<()> {
    let path = root.join(RUST_DIR).join("src").join("lib.rs");
    fs::write(&path, LIB_STUB).with_context(|| format!("failed to write {}", path.display()))
}

/// Initializes a git repository at the project root with an ignore file
/// covering build output and engine state.
pub fn init_git_repo(root: &Path) -> anyhow::Result<()> {
    println!("{}", "Initializing git repository".cyan());
    toolchain::run(toolchain::GIT_BIN, &["init"], root)?;
    let ignore = root.join(".gitignore");
    fs::write(&ignore, GITIGNORE).with_context(|| format!("failed to write {}", ignore.display()))
}

/// Moves every entry of the project root (the hidden engine state directory
/// included) into a staging folder, then renames it to `<root>/godot`.
pub fn restructure(root: &Path, project_name: &str) -> anyhow::Result<()> {
    let staging = root.join(format!(".tmp-{project_name}"));
    fs::create_dir(&staging)
        .with_context(|| format!("failed to create staging folder {}", staging.display()))?;
    info!(staging = %staging.display(), "moving project contents to staging folder");

    let entries: Vec<_> = fs::read_dir(root)
        .with_context(|| format!("failed to list project root {}", root.display()))?
        .collect::<Result<_, _>>()
        .with_context(|| format!("failed to read entries of {}", root.display()))?;

    for entry in entries {
        if entry.path() == staging {
            continue;
        }
        let destination = staging.join(entry.file_name());
        fs::rename(entry.path(), &destination).with_context(|| {
            format!(
                "failed to move {} into {}",
                entry.path().display(),
                staging.display()
            )
        })?;
    }

    let godot_dir = root.join("godot");
    fs::rename(&staging, &godot_dir).with_context(|| {
        format!(
            "failed to move staged contents into {}",
            godot_dir.display()
        )
    })
}

/// Printed when the engine editor is not launched after scaffolding.
pub fn post_create_instructions(project_file: &Path) {
    println!(
        "{}",
        "\nFinish the creation process in the Godot editor:".cyan()
    );
    println!("{}", "  1. Open Godot".cyan());
    println!("{}", "  2. Click on \"Import\"".cyan());
    println!(
        "  {} {}",
        "3. Select the file".cyan(),
        project_file.display().to_string().green()
    );
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn descriptor_lists_all_eight_platform_entries() {
        let contents = gdextension_contents("platformer", "../rust");
        for key in [
            "linux.debug.x86_64",
            "linux.release.x86_64",
            "windows.debug.x86_64",
            "windows.release.x86_64",
            "macos.debug ",
            "macos.release ",
            "macos.debug.arm64",
            "macos.release.arm64",
        ] {
            assert!(contents.contains(key), "missing entry {key}");
        }
        assert!(contents.contains("res://../rust/target/debug/libplatformer.so"));
        assert!(contents.contains("res://../rust/target/release/platformer.dll"));
        assert!(contents.contains("entry_symbol = \"gdext_rust_init\""));
    }

    #[test]
    fn godot_stub_is_an_empty_marker_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("game/godot");
        create_godot_stub(&dir).expect("stub");

        let marker = dir.join(GODOT_PROJECT_FILE);
        assert!(marker.is_file());
        assert_eq!(fs::read_to_string(marker).expect("read"), "");
    }

    #[test]
    fn manifest_settings_set_resolver_and_append_sections() {
        let temp = tempfile::tempdir().expect("tempdir");
        let rust_root = temp.path().join(RUST_DIR);
        fs::create_dir_all(&rust_root).expect("mkdir");
        fs::write(
            rust_root.join("Cargo.toml"),
            "[package]\nname = \"rust\"\nversion = \"0.1.0\"\nedition = \"2024\"\n\n[dependencies]\n",
        )
        .expect("write");

        apply_extension_manifest_settings(&rust_root).expect("apply");
        let raw = fs::read_to_string(rust_root.join("Cargo.toml")).expect("read");
        assert!(raw.contains("resolver = \"2\""));
        assert!(raw.contains("crate-type = [\"cdylib\"]"));
        assert!(raw.contains("[profile.dev.package.\"*\"]"));
        assert!(raw.contains("name = \"rust\""));
    }

    #[test]
    fn restructure_moves_everything_including_hidden_state() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(GODOT_PROJECT_FILE), "").expect("write");
        fs::create_dir_all(temp.path().join(".godot/imported")).expect("mkdir");
        fs::create_dir_all(temp.path().join("scenes")).expect("mkdir");
        fs::write(temp.path().join("scenes/main.tscn"), "[node]").expect("write");

        restructure(temp.path(), "platformer").expect("restructure");

        assert!(temp.path().join("godot").join(GODOT_PROJECT_FILE).is_file());
        assert!(temp.path().join("godot/.godot/imported").is_dir());
        assert!(temp.path().join("godot/scenes/main.tscn").is_file());
        assert!(!temp.path().join(GODOT_PROJECT_FILE).exists());
        assert!(!temp.path().join(".tmp-platformer").exists());
    }

    #[test]
    fn lib_stub_registers_the_extension_entry_point() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join(RUST_DIR).join("src")).expect("mkdir");
        write_lib_stub(temp.path()).expect("write");

        let stub = fs::read_to_string(temp.path().join("rust/src/lib.rs")).expect("read");
        assert!(stub.contains("#[gdextension]"));
        assert!(stub.contains("impl ExtensionLibrary"));
    }
}
