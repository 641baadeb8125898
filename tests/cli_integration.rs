use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd_in(dir: &Path, temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("gdkit");
    let xdg_config = temp.path().join("xdg_config");
    std::fs::create_dir_all(&xdg_config).expect("create config dir");

    // `true` accepts --version, so toolchain probes pass deterministically
    // without depending on the host's cargo installation.
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", &xdg_config)
        .env("GDKIT_CARGO_BIN", "true");

    cmd
}

#[test]
fn help_lists_all_subcommands() {
    let temp = TempDir::new().expect("tempdir");
    cmd_in(temp.path(), &temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("new")
                .and(predicate::str::contains("convert"))
                .and(predicate::str::contains("add"))
                .and(predicate::str::contains("remove")),
        );
}

#[test]
fn new_refuses_a_directory_that_already_holds_a_project() {
    let temp = TempDir::new().expect("tempdir");
    std::fs::write(temp.path().join("project.godot"), "").expect("write marker");

    cmd_in(temp.path(), &temp)
        .arg("new")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("convert"));
}

#[test]
fn convert_requires_an_existing_project() {
    let temp = TempDir::new().expect("tempdir");
    let work = temp.path().join("work");
    std::fs::create_dir_all(&work).expect("mkdir");

    cmd_in(&work, &temp)
        .arg("convert")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no Godot project"));
}

#[test]
fn remove_fails_when_no_packages_exist() {
    let temp = TempDir::new().expect("tempdir");
    let work = temp.path().join("work/inner");
    std::fs::create_dir_all(&work).expect("mkdir");

    cmd_in(&work, &temp)
        .arg("remove")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no Rust packages found"));
}

#[test]
fn remove_fails_for_unknown_project_name() {
    let temp = TempDir::new().expect("tempdir");
    let work = temp.path().join("work");
    std::fs::create_dir_all(work.join("rust")).expect("mkdir");
    std::fs::write(
        work.join("rust/Cargo.toml"),
        "[package]\nname = \"game\"\nversion = \"0.1.0\"\n",
    )
    .expect("write manifest");

    cmd_in(&work, &temp)
        .args(["remove", "-p", "other"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no package named 'other'"));
}

#[test]
fn add_rejects_script_urls_without_touching_the_network() {
    let temp = TempDir::new().expect("tempdir");

    cmd_in(temp.path(), &temp)
        .args(["add", "-t", "https://example.com/install.sh"])
        // An unroutable catalog URL proves the rejection happens first.
        .env("GDKIT_CATALOG_URL", "http://127.0.0.1:1/catalog.json")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("script-URL tools are not supported"));
}

#[test]
fn invalid_catalog_url_is_a_config_error() {
    let temp = TempDir::new().expect("tempdir");

    cmd_in(temp.path(), &temp)
        .args(["add", "-t", "foo"])
        .env("GDKIT_CATALOG_URL", "not-a-url")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configuration"));
}
