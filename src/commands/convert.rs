use std::path::Path;

use colored::Colorize;
use tracing::info;

use crate::config::Config;
use crate::prompt;
use crate::scaffold;
use crate::scan;
use crate::toolchain;

const CONVERT_CHOICES: &[&str] = &[
    "Add a Rust subproject to the current layout",
    "Restructure the project into godot/ and rust/ folders",
];

pub(super) fn run_convert(cwd: &Path, config: &Config) -> anyhow::Result<()> {
    if !toolchain::is_installed(&config.cargo_bin) {
        anyhow::bail!(
            "cargo is not installed; install Rust and Cargo from \
             https://www.rust-lang.org/tools/install before converting a project"
        );
    }
    if !scan::is_godot_project_dir(cwd) {
        anyhow::bail!(
            "no Godot project found in {}; use a directory that contains one or run 'new'",
            cwd.display()
        );
    }

    println!("{}", "Found project file!".green());
    let default_name = cwd
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let name = prompt::project_name(default_name.as_deref())?;

    let choice = prompt::select("How should the project be converted?", CONVERT_CHOICES)?;
    if choice == 0 {
        add_in_place(cwd, config, &name)
    } else {
        restructure(cwd, config, &name)
    }
}

fn add_in_place(root: &Path, config: &Config, name: &str) -> anyhow::Result<()> {
    info!(project = %name, "adding a Rust subproject in place");
    println!("{}", "Adding a Rust subproject to the current directory".cyan());
    scaffold::write_gdextension(root, name, scaffold::RUST_DIR)?;
    scaffold::create_rust_project(config, root, name)?;
    scaffold::write_lib_stub(root)?;
    println!("{}", "Done!".green());
    Ok(())
}

fn restructure(root: &Path, config: &Config, name: &str) -> anyhow::Result<()> {
    println!(
        "{}",
        "Back up your project with version control before proceeding.".yellow()
    );
    if !prompt::confirm("Are you sure you want to continue?", false)? {
        anyhow::bail!("aborted by user");
    }

    info!(project = %name, "restructuring project");
    println!("{}", "Restructuring the project".cyan());
    scaffold::restructure(root, name)?;
    scaffold::write_gdextension(&root.join("godot"), name, "../rust")?;
    scaffold::create_rust_project(config, root, name)?;
    scaffold::write_lib_stub(root)?;
    println!("{}", "Done!".green());
    Ok(())
}
