use std::path::Path;

use colored::Colorize;
use tracing::info;

use crate::config::Config;
use crate::prompt;
use crate::scaffold;
use crate::scan;
use crate::toolchain;

pub(super) fn run_new(cwd: &Path, config: &Config) -> anyhow::Result<()> {
    if !toolchain::is_installed(&config.cargo_bin) {
        anyhow::bail!(
            "cargo is not installed; install Rust and Cargo from \
             https://www.rust-lang.org/tools/install before creating a project"
        );
    }
    if scan::is_godot_project_dir(cwd) {
        anyhow::bail!(
            "a Godot project already exists in {}; use a different directory or run 'convert'",
            cwd.display()
        );
    }

    let name = prompt::project_name(None)?;
    let project_root = cwd.join(&name);
    if project_root.exists() {
        anyhow::bail!("a folder named '{name}' already exists");
    }

    info!(project = %name, root = %project_root.display(), "creating project");
    println!("{}", "Creating project folder structure".cyan());
    let godot_dir = project_root.join("godot");
    scaffold::create_godot_stub(&godot_dir)?;
    scaffold::write_gdextension(&godot_dir, &name, "../rust")?;
    scaffold::create_rust_project(config, &project_root, &name)?;
    scaffold::write_lib_stub(&project_root)?;
    println!("{}", "Godot Rust project created!".green());

    if toolchain::is_installed(toolchain::GIT_BIN)
        && prompt::confirm("Initialize a git repository?", true)?
    {
        scaffold::init_git_repo(&project_root)?;
    }

    let project_file = godot_dir.join("project.godot");
    if toolchain::is_installed(&config.godot_bin)
        && prompt::confirm("Open the project in Godot?", false)?
    {
        println!(
            "{}",
            format!("Opening the project in Godot: {}", project_file.display()).cyan()
        );
        toolchain::run_detached(&config.godot_bin, &[project_file.as_os_str()])?;
    } else {
        scaffold::post_create_instructions(&project_file);
    }

    Ok(())
}
