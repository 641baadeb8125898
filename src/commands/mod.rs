mod add;
mod convert;
mod new;
mod remove;

use std::path::Path;

use crate::cli::Command;
use crate::config::Config;
use crate::manifest::{self, Manifest};
use crate::prompt;
use crate::scan;

pub fn execute(cwd: &Path, config: &Config, command: Command) -> anyhow::Result<()> {
    match command {
        Command::New => new::run_new(cwd, config),
        Command::Convert => convert::run_convert(cwd, config),
        Command::Add { project, tool } => add::run_add(cwd, config, project, tool),
        Command::Remove { project } => remove::run_remove(cwd, config, project),
    }
}

/// Resolves the target Rust package from the `-p` flag, falling back to an
/// interactive selection over every package discovered near `cwd`.
fn resolve_project(cwd: &Path, flag: Option<String>) -> anyhow::Result<Manifest> {
    let manifest_paths = scan::find_manifests(cwd);
    let packages = manifest::collect_package_info(&manifest_paths)?;
    if packages.is_empty() {
        anyhow::bail!(
            "no Rust packages found in {} or its parent directory",
            cwd.display()
        );
    }

    match flag {
        Some(name) => packages.get(&name).cloned().ok_or_else(|| {
            anyhow::anyhow!("no package named '{name}' found near {}", cwd.display())
        }),
        None => {
            let names: Vec<String> = packages.keys().cloned().collect();
            let index = prompt::select("Which package would you like to use?", &names)?;
            Ok(packages[&names[index]].clone())
        }
    }
}
