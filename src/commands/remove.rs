use std::path::Path;

use colored::Colorize;
use tracing::info;

use crate::catalog::{self, CatalogRecord, Tool};
use crate::config::Config;
use crate::manifest;
use crate::prompt;

pub(super) fn run_remove(
    cwd: &Path,
    config: &Config,
    project_flag: Option<String>,
) -> anyhow::Result<()> {
    let project = super::resolve_project(cwd, project_flag)?;
    let project_name = project
        .package_name
        .clone()
        .unwrap_or_else(|| project.path.display().to_string());

    let records = catalog::fetch_catalog(config)?;
    let known: Vec<&CatalogRecord> = project
        .dependencies
        .keys()
        .filter_map(|dep| catalog::match_dependency(&records, dep))
        .collect();
    if known.is_empty() {
        anyhow::bail!("no catalog-known dependencies found in package '{project_name}'");
    }

    let labels: Vec<&str> = known.iter().map(|record| record.name.as_str()).collect();
    let index = prompt::select("Which dependency would you like to remove?", &labels)?;
    let record = known[index];

    match record.classify()? {
        Tool::Crate { package, .. } => {
            info!(tool = %record.id, package = %package, "removing dependency");
            manifest::remove_dependency(config, &package, &project.path)?;
            println!(
                "{}",
                format!("Removed {} from {project_name}", record.name).green()
            );
            Ok(())
        }
        _ => anyhow::bail!(
            "tool '{}' is not a crate dependency and cannot be removed from a manifest",
            record.id
        ),
    }
}
