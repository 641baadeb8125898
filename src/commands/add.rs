use std::path::Path;

use colored::Colorize;
use tracing::info;

use crate::catalog::{self, CatalogRecord, Tool};
use crate::config::Config;
use crate::ingest;
use crate::manifest;
use crate::prompt;
use crate::scan;

pub(super) fn run_add(
    cwd: &Path,
    config: &Config,
    project_flag: Option<String>,
    tool_flag: Option<String>,
) -> anyhow::Result<()> {
    // Script-URL tools were never implemented upstream of the catalog;
    // reject them before fetching anything.
    if let Some(spec) = tool_flag.as_deref()
        && spec.starts_with("http")
    {
        anyhow::bail!("script-URL tools are not supported");
    }

    let records = catalog::fetch_catalog(config)?;
    let record = match tool_flag {
        Some(id) => catalog::find_by_id(&records, &id)
            .ok_or_else(|| anyhow::anyhow!("tool '{id}' was not found in the catalog"))?
            .clone(),
        None => select_tool(&records)?,
    };

    let tool = record.classify()?;
    info!(tool = %record.id, "adding tool");

    match tool {
        Tool::Crate { package, git } => {
            let project = super::resolve_project(cwd, project_flag)?;
            match git {
                Some(git) => manifest::add_git_dependency(
                    config,
                    &package,
                    &project.path,
                    &git.url,
                    git.branch.as_deref(),
                )?,
                None => manifest::add_dependency(config, &package, &project.path)?,
            }
            println!(
                "{}",
                format!(
                    "Added {} to {}",
                    record.name,
                    project.package_name.as_deref().unwrap_or("the project")
                )
                .green()
            );
        }
        Tool::Asset(source) => {
            let root = scan::find_godot_root(cwd)?;
            ingest::install(config, &record.id, &source, &root)?;
            println!(
                "{}",
                format!("Added {} to {}", record.name, root.display()).green()
            );
        }
        Tool::UrlScript { .. } => anyhow::bail!("script-URL tools are not supported"),
    }

    Ok(())
}

fn select_tool(records: &[CatalogRecord]) -> anyhow::Result<CatalogRecord> {
    if records.is_empty() {
        anyhow::bail!("the tool catalog is empty");
    }
    let mut sorted: Vec<&CatalogRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    let labels: Vec<&str> = sorted.iter().map(|record| record.name.as_str()).collect();
    let index = prompt::select("Which tool would you like to add?", &labels)?;
    Ok(sorted[index].clone())
}
