use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;
use toml_edit::DocumentMut;
use tracing::debug;

use crate::config::Config;
use crate::toolchain;

const MANIFEST_FILE: &str = "Cargo.toml";

/// In-memory view of one `Cargo.toml`. A manifest acts either as a package
/// or as a workspace root; when a `[workspace]` table is present the package
/// name is treated as absent so the two roles stay mutually exclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    pub path: PathBuf,
    pub package_name: Option<String>,
    pub package_version: Option<String>,
    pub dependencies: BTreeMap<String, String>,
    pub workspace_members: Option<Vec<String>>,
}

impl Manifest {
    pub fn is_workspace_root(&self) -> bool {
        self.workspace_members.is_some()
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    package: Option<RawPackage>,
    #[serde(default)]
    dependencies: Option<BTreeMap<String, toml::Value>>,
    #[serde(default)]
    workspace: Option<RawWorkspace>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPackage {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<toml::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawWorkspace {
    #[serde(default)]
    members: Option<Vec<String>>,
}

pub fn read_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let raw = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: RawManifest = toml::from_str(&raw).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let workspace_members = parsed
        .workspace
        .map(|workspace| workspace.members.unwrap_or_default());

    // Workspace roots are not packages, even if the file carries a
    // [package] table as well.
    let (package_name, package_version) = if workspace_members.is_some() {
        (None, None)
    } else {
        match parsed.package {
            Some(package) => (
                package.name,
                package.version.map(|version| render_spec(&version)),
            ),
            None => (None, None),
        }
    };

    let dependencies = parsed
        .dependencies
        .unwrap_or_default()
        .into_iter()
        .map(|(name, spec)| (name, render_spec(&spec)))
        .collect();

    Ok(Manifest {
        path: path.to_path_buf(),
        package_name,
        package_version,
        dependencies,
        workspace_members,
    })
}

fn render_spec(value: &toml::Value) -> String {
    match value {
        toml::Value::String(spec) => spec.clone(),
        other => other.to_string(),
    }
}

/// Rewrites a whole manifest file from an edited document. There is no
/// partial edit path and no locking; the file is assumed exclusively owned
/// by the running command.
pub fn write_manifest(path: &Path, doc: &DocumentMut) -> anyhow::Result<()> {
    fs::write(path, doc.to_string())
        .with_context(|| format!("failed to write manifest {}", path.display()))
}

/// Returns the first candidate path whose manifest is a workspace root.
pub fn find_workspace_manifest(paths: &[PathBuf]) -> Result<Option<Manifest>, ManifestError> {
    for path in paths {
        let manifest = read_manifest(path)?;
        if manifest.is_workspace_root() {
            return Ok(Some(manifest));
        }
    }
    Ok(None)
}

/// Parses every candidate manifest and maps package name to its record,
/// skipping workspace roots and nameless manifests.
pub fn collect_package_info(paths: &[PathBuf]) -> Result<BTreeMap<String, Manifest>, ManifestError> {
    let mut packages = BTreeMap::new();
    for path in paths {
        let manifest = read_manifest(path)?;
        if let Some(name) = manifest.package_name.clone() {
            packages.insert(name, manifest);
        }
    }
    Ok(packages)
}

/// Adds a registry dependency by shelling to `cargo add` in the package
/// directory.
pub fn add_dependency(config: &Config, name: &str, root: &Path) -> anyhow::Result<()> {
    let dir = package_dir(root);
    debug!(dependency = name, dir = %dir.display(), "adding dependency");
    toolchain::run(&config.cargo_bin, &["add", name], dir)
}

/// Adds a git-sourced dependency. The repository URL is required; the
/// branch is passed through when configured.
pub fn add_git_dependency(
    config: &Config,
    name: &str,
    root: &Path,
    url: &str,
    branch: Option<&str>,
) -> anyhow::Result<()> {
    let dir = package_dir(root);
    debug!(dependency = name, url, dir = %dir.display(), "adding git dependency");
    let mut args = vec!["add", name, "--git", url];
    if let Some(branch) = branch {
        args.push("--branch");
        args.push(branch);
    }
    toolchain::run(&config.cargo_bin, &args, dir)
}

pub fn remove_dependency(config: &Config, name: &str, root: &Path) -> anyhow::Result<()> {
    let dir = package_dir(root);
    debug!(dependency = name, dir = %dir.display(), "removing dependency");
    toolchain::run(&config.cargo_bin, &["remove", name], dir)
}

/// Renames the package in a manifest, preserving the rest of the file.
/// Renaming a workspace root is refused: that is a member-list concern, not
/// a package-name operation.
pub fn rename_package(new_name: &str, root: &Path) -> anyhow::Result<()> {
    let path = manifest_path(root);
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let mut doc: DocumentMut = raw
        .parse()
        .with_context(|| format!("failed to parse manifest {}", path.display()))?;

    if doc.get("workspace").is_some() {
        anyhow::bail!(
            "cannot rename {}: it is a workspace root, not a package",
            path.display()
        );
    }
    let Some(package) = doc.get_mut("package").and_then(|item| item.as_table_mut()) else {
        anyhow::bail!("manifest {} has no [package] table", path.display());
    };
    package.insert("name", toml_edit::value(new_name));

    write_manifest(&path, &doc)
}

/// Accepts either a package directory or a path to its `Cargo.toml`.
fn package_dir(root: &Path) -> &Path {
    if root.file_name().is_some_and(|name| name == MANIFEST_FILE) {
        root.parent().unwrap_or(root)
    } else {
        root
    }
}

fn manifest_path(root: &Path) -> PathBuf {
    if root.file_name().is_some_and(|name| name == MANIFEST_FILE) {
        root.to_path_buf()
    } else {
        root.join(MANIFEST_FILE)
    }
}
