//! Asset archive ingestion: resolve a download URL for a tool, fetch the
//! archive, stream-extract it next to the project, relocate `addons`
//! directories into the project's add-ons folder, merge loose root files,
//! and clean the temporary state up again.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::catalog::AssetSource;
use crate::config::Config;
use crate::scan;

const ADDONS_DIR: &str = "addons";

#[derive(Debug, Deserialize)]
struct ReleaseMetadata {
    assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct ReleaseAsset {
    name: String,
    browser_download_url: String,
}

/// The ephemeral state of one ingestion run: the downloaded archive and the
/// extraction folder, both named after the tool id and placed under the
/// project root. Artifacts are removed explicitly on the success path and
/// best-effort on every other exit path when the value drops.
#[derive(Debug)]
pub struct IngestWorkspace {
    pub archive: PathBuf,
    pub extract_dir: PathBuf,
    cleaned: bool,
}

impl IngestWorkspace {
    fn new(root: &Path, tool_id: &str) -> Self {
        Self {
            archive: root.join(format!("{tool_id}.tmp.zip")),
            extract_dir: root.join(format!("{tool_id}.tmp")),
            cleaned: false,
        }
    }

    /// Removes the archive and the extraction folder. Failures are logged,
    /// not escalated.
    pub fn cleanup(mut self) {
        if let Err(err) = self.remove_artifacts() {
            warn!(error = %err, "failed to remove ingestion artifacts");
        }
        self.cleaned = true;
    }

    fn remove_artifacts(&self) -> io::Result<()> {
        if self.archive.exists() {
            fs::remove_file(&self.archive)?;
        }
        if self.extract_dir.exists() {
            fs::remove_dir_all(&self.extract_dir)?;
        }
        Ok(())
    }
}

impl Drop for IngestWorkspace {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        if let Err(err) = self.remove_artifacts() {
            warn!(error = %err, "failed to remove ingestion artifacts");
        }
    }
}

/// Runs the full pipeline for one asset tool against a project root.
pub fn install(
    config: &Config,
    tool_id: &str,
    source: &AssetSource,
    project_root: &Path,
) -> anyhow::Result<()> {
    let Some(url) = resolve_download_url(config, source) else {
        anyhow::bail!("could not resolve a download URL for tool '{tool_id}'");
    };
    debug!(tool_id, url, "resolved asset download URL");

    let Some(workspace) = download(&url, tool_id, project_root)? else {
        anyhow::bail!("downloading '{url}' produced no archive; not extracting");
    };

    extract(&workspace.archive, &workspace.extract_dir)?;
    merge_into_project(&workspace.extract_dir, project_root)?;
    workspace.cleanup();
    Ok(())
}

/// Resolves the archive URL for an asset source. Failures at this stage --
/// an unreachable host, a non-success status, no matching asset or link --
/// all collapse to `None`; the caller decides whether that is fatal.
pub fn resolve_download_url(config: &Config, source: &AssetSource) -> Option<String> {
    match source {
        AssetSource::GitRelease {
            owner,
            repo,
            asset_name,
        } => {
            let url = format!(
                "{}/repos/{owner}/{repo}/releases/latest",
                config.github_api_url.trim_end_matches('/')
            );
            let release = match fetch_release_metadata(&url) {
                Ok(release) => release,
                Err(err) => {
                    warn!(url = %url, error = %err, "latest-release query failed");
                    return None;
                }
            };
            pick_release_asset(&release.assets, asset_name)
        }
        AssetSource::AssetPage { page } => {
            let html = match fetch_text(page) {
                Ok(html) => html,
                Err(err) => {
                    warn!(page = %page, error = %err, "asset page fetch failed");
                    return None;
                }
            };
            first_zip_href(&html)
        }
    }
}

fn fetch_release_metadata(url: &str) -> anyhow::Result<ReleaseMetadata> {
    let client = http_client()?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("failed to fetch release metadata from {url}"))?
        .error_for_status()
        .with_context(|| format!("latest release request failed for {url}"))?;

    response
        .json::<ReleaseMetadata>()
        .with_context(|| format!("failed to parse release metadata from {url}"))
}

fn fetch_text(url: &str) -> anyhow::Result<String> {
    let client = http_client()?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("request failed for {url}"))?;

    response
        .text()
        .with_context(|| format!("failed to read text payload from {url}"))
}

fn http_client() -> anyhow::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(format!("gdkit/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(60))
        .build()
        .context("failed to build HTTP client for asset download")
}

fn pick_release_asset(assets: &[ReleaseAsset], wanted: &str) -> Option<String> {
    assets
        .iter()
        .find(|asset| asset.name == wanted)
        .map(|asset| asset.browser_download_url.clone())
}

/// Scans HTML for the first `href="...zip"` target in document order.
/// Pages listing several zips resolve to the first one.
fn first_zip_href(html: &str) -> Option<String> {
    let mut rest = html;
    while let Some(start) = rest.find("href=\"") {
        let tail = &rest[start + 6..];
        let end = tail.find('"')?;
        let target = &tail[..end];
        if target.ends_with(".zip") {
            return Some(target.to_string());
        }
        rest = &tail[end..];
    }
    None
}

/// Downloads the archive into `<work_root>/<tool_id>.tmp.zip`.
///
/// The URL scheme is checked before any network call. A non-success HTTP
/// status is fatal; a transport-level failure yields `Ok(None)` so the
/// caller can detect that no file was produced and skip extraction.
pub fn download(
    url: &str,
    tool_id: &str,
    work_root: &Path,
) -> anyhow::Result<Option<IngestWorkspace>> {
    if !url.starts_with("http") {
        anyhow::bail!("refusing to download tool '{tool_id}' from non-http URL: {url}");
    }

    let client = http_client()?;
    let response = match client.get(url).send() {
        Ok(response) => response,
        Err(err) => {
            warn!(url, error = %err, "asset download failed before a response arrived");
            return Ok(None);
        }
    };
    let response = response
        .error_for_status()
        .with_context(|| format!("asset download request failed for {url}"))?;
    let bytes = match response.bytes() {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(url, error = %err, "asset download body could not be read");
            return Ok(None);
        }
    };

    let workspace = IngestWorkspace::new(work_root, tool_id);
    fs::write(&workspace.archive, &bytes).with_context(|| {
        format!(
            "failed to persist downloaded archive at {}",
            workspace.archive.display()
        )
    })?;
    Ok(Some(workspace))
}

/// Streams the zip entries to disk under `extract_dir`, strictly in archive
/// order and one at a time, so memory stays bounded and directory creation
/// never races itself.
pub fn extract(archive_path: &Path, extract_dir: &Path) -> anyhow::Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("failed to open archive {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("failed to read zip archive {}", archive_path.display()))?;

    fs::create_dir_all(extract_dir).with_context(|| {
        format!(
            "failed to create extraction folder {}",
            extract_dir.display()
        )
    })?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .with_context(|| format!("failed to read zip entry #{index}"))?;
        let raw_name = entry.name().replace('\\', "/");
        let Some(relative) = sanitize_entry_path(&raw_name) else {
            anyhow::bail!("zip entry escapes the extraction root: {raw_name}");
        };
        let target = extract_dir.join(&relative);

        if raw_name.ends_with('/') {
            fs::create_dir_all(&target)
                .with_context(|| format!("failed to create directory {}", target.display()))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let mut out = File::create(&target)
            .with_context(|| format!("failed to create {}", target.display()))?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("failed to extract {}", target.display()))?;
    }

    Ok(())
}

fn sanitize_entry_path(raw: &str) -> Option<PathBuf> {
    let mut sanitized = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => sanitized.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if sanitized.as_os_str().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Relocates every extracted `addons` directory into the project's add-ons
/// folder, then copies the loose files sitting at the extraction root to
/// the project root. Files nested under other directories are intentionally
/// left behind; archives that bury loose files lose them.
fn merge_into_project(extract_dir: &Path, project_root: &Path) -> anyhow::Result<()> {
    let addons_root = project_root.join(ADDONS_DIR);
    let found = scan::find_addon_dirs(extract_dir);
    debug!(count = found.len(), "relocating extracted addon directories");
    for dir in &found {
        copy_dir_contents(dir, &addons_root)?;
    }

    for entry in fs::read_dir(extract_dir)
        .with_context(|| format!("failed to list extraction root {}", extract_dir.display()))?
    {
        let entry = entry.with_context(|| {
            format!(
                "failed to read entry from extraction root {}",
                extract_dir.display()
            )
        })?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to inspect {}", entry.path().display()))?;
        if file_type.is_dir() {
            continue;
        }
        let destination = project_root.join(entry.file_name());
        fs::copy(entry.path(), &destination)
            .with_context(|| format!("failed to copy {}", destination.display()))?;
    }

    Ok(())
}

/// Recursive merge copy: directories are created as needed, same-named
/// destination files are overwritten.
fn copy_dir_contents(source: &Path, destination: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(destination)
        .with_context(|| format!("failed to create directory {}", destination.display()))?;

    for entry in fs::read_dir(source)
        .with_context(|| format!("failed to list directory {}", source.display()))?
    {
        let entry =
            entry.with_context(|| format!("failed to read entry from {}", source.display()))?;
        let target = destination.join(entry.file_name());
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to inspect {}", entry.path().display()))?;
        if file_type.is_dir() {
            copy_dir_contents(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("failed to copy {}", target.display()))?;
        }
    }

    Ok(())
}
