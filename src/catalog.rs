use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::config::Config;

/// One raw record of the remote tool catalog. The wire format is
/// duck-typed: `source` and `options` are interpreted according to `kind`,
/// and [`CatalogRecord::classify`] turns a record into the tagged [`Tool`]
/// union before anything acts on it.
#[derive(Clone, Debug, Deserialize)]
pub struct CatalogRecord {
    pub name: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub options: Option<RecordOptions>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RecordOptions {
    #[serde(default)]
    pub git: Option<GitOptions>,
    #[serde(default)]
    pub asset: Option<PageOptions>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GitOptions {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub asset: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageOptions {
    #[serde(default)]
    pub page: Option<String>,
}

/// A catalog record with its kind-specific fields resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tool {
    Crate {
        package: String,
        git: Option<CrateGit>,
    },
    UrlScript {
        url: String,
    },
    Asset(AssetSource),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrateGit {
    pub url: String,
    pub branch: Option<String>,
}

/// Where a binary asset archive comes from. Exactly one variant applies to
/// any given tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetSource {
    GitRelease {
        owner: String,
        repo: String,
        asset_name: String,
    },
    AssetPage {
        page: String,
    },
}

/// Fetches the remote tool catalog. Nothing is cached and nothing is
/// retried; a failed fetch surfaces directly to the caller.
pub fn fetch_catalog(config: &Config) -> anyhow::Result<Vec<CatalogRecord>> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(format!("gdkit/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(60))
        .build()
        .context("failed to build HTTP client for catalog fetch")?;

    let response = client
        .get(&config.catalog_url)
        .send()
        .with_context(|| format!("failed to fetch tool catalog from {}", config.catalog_url))?
        .error_for_status()
        .with_context(|| format!("tool catalog request failed for {}", config.catalog_url))?;

    response
        .json::<Vec<CatalogRecord>>()
        .with_context(|| format!("failed to parse tool catalog JSON from {}", config.catalog_url))
}

pub fn find_by_id<'a>(records: &'a [CatalogRecord], id: &str) -> Option<&'a CatalogRecord> {
    records.iter().find(|record| record.id == id)
}

/// Matches a manifest dependency name against the catalog: by `id` first,
/// then by a crate-kind record's `source`, because manifests record the
/// crate name while the catalog may key a tool by a separate logical id.
pub fn match_dependency<'a>(
    records: &'a [CatalogRecord],
    dep_name: &str,
) -> Option<&'a CatalogRecord> {
    records
        .iter()
        .find(|record| record.id == dep_name)
        .or_else(|| {
            records
                .iter()
                .find(|record| record.kind == "crate" && record.source.as_deref() == Some(dep_name))
        })
}

impl CatalogRecord {
    pub fn classify(&self) -> anyhow::Result<Tool> {
        match self.kind.as_str() {
            "crate" => {
                let package = self.source.clone().ok_or_else(|| {
                    anyhow::anyhow!("catalog entry '{}' names no crate source", self.id)
                })?;
                let git = self
                    .options
                    .as_ref()
                    .and_then(|options| options.git.as_ref())
                    .and_then(|git| {
                        git.url.clone().map(|url| CrateGit {
                            url,
                            branch: git.branch.clone(),
                        })
                    });
                Ok(Tool::Crate { package, git })
            }
            "url" => {
                let url = self.source.clone().ok_or_else(|| {
                    anyhow::anyhow!("catalog entry '{}' names no script URL", self.id)
                })?;
                Ok(Tool::UrlScript { url })
            }
            "asset" => self.classify_asset(),
            other => anyhow::bail!("catalog entry '{}' has unknown type '{other}'", self.id),
        }
    }

    fn classify_asset(&self) -> anyhow::Result<Tool> {
        let options = self.options.clone().unwrap_or_default();

        // Git coordinates win when both sub-records are populated.
        if let Some(git) = options.git {
            if let (Some(owner), Some(repo)) = (git.owner.clone(), git.repo.clone()) {
                let asset_name = git.asset.ok_or_else(|| {
                    anyhow::anyhow!(
                        "catalog entry '{}' names a release repository but no asset file name",
                        self.id
                    )
                })?;
                return Ok(Tool::Asset(AssetSource::GitRelease {
                    owner,
                    repo,
                    asset_name,
                }));
            }
        }

        if let Some(page) = options.asset.and_then(|asset| asset.page) {
            return Ok(Tool::Asset(AssetSource::AssetPage { page }));
        }

        anyhow::bail!(
            "catalog entry '{}' has neither release coordinates nor an asset page",
            self.id
        )
    }
}
