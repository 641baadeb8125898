use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::GdkitError;

const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/TheColorRed/godot-rust/refs/heads/main/assets/tool-db.json";
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_GODOT_BIN: &str = "godot";
const DEFAULT_CARGO_BIN: &str = "cargo";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub catalog_url: String,
    pub github_api_url: String,
    pub godot_bin: String,
    pub cargo_bin: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct PartialConfig {
    catalog_url: Option<String>,
    github_api_url: Option<String>,
    godot_bin: Option<String>,
    cargo_bin: Option<String>,
}

pub fn load(cwd: &Path) -> Result<Config, GdkitError> {
    let global_path = global_config_path()?;
    let project_path = cwd.join("gdkit.toml");

    let global = load_partial_if_exists(&global_path)?;
    let project = load_partial_if_exists(&project_path)?;
    let env = partial_from_env();

    merge_config(global, project, env)
}

fn global_config_path() -> Result<PathBuf, GdkitError> {
    let config_root = config_root_dir().ok_or(GdkitError::MissingConfigDirectory)?;
    Ok(config_root.join("gdkit").join("config.toml"))
}

fn config_root_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
}

fn load_partial_if_exists(path: &Path) -> Result<PartialConfig, GdkitError> {
    if !path.exists() {
        return Ok(PartialConfig::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| GdkitError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| GdkitError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

fn partial_from_env() -> PartialConfig {
    PartialConfig {
        catalog_url: std::env::var("GDKIT_CATALOG_URL").ok(),
        github_api_url: std::env::var("GDKIT_GITHUB_API_URL").ok(),
        godot_bin: std::env::var("GDKIT_GODOT_BIN").ok(),
        cargo_bin: std::env::var("GDKIT_CARGO_BIN").ok(),
    }
}

fn merge_config(
    global: PartialConfig,
    project: PartialConfig,
    env: PartialConfig,
) -> Result<Config, GdkitError> {
    let catalog_url = env
        .catalog_url
        .or(project.catalog_url)
        .or(global.catalog_url)
        .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
    validate_endpoint("catalog_url", &catalog_url)?;

    let github_api_url = env
        .github_api_url
        .or(project.github_api_url)
        .or(global.github_api_url)
        .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());
    validate_endpoint("github_api_url", &github_api_url)?;

    let godot_bin = env
        .godot_bin
        .or(project.godot_bin)
        .or(global.godot_bin)
        .unwrap_or_else(|| DEFAULT_GODOT_BIN.to_string());

    let cargo_bin = env
        .cargo_bin
        .or(project.cargo_bin)
        .or(global.cargo_bin)
        .unwrap_or_else(|| DEFAULT_CARGO_BIN.to_string());

    Ok(Config {
        catalog_url,
        github_api_url,
        godot_bin,
        cargo_bin,
    })
}

fn validate_endpoint(key: &'static str, value: &str) -> Result<(), GdkitError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(GdkitError::InvalidUrl {
            key,
            value: value.to_string(),
        })
    }
}
