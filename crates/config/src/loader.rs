use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::PrintbotConfig,
};

/// Standard config file names, checked in order. `config.json` is the name
/// older deployments used.
const CONFIG_FILENAMES: &[&str] = &[
    "printbot.toml",
    "printbot.yaml",
    "printbot.yml",
    "printbot.json",
    "config.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<PrintbotConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Load the config from `explicit` when given, otherwise from the first
/// standard location that exists.
///
/// Search order:
/// 1. `./printbot.{toml,yaml,yml,json}`, then `./config.json`
/// 2. `~/.config/printbot/` with the same names
///
/// Unlike most settings, a missing file is an error: the bot cannot start
/// without tokens and printers.
pub fn discover_and_load(explicit: Option<&Path>) -> Result<(PathBuf, PrintbotConfig)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_config_file().ok_or_else(|| Error::NotFound {
            searched: search_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        })?,
    };
    debug!(path = %path.display(), "loading config");
    let config = load_config(&path)?;
    Ok((path, config))
}

/// Returns the user-global config directory (`~/.config/printbot/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "printbot").map(|d| d.config_dir().to_path_buf())
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = CONFIG_FILENAMES.iter().map(PathBuf::from).collect();
    if let Some(dir) = config_dir() {
        paths.extend(CONFIG_FILENAMES.iter().map(|name| dir.join(name)));
    }
    paths
}

fn find_config_file() -> Option<PathBuf> {
    search_paths().into_iter().find(|p| p.exists())
}

fn parse_config(raw: &str, path: &Path) -> Result<PrintbotConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "json" => serde_json::from_str(raw).map_err(|e| Error::parse(path, e)),
        _ => Err(Error::UnsupportedFormat {
            extension: ext.to_string(),
        }),
    }
}
