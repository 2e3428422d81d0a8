use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::infra::ledger::DEFAULT_LEDGER_FILE;
use crate::infra::throttle::CourtesyDelay;
use crate::workflows::pipeline::AutoUpload;

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_DELAY_MIN_SECS: f64 = 5.0;
const DEFAULT_DELAY_MAX_SECS: f64 = 10.0;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    radarr_url: Option<String>,
    radarr_api_key: Option<String>,
    radarr_base_paths: Option<String>,
    sonarr_url: Option<String>,
    sonarr_api_key: Option<String>,
    sonarr_base_paths: Option<String>,
    subdl_search_key: Option<String>,
    subdl_upload_token: Option<String>,
    language: Option<String>,
    always_upload_movie: Option<bool>,
    always_upload_tv: Option<bool>,
    ledger_path: Option<PathBuf>,
    delay_min_secs: Option<f64>,
    delay_max_secs: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ArrSettings {
    pub url: String,
    pub api_key: String,
    pub base_paths: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct Settings {
    pub radarr: ArrSettings,
    pub sonarr: ArrSettings,
    pub subdl_search_key: String,
    pub subdl_upload_token: String,
    pub language: String,
    pub auto_upload: AutoUpload,
    pub ledger_path: PathBuf,
    pub delay: CourtesyDelay,
}

/// Resolves settings from the command line, the environment and the config file,
/// in that order of precedence.
pub fn load(cli: &Cli) -> Result<Settings> {
    let file = match &cli.config {
        Some(path) => read_config_file(path)?
            .with_context(|| format!("Config file not found: {}", path.display()))?,
        None => read_config_file(&get_config_path())?.unwrap_or_default(),
    };
    resolve(cli, |key| env::var(key).ok(), file)
}

fn read_config_file(path: &Path) -> Result<Option<ConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(Some(config))
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("arr-subdl-sync"))
        // If the standard path could not be found (e.g.`$HOME` is not set),
        // default to the current directory.
        .unwrap_or_default()
}

fn get_config_path() -> PathBuf {
    get_config_dir_path().join("config.toml")
}

pub fn split_base_paths(list: &str) -> Vec<PathBuf> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn resolve(cli: &Cli, env: impl Fn(&str) -> Option<String>, file: ConfigFile) -> Result<Settings> {
    let mut missing = Vec::new();
    let mut require = |flag: &Option<String>, key: &str, from_file: Option<String>| -> String {
        let value = non_empty(flag.clone())
            .or_else(|| non_empty(env(key)))
            .or_else(|| non_empty(from_file));
        value.unwrap_or_else(|| {
            missing.push(format!(
                "--{} (or {key}, or {} in the config file)",
                key.to_lowercase().replace('_', "-"),
                key.to_lowercase()
            ));
            String::new()
        })
    };

    let radarr = ArrSettings {
        url: require(&cli.radarr_url, "RADARR_URL", file.radarr_url),
        api_key: require(&cli.radarr_api_key, "RADARR_API_KEY", file.radarr_api_key),
        base_paths: split_base_paths(&require(
            &cli.radarr_base_paths,
            "RADARR_BASE_PATHS",
            file.radarr_base_paths,
        )),
    };
    let sonarr = ArrSettings {
        url: require(&cli.sonarr_url, "SONARR_URL", file.sonarr_url),
        api_key: require(&cli.sonarr_api_key, "SONARR_API_KEY", file.sonarr_api_key),
        base_paths: split_base_paths(&require(
            &cli.sonarr_base_paths,
            "SONARR_BASE_PATHS",
            file.sonarr_base_paths,
        )),
    };
    let subdl_search_key = require(
        &cli.subdl_search_key,
        "SUBDL_SEARCH_KEY",
        file.subdl_search_key,
    );
    let subdl_upload_token = require(
        &cli.subdl_upload_token,
        "SUBDL_UPLOAD_TOKEN",
        file.subdl_upload_token,
    );

    if !missing.is_empty() {
        bail!("Missing required settings:\n  {}", missing.join("\n  "));
    }

    let language = non_empty(cli.language.clone())
        .or_else(|| non_empty(env("SUBDL_LANGUAGE")))
        .or_else(|| non_empty(file.language))
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let auto_upload = AutoUpload {
        movies: cli.always_upload_movie || file.always_upload_movie.unwrap_or(false),
        episodes: cli.always_upload_tv || file.always_upload_tv.unwrap_or(false),
    };

    let ledger_path = cli
        .ledger
        .clone()
        .or(file.ledger_path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_FILE));

    let delay = courtesy_delay(
        file.delay_min_secs.unwrap_or(DEFAULT_DELAY_MIN_SECS),
        file.delay_max_secs.unwrap_or(DEFAULT_DELAY_MAX_SECS),
    )?;

    Ok(Settings {
        radarr,
        sonarr,
        subdl_search_key,
        subdl_upload_token,
        language,
        auto_upload,
        ledger_path,
        delay,
    })
}

fn courtesy_delay(min_secs: f64, max_secs: f64) -> Result<CourtesyDelay> {
    let valid = |s: f64| s.is_finite() && s >= 0.0;
    if !valid(min_secs) || !valid(max_secs) || min_secs > max_secs {
        bail!("Invalid delay range: {min_secs}..{max_secs} seconds");
    }
    Ok(CourtesyDelay::new(
        Duration::from_secs_f64(min_secs),
        Duration::from_secs_f64(max_secs),
    ))
}
