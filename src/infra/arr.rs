use anyhow::{bail, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::domain::models::{MediaItem, MediaKind};
use crate::media::local::find_local_folder;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrMovie {
    title: Option<String>,
    year: Option<u32>,
    tmdb_id: Option<u64>,
    imdb_id: Option<String>,
    #[serde(default)]
    has_file: bool,
    path: Option<String>,
    movie_file: Option<ArrMediaFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrMediaFile {
    #[serde(default)]
    id: u64,
    relative_path: Option<String>,
    release_group: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrSeries {
    id: u64,
    title: Option<String>,
    path: Option<String>,
    tmdb_id: Option<u64>,
    imdb_id: Option<String>,
    statistics: Option<SeriesStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesStatistics {
    #[serde(default)]
    episode_file_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrEpisode {
    episode_file_id: Option<u64>,
    season_number: Option<u64>,
    episode_number: Option<u64>,
    title: Option<String>,
}

/// Read-only client for the Radarr/Sonarr v3 API.
pub struct ArrClient {
    client: Client,
    name: &'static str,
    base_url: String,
    api_key: String,
}

impl ArrClient {
    pub fn new(name: &'static str, base_url: &str, api_key: String) -> Self {
        Self {
            client: Client::new(),
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn try_get<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self
            .client
            .get(format!("{}/api/v3/{}", self.base_url, resource))
            .header("X-Api-Key", &self.api_key)
            .query(query)
            .send()?;

        if !response.status().is_success() {
            bail!("{} request failed: HTTP {}", self.name, response.status());
        }

        Ok(serde_json::from_str(&response.text()?)?)
    }

    /// Any failure yields an empty list.
    fn get<T: DeserializeOwned>(&self, resource: &str, query: &[(&str, String)]) -> Vec<T> {
        self.try_get(resource, query).unwrap_or_else(|e| {
            warn!("Error fetching {resource} from {} at {}: {e}", self.name, self.base_url);
            Vec::new()
        })
    }

    pub fn movies(&self, base_paths: &[PathBuf]) -> Vec<MediaItem> {
        self.get::<ArrMovie>("movie", &[])
            .into_iter()
            .filter_map(|movie| movie_item(movie, base_paths))
            .collect()
    }

    pub fn episodes(&self, base_paths: &[PathBuf]) -> Vec<MediaItem> {
        let mut items = Vec::new();
        for series in self.get::<ArrSeries>("series", &[]) {
            let file_count = series
                .statistics
                .as_ref()
                .map(|s| s.episode_file_count)
                .unwrap_or(0);
            if file_count == 0 {
                continue;
            }

            let title = series.title.clone().unwrap_or_else(|| "Unknown".to_string());
            let Some(local_folder) = series
                .path
                .as_deref()
                .and_then(|p| find_local_folder(p, base_paths))
            else {
                info!("Could not find local path for '{title}' in base paths. Skipping show.");
                continue;
            };

            let query = [("seriesId", series.id.to_string())];
            let files: Vec<ArrMediaFile> = self.get("episodefile", &query);
            let episodes: Vec<ArrEpisode> = self.get("episode", &query);
            if files.is_empty() {
                info!("Show '{title}' has downloaded files according to stats, but the API returned no details. Skipping.");
                continue;
            }

            items.extend(episode_items(&series, &local_folder, files, episodes));
        }
        items
    }
}

fn known_release_group(group: Option<String>) -> Option<String> {
    group
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
}

fn known_tmdb_id(id: Option<u64>) -> Option<String> {
    id.filter(|id| *id != 0).map(|id| id.to_string())
}

fn movie_item(movie: ArrMovie, base_paths: &[PathBuf]) -> Option<MediaItem> {
    let title = match (movie.title, movie.year) {
        (Some(title), Some(year)) => format!("{title} ({year})"),
        (Some(title), None) => title,
        (None, _) => "Unknown".to_string(),
    };
    let Some(tmdb_id) = known_tmdb_id(movie.tmdb_id) else {
        info!("Skipping '{title}': no TMDB id.");
        return None;
    };
    let local_folder = movie
        .path
        .as_deref()
        .and_then(|p| find_local_folder(p, base_paths));
    let (video_relative_path, release_group) = movie
        .movie_file
        .map(|f| (f.relative_path, known_release_group(f.release_group)))
        .unwrap_or_default();

    Some(MediaItem {
        kind: MediaKind::Movie,
        tmdb_id,
        imdb_id: movie.imdb_id,
        title,
        has_file: movie.has_file,
        local_folder,
        video_relative_path,
        release_group,
    })
}

fn episode_items(
    series: &ArrSeries,
    local_folder: &Path,
    files: Vec<ArrMediaFile>,
    episodes: Vec<ArrEpisode>,
) -> Vec<MediaItem> {
    let series_title = series.title.as_deref().unwrap_or("Unknown");
    let Some(tmdb_id) = known_tmdb_id(series.tmdb_id) else {
        info!("Skipping show '{series_title}': no TMDB id.");
        return Vec::new();
    };

    let mut by_file: HashMap<u64, ArrEpisode> = HashMap::new();
    for episode in episodes {
        if let Some(file_id) = episode.episode_file_id {
            by_file.insert(file_id, episode);
        }
    }

    let mut items = Vec::new();
    for file in files {
        let relative = file.relative_path.clone().unwrap_or_default();
        let Some(episode) = by_file.get(&file.id) else {
            info!("Skipping file because it could not be mapped to an episode: {relative}");
            continue;
        };
        let (Some(season), Some(number)) = (episode.season_number, episode.episode_number) else {
            info!("Skipping file due to missing season/episode number: {relative}");
            continue;
        };

        let episode_title = episode.title.as_deref().unwrap_or("Unknown Title");
        debug!("Mapped {relative} to {series_title} S{season:02}E{number:02} - {episode_title}");

        items.push(MediaItem {
            kind: MediaKind::Episode {
                season,
                episode: number,
            },
            tmdb_id: tmdb_id.clone(),
            imdb_id: series.imdb_id.clone(),
            title: format!("{series_title} - S{season:02}E{number:02}"),
            has_file: true,
            local_folder: Some(local_folder.to_path_buf()),
            video_relative_path: file.relative_path,
            release_group: known_release_group(file.release_group),
        });
    }
    items
}
