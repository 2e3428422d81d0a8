use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Episode { season: u64, episode: u64 },
}

impl MediaKind {
    /// Media type as the subtitle service spells it.
    pub fn api_type(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Episode { .. } => "tv",
        }
    }

    /// Season and episode numbers, zero for movies.
    pub fn season_episode(&self) -> (u64, u64) {
        match *self {
            MediaKind::Movie => (0, 0),
            MediaKind::Episode { season, episode } => (season, episode),
        }
    }
}

/// A downloaded movie or episode reported by one of the library managers.
#[derive(Debug, Clone)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub tmdb_id: String,
    pub imdb_id: Option<String>,
    /// Display name, e.g. `Title (2020)` or `Show - S01E03`.
    pub title: String,
    pub has_file: bool,
    pub local_folder: Option<PathBuf>,
    pub video_relative_path: Option<String>,
    pub release_group: Option<String>,
}

impl MediaItem {
    pub fn key(&self) -> ItemKey {
        ItemKey::for_item(self)
    }

    /// Release group, with blank values treated as unknown.
    pub fn known_release_group(&self) -> Option<&str> {
        self.release_group
            .as_deref()
            .filter(|group| !group.trim().is_empty())
    }

    pub fn video_path(&self) -> Option<PathBuf> {
        let folder = self.local_folder.as_ref()?;
        let relative = self.video_relative_path.as_ref()?;
        Some(folder.join(relative))
    }
}

/// Ledger identity of a media item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn for_item(item: &MediaItem) -> Self {
        match item.kind {
            MediaKind::Movie => ItemKey(format!("movie:{}", item.tmdb_id)),
            MediaKind::Episode { season, episode } => {
                ItemKey(format!("tv:{}:{}:{}", item.tmdb_id, season, episode))
            }
        }
    }

    /// Rebuilds a key from a stored ledger line.
    pub fn from_stored(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            None
        } else {
            Some(ItemKey(line.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSubtitleMatch {
    pub file_path: PathBuf,
    pub hearing_impaired: bool,
}

#[derive(Debug, Clone)]
pub struct RemoteSubtitleRecord {
    pub release_names: Vec<String>,
    pub raw: Value,
}

impl RemoteSubtitleRecord {
    /// Case-insensitive substring match of `group` against every release name.
    pub fn mentions_release_group(&self, group: &str) -> bool {
        let group = group.to_lowercase();
        self.release_names
            .iter()
            .any(|name| name.to_lowercase().contains(&group))
    }
}
