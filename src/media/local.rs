use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::models::{LocalSubtitleMatch, MediaItem};
use crate::domain::release;

/// Why no local subtitle could be used for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalMiss {
    NoLocalFolder,
    NoVideoPath,
    NoSubtitle(PathBuf),
}

impl fmt::Display for LocalMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalMiss::NoLocalFolder => {
                write!(f, "could not find the media folder under any base path")
            }
            LocalMiss::NoVideoPath => write!(f, "could not determine the video filename"),
            LocalMiss::NoSubtitle(video) => write!(
                f,
                "no matching local subtitle file found for {}",
                video.display()
            ),
        }
    }
}

/// Maps a library manager's folder onto the local disk: the folder's last
/// component is tried under each base path, first existing directory wins.
pub fn find_local_folder(manager_path: &str, base_paths: &[PathBuf]) -> Option<PathBuf> {
    let folder_name = Path::new(manager_path).file_name()?;
    base_paths
        .iter()
        .map(|base| base.join(folder_name))
        .find(|candidate| candidate.is_dir())
}

/// First subtitle file, in directory order, that sits next to `video` and
/// whose name starts with the video's stem.
pub fn find_matching_subtitle(video: &Path) -> Option<PathBuf> {
    let directory = video.parent()?;
    let stem = video.file_stem()?.to_string_lossy().into_owned();
    let entries = fs::read_dir(directory).ok()?;

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            path.is_file()
                && release::is_subtitle_file(path)
                && path
                    .file_name()
                    .map(|name| name.to_string_lossy().starts_with(&stem))
                    .unwrap_or(false)
        })
}

pub fn resolve_subtitle(item: &MediaItem) -> Result<LocalSubtitleMatch, LocalMiss> {
    if item.local_folder.is_none() {
        return Err(LocalMiss::NoLocalFolder);
    }
    let video = item.video_path().ok_or(LocalMiss::NoVideoPath)?;
    let file_path = find_matching_subtitle(&video).ok_or(LocalMiss::NoSubtitle(video))?;
    let hearing_impaired = file_path
        .file_name()
        .map(|name| release::is_hearing_impaired(&name.to_string_lossy()))
        .unwrap_or(false);

    Ok(LocalSubtitleMatch {
        file_path,
        hearing_impaired,
    })
}
