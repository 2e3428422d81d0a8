use std::path::Path;

/// Placeholder groups the library managers fill in when the real one is unknown.
const GENERIC_RELEASE_GROUPS: &[&str] = &["sickbeard", "radarr", "sonarr"];

const HEARING_IMPAIRED_TAGS: &[&str] = &[".hi.", ".sdh.", ".cc."];

pub const SUBTITLE_EXTENSIONS: &[&str] = &["srt"];

pub fn is_generic_release_group(group: &str) -> bool {
    let group = group.to_lowercase();
    GENERIC_RELEASE_GROUPS.iter().any(|g| *g == group)
}

pub fn is_hearing_impaired(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    HEARING_IMPAIRED_TAGS.iter().any(|tag| lower.contains(tag))
}

pub fn is_subtitle_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            SUBTITLE_EXTENSIONS.iter().any(|ext| *ext == e)
        })
        .unwrap_or(false)
}

/// Release name sent alongside an upload: the subtitle filename minus its extension.
pub fn release_tag(subtitle_path: &Path) -> String {
    subtitle_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
