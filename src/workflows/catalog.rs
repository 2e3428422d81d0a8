use crate::domain::models::{MediaItem, MediaKind, RemoteSubtitleRecord};
use crate::infra::subdl::SubdlError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub tmdb_id: String,
    pub imdb_id: Option<String>,
    pub media_type: &'static str,
    pub language: String,
    pub episode: Option<(u64, u64)>,
}

impl SearchQuery {
    pub fn for_item(item: &MediaItem, language: &str) -> Self {
        let episode = match item.kind {
            MediaKind::Movie => None,
            MediaKind::Episode { season, episode } => Some((season, episode)),
        };
        Self {
            tmdb_id: item.tmdb_id.clone(),
            imdb_id: item.imdb_id.clone(),
            media_type: item.kind.api_type(),
            language: language.to_string(),
            episode,
        }
    }
}

/// Existing subtitles on the remote service. An empty list means no records;
/// a service failure is always an `Err`.
pub trait SubtitleCatalog {
    fn search(&self, query: &SearchQuery) -> Result<Vec<RemoteSubtitleRecord>, SubdlError>;
}

#[derive(Debug)]
pub enum RemoteCheck<'a> {
    /// A record carries the item's release group.
    MatchedGroup(&'a RemoteSubtitleRecord),
    /// The release group is unknown and the service already has subtitles.
    UnknownGroupWithRecords(usize),
    Missing,
}

/// Decides whether `records` already cover an item released by `release_group`.
/// The first matching record in response order wins.
pub fn check_remote<'a>(
    release_group: Option<&str>,
    records: &'a [RemoteSubtitleRecord],
) -> RemoteCheck<'a> {
    match release_group.filter(|g| !g.trim().is_empty()) {
        Some(group) => records
            .iter()
            .find(|r| r.mentions_release_group(group))
            .map(RemoteCheck::MatchedGroup)
            .unwrap_or(RemoteCheck::Missing),
        None if !records.is_empty() => RemoteCheck::UnknownGroupWithRecords(records.len()),
        None => RemoteCheck::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(names: &[&str]) -> RemoteSubtitleRecord {
        RemoteSubtitleRecord {
            release_names: names.iter().map(|s| s.to_string()).collect(),
            raw: json!({ "releases": names }),
        }
    }

    #[test]
    fn test_known_group_matches_substring() {
        let records = vec![record(&["Movie.OTHER"]), record(&["Movie.GROUPX.WEB"])];
        match check_remote(Some("groupx"), &records) {
            RemoteCheck::MatchedGroup(r) => assert_eq!(r.release_names[0], "Movie.GROUPX.WEB"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_first_matching_record_wins() {
        let records = vec![record(&["A.GRP.1"]), record(&["A.GRP.2"])];
        match check_remote(Some("GRP"), &records) {
            RemoteCheck::MatchedGroup(r) => assert_eq!(r.release_names[0], "A.GRP.1"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_known_group_without_match_is_missing() {
        let records = vec![record(&["Movie.OTHER"])];
        assert!(matches!(
            check_remote(Some("GROUPX"), &records),
            RemoteCheck::Missing
        ));
        assert!(matches!(check_remote(Some("GROUPX"), &[]), RemoteCheck::Missing));
    }

    #[test]
    fn test_unknown_group() {
        let records = vec![record(&["Movie.OTHER"])];
        assert!(matches!(
            check_remote(None, &records),
            RemoteCheck::UnknownGroupWithRecords(1)
        ));
        assert!(matches!(check_remote(None, &[]), RemoteCheck::Missing));
    }

    #[test]
    fn test_blank_group_counts_as_unknown() {
        let records = vec![record(&[])];
        assert!(matches!(
            check_remote(Some(""), &records),
            RemoteCheck::UnknownGroupWithRecords(1)
        ));
        assert!(matches!(
            check_remote(Some("  "), &records),
            RemoteCheck::UnknownGroupWithRecords(1)
        ));
    }

    #[test]
    fn test_query_for_episode() {
        let item = MediaItem {
            kind: MediaKind::Episode {
                season: 2,
                episode: 5,
            },
            tmdb_id: "9".to_string(),
            imdb_id: Some("tt9".to_string()),
            title: "Show - S02E05".to_string(),
            has_file: true,
            local_folder: None,
            video_relative_path: None,
            release_group: None,
        };
        let query = SearchQuery::for_item(&item, "en");
        assert_eq!(query.media_type, "tv");
        assert_eq!(query.episode, Some((2, 5)));
        assert_eq!(query.imdb_id.as_deref(), Some("tt9"));
    }
}
