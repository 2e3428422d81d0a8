use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::domain::models::{LocalSubtitleMatch, MediaItem};
use crate::domain::release;
use crate::infra::subdl::SubdlError;

const UPLOAD_QUALITY: &str = "web";
const UPLOAD_COMMENT: &str = "Uploaded via arr-subdl-sync";

/// Identifiers handed out by the service during one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    pub session_id: String,
    pub file_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMetadata {
    pub media_type: &'static str,
    pub tmdb_id: String,
    pub imdb_id: Option<String>,
    pub name: String,
    pub language: String,
    pub season: u64,
    pub episode_from: u64,
    pub episode_to: u64,
    pub hearing_impaired: bool,
    pub release_name: String,
}

impl UploadMetadata {
    pub fn for_item(item: &MediaItem, subtitle: &LocalSubtitleMatch, language: &str) -> Self {
        let (season, episode) = item.kind.season_episode();
        Self {
            media_type: item.kind.api_type(),
            tmdb_id: item.tmdb_id.clone(),
            imdb_id: item.imdb_id.clone(),
            name: item.title.clone(),
            language: language.to_uppercase(),
            season,
            episode_from: episode,
            episode_to: episode,
            hearing_impaired: subtitle.hearing_impaired,
            release_name: release::release_tag(&subtitle.file_path),
        }
    }

    /// Metadata fields of the finalize form, without the session identifiers.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let releases = serde_json::Value::from(vec![self.release_name.clone()]).to_string();
        let mut fields = vec![
            ("type", self.media_type.to_string()),
            ("tmdb_id", self.tmdb_id.clone()),
        ];
        if let Some(imdb_id) = &self.imdb_id {
            fields.push(("imdb_id", imdb_id.clone()));
        }
        fields.extend([
            ("name", self.name.clone()),
            ("lang", self.language.clone()),
            ("quality", UPLOAD_QUALITY.to_string()),
            ("production_type", "0".to_string()),
            ("releases", releases),
            ("framerate", "0".to_string()),
            ("comment", UPLOAD_COMMENT.to_string()),
            ("season", self.season.to_string()),
            ("ef", self.episode_from.to_string()),
            ("ee", self.episode_to.to_string()),
            ("hi", self.hearing_impaired.to_string()),
            ("is_full_season", "false".to_string()),
        ]);
        fields
    }
}

/// The three calls of the remote upload protocol.
pub trait UploadApi {
    fn begin_session(&self) -> Result<String, SubdlError>;
    fn upload_file(&self, session_id: &str, file: &Path) -> Result<String, SubdlError>;
    fn finalize(&self, session: &UploadSession, metadata: &UploadMetadata)
        -> Result<(), SubdlError>;
}

/// Runs begin, upload and finalize in order, stopping at the first failure.
/// Nothing is retried and an abandoned session is left to expire.
pub fn upload_subtitle(api: &dyn UploadApi, file: &Path, metadata: &UploadMetadata) -> Result<()> {
    let filename = file
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!("Starting upload for: {filename}");

    let session_id = api
        .begin_session()
        .context("Failed to get upload session ID")?;
    info!("Got session ID: {session_id}");

    let file_id = api
        .upload_file(&session_id, file)
        .with_context(|| format!("Failed to upload file {filename}"))?;
    info!("File uploaded successfully. File ID: {file_id}");

    let session = UploadSession {
        session_id,
        file_id,
    };
    info!("Submitting metadata...");
    api.finalize(&session, metadata)
        .with_context(|| format!("Failed to complete subtitle upload for {}", metadata.name))?;
    info!("Successfully submitted for review: {}", metadata.name);
    Ok(())
}
