use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::models::RemoteSubtitleRecord;
use crate::infra::throttle::CourtesyDelay;
use crate::workflows::catalog::{SearchQuery, SubtitleCatalog};
use crate::workflows::upload::{UploadApi, UploadMetadata, UploadSession};

const SUBDL_SEARCH_URL: &str = "https://api.subdl.com/api/v1/subtitles";
const SUBDL_UPLOAD_API_URL: &str = "https://api3.subdl.com/user";
const SUBS_PER_PAGE: &str = "30";

#[derive(Error, Debug)]
pub enum SubdlError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("SubDL reported a failure: {0}")]
    Service(String),
    #[error("Could not read subtitle file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: bool,
    subtitles: Option<Vec<Value>>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    ok: bool,
    n_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileUploadResponse {
    ok: bool,
    file: Option<UploadedFile>,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    file_n_id: String,
}

#[derive(Debug, Deserialize)]
struct FinalizeResponse {
    status: bool,
}

/// Blocking client for the SubDL search and upload APIs.
pub struct SubdlClient {
    client: Client,
    search_key: String,
    upload_token: String,
    delay: CourtesyDelay,
}

impl SubdlClient {
    pub fn new(search_key: String, upload_token: String, delay: CourtesyDelay) -> Self {
        Self {
            client: Client::new(),
            search_key,
            upload_token,
            delay,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", self.upload_token))
    }

    fn upload_url(endpoint: &str) -> String {
        format!("{SUBDL_UPLOAD_API_URL}/{endpoint}")
    }
}

/// Returns the body of a 2xx response, or the status and body otherwise.
fn read_body(response: reqwest::blocking::Response) -> Result<String, SubdlError> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(SubdlError::Status { status, body });
    }
    Ok(body)
}

fn record_from_value(raw: Value) -> RemoteSubtitleRecord {
    let mut release_names: Vec<String> = raw
        .get("releases")
        .and_then(Value::as_array)
        .map(|releases| {
            releases
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if let Some(name) = raw.get("release_name").and_then(Value::as_str) {
        if !release_names.iter().any(|r| r == name) {
            release_names.push(name.to_string());
        }
    }
    RemoteSubtitleRecord { release_names, raw }
}

fn parse_search_body(body: &str) -> Result<Vec<RemoteSubtitleRecord>, SubdlError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    if !response.status {
        return Err(SubdlError::Service(
            response
                .error
                .unwrap_or_else(|| "search returned status=false".to_string()),
        ));
    }
    Ok(response
        .subtitles
        .unwrap_or_default()
        .into_iter()
        .map(record_from_value)
        .collect())
}

fn search_params(api_key: &str, query: &SearchQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("api_key", api_key.to_string()),
        ("tmdb_id", query.tmdb_id.clone()),
        ("type", query.media_type.to_string()),
        ("languages", query.language.clone()),
    ];
    if let Some(imdb_id) = &query.imdb_id {
        params.push(("imdb_id", imdb_id.clone()));
    }
    if let Some((season, episode)) = query.episode {
        params.push(("season_number", season.to_string()));
        params.push(("episode_number", episode.to_string()));
    }
    params.push(("subs_per_page", SUBS_PER_PAGE.to_string()));
    params.push(("releases", "1".to_string()));
    params
}

fn finalize_fields(
    session: &UploadSession,
    metadata: &UploadMetadata,
) -> Result<Vec<(&'static str, String)>, SubdlError> {
    let mut fields = vec![
        (
            "file_n_ids",
            serde_json::to_string(&[session.file_id.as_str()])?,
        ),
        ("n_id", session.session_id.clone()),
    ];
    fields.extend(metadata.form_fields());
    Ok(fields)
}

impl SubtitleCatalog for SubdlClient {
    fn search(&self, query: &SearchQuery) -> Result<Vec<RemoteSubtitleRecord>, SubdlError> {
        self.delay.wait();
        let response = self
            .client
            .get(SUBDL_SEARCH_URL)
            .query(&search_params(&self.search_key, query))
            .send()?;
        parse_search_body(&read_body(response)?)
    }
}

impl UploadApi for SubdlClient {
    fn begin_session(&self) -> Result<String, SubdlError> {
        self.delay.wait();
        let response = self
            .authorized(self.client.get(Self::upload_url("getNId")))
            .send()?;
        let body = read_body(response)?;
        let session: SessionResponse = serde_json::from_str(&body)?;
        match session {
            SessionResponse {
                ok: true,
                n_id: Some(n_id),
            } => Ok(n_id),
            _ => Err(SubdlError::Service(format!("getNId refused: {body}"))),
        }
    }

    fn upload_file(&self, session_id: &str, file: &Path) -> Result<String, SubdlError> {
        self.delay.wait();
        let form = multipart::Form::new()
            .text("n_id", session_id.to_string())
            .file("subtitle", file)?;
        let response = self
            .authorized(self.client.post(Self::upload_url("uploadSingleSubtitle")))
            .multipart(form)
            .send()?;
        let body = read_body(response)?;
        let uploaded: FileUploadResponse = serde_json::from_str(&body)?;
        match uploaded {
            FileUploadResponse {
                ok: true,
                file: Some(file),
            } => Ok(file.file_n_id),
            _ => Err(SubdlError::Service(format!(
                "uploadSingleSubtitle refused: {body}"
            ))),
        }
    }

    fn finalize(
        &self,
        session: &UploadSession,
        metadata: &UploadMetadata,
    ) -> Result<(), SubdlError> {
        self.delay.wait();
        let fields = finalize_fields(session, metadata)?;
        let response = self
            .authorized(self.client.post(Self::upload_url("uploadSubtitle")))
            .form(&fields)
            .send()?;
        let body = read_body(response)?;
        let result: Value = serde_json::from_str(&body)?;
        info!(
            "API upload response: {}",
            serde_json::to_string_pretty(&result)?
        );
        let finalized: FinalizeResponse = serde_json::from_value(result)?;
        if !finalized.status {
            return Err(SubdlError::Service(format!("uploadSubtitle refused: {body}")));
        }
        debug!("Finalized upload session {}", session.session_id);
        Ok(())
    }
}
