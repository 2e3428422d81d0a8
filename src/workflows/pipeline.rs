use std::fmt;
use tracing::{debug, info, warn};

use crate::domain::models::{ItemKey, MediaItem, MediaKind};
use crate::domain::release;
use crate::infra::ledger::ProgressLedger;
use crate::media::local;
use crate::workflows::catalog::{check_remote, RemoteCheck, SearchQuery, SubtitleCatalog};
use crate::workflows::prompt::{GateDecision, UploadGate};
use crate::workflows::upload::{upload_subtitle, UploadApi, UploadMetadata};

/// Per media kind: upload without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoUpload {
    pub movies: bool,
    pub episodes: bool,
}

impl AutoUpload {
    fn for_kind(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Movie => self.movies,
            MediaKind::Episode { .. } => self.episodes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotDownloaded,
    GenericReleaseGroup,
    AlreadyProcessed,
    NoLocalSubtitle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    SearchFailed,
    RemoteSatisfied,
    Declined,
    Cancelled,
    Aborted,
    Uploaded,
    UploadFailed,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub skipped: usize,
    pub search_failed: usize,
    pub remote_satisfied: usize,
    pub declined: usize,
    pub cancelled: usize,
    pub uploaded: usize,
    pub upload_failed: usize,
    /// The user stopped the run before every item was seen.
    pub aborted: bool,
}

impl RunSummary {
    fn add(&mut self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Aborted => {
                self.aborted = true;
                return;
            }
            Outcome::Skipped(_) => &mut self.skipped,
            Outcome::SearchFailed => &mut self.search_failed,
            Outcome::RemoteSatisfied => &mut self.remote_satisfied,
            Outcome::Declined => &mut self.declined,
            Outcome::Cancelled => &mut self.cancelled,
            Outcome::Uploaded => &mut self.uploaded,
            Outcome::UploadFailed => &mut self.upload_failed,
        };
        *counter += 1;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} uploaded, {} already on SubDL, {} upload failed, {} search failed, {} declined, {} cancelled, {} skipped",
            self.uploaded,
            self.remote_satisfied,
            self.upload_failed,
            self.search_failed,
            self.declined,
            self.cancelled,
            self.skipped
        )?;
        if self.aborted {
            write!(f, " (stopped early)")?;
        }
        Ok(())
    }
}

/// Decides, item by item, whether a local subtitle should be uploaded and
/// records every resolved item in the ledger.
pub struct Pipeline<'a> {
    catalog: &'a dyn SubtitleCatalog,
    uploader: &'a dyn UploadApi,
    gate: &'a mut dyn UploadGate,
    ledger: &'a mut ProgressLedger,
    language: &'a str,
    auto_upload: AutoUpload,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        catalog: &'a dyn SubtitleCatalog,
        uploader: &'a dyn UploadApi,
        gate: &'a mut dyn UploadGate,
        ledger: &'a mut ProgressLedger,
        language: &'a str,
        auto_upload: AutoUpload,
    ) -> Self {
        Self {
            catalog,
            uploader,
            gate,
            ledger,
            language,
            auto_upload,
        }
    }

    pub fn run(&mut self, items: impl IntoIterator<Item = MediaItem>) -> RunSummary {
        let mut summary = RunSummary::default();
        for item in items {
            let outcome = self.process(&item);
            debug!("{}: {outcome:?}", item.title);
            summary.add(outcome);
            if summary.aborted {
                info!("Run stopped by user.");
                break;
            }
        }
        summary
    }

    pub fn process(&mut self, item: &MediaItem) -> Outcome {
        let key = item.key();

        if !item.has_file {
            info!("Skipping '{}' as it is not downloaded.", item.title);
            return Outcome::Skipped(SkipReason::NotDownloaded);
        }
        if let Some(group) = item
            .known_release_group()
            .filter(|g| release::is_generic_release_group(g))
        {
            info!(
                "Skipping '{}' because it has a generic release group ('{group}').",
                item.title
            );
            return Outcome::Skipped(SkipReason::GenericReleaseGroup);
        }
        if self.ledger.contains(&key) {
            info!("Skipping '{}' as it was already processed.", item.title);
            return Outcome::Skipped(SkipReason::AlreadyProcessed);
        }

        info!("Processing: {}", item.title);
        let subtitle = match local::resolve_subtitle(item) {
            Ok(subtitle) => subtitle,
            Err(miss) => {
                info!("Skipping '{}': {miss}.", item.title);
                return Outcome::Skipped(SkipReason::NoLocalSubtitle);
            }
        };
        info!(
            "Found matching subtitle file: {} (hearing impaired: {})",
            subtitle.file_path.display(),
            subtitle.hearing_impaired
        );
        match item.known_release_group() {
            Some(group) => info!("Local release group: {group}"),
            None => warn!(
                "Could not determine release group for '{}'. Will perform a general check.",
                item.title
            ),
        }

        info!("Checking for existing subtitles on SubDL...");
        let records = match self
            .catalog
            .search(&SearchQuery::for_item(item, self.language))
        {
            Ok(records) => records,
            Err(e) => {
                warn!("SubDL search failed for '{}': {e}. Will retry next run.", item.title);
                return Outcome::SearchFailed;
            }
        };

        match check_remote(item.known_release_group(), &records) {
            RemoteCheck::MatchedGroup(record) => {
                info!("Found matching subtitle for this release group. Skipping.");
                debug!("Matching subtitle details: {}", record.raw);
                self.mark_resolved(&key);
                return Outcome::RemoteSatisfied;
            }
            RemoteCheck::UnknownGroupWithRecords(count) => {
                info!("Found {count} general subtitle(s). Skipping because release group is unknown.");
                self.mark_resolved(&key);
                return Outcome::RemoteSatisfied;
            }
            RemoteCheck::Missing => info!(
                "No matching subtitles found for language '{}' and release '{}'.",
                self.language,
                item.known_release_group().unwrap_or("unknown")
            ),
        }

        let automatic = self.auto_upload.for_kind(item.kind);
        match self.gate.decide(item, &subtitle, automatic) {
            GateDecision::Upload => {}
            GateDecision::Decline => {
                info!("Not uploading subtitle for '{}'.", item.title);
                return Outcome::Declined;
            }
            GateDecision::Cancel if automatic => {
                info!(
                    "Upload cancelled for '{}'. Adding to processed list to avoid re-processing on next run.",
                    item.title
                );
                self.mark_resolved(&key);
                return Outcome::Cancelled;
            }
            GateDecision::Cancel => {
                info!("Upload cancelled for '{}'.", item.title);
                return Outcome::Cancelled;
            }
            GateDecision::Abort => {
                info!("Stopping before '{}'. It was not recorded.", item.title);
                return Outcome::Aborted;
            }
        }

        let metadata = UploadMetadata::for_item(item, &subtitle, self.language);
        match upload_subtitle(self.uploader, &subtitle.file_path, &metadata) {
            Ok(()) => {
                self.mark_resolved(&key);
                Outcome::Uploaded
            }
            Err(e) => {
                warn!("Upload aborted for '{}': {e:#}", item.title);
                Outcome::UploadFailed
            }
        }
    }

    fn mark_resolved(&mut self, key: &ItemKey) {
        if let Err(e) = self.ledger.record(key) {
            warn!(
                "Could not write {key} to processed list {}: {e:#}",
                self.ledger.path().display()
            );
        }
    }
}
