use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};

use crate::domain::models::{LocalSubtitleMatch, MediaItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Upload,
    Decline,
    /// Skip the item. Only an automatic decision also remembers it, so the
    /// next run does not try again.
    Cancel,
    /// Stop the whole run without recording the item.
    Abort,
}

/// Decides whether a subtitle that is missing remotely gets uploaded.
pub trait UploadGate {
    fn decide(
        &mut self,
        item: &MediaItem,
        subtitle: &LocalSubtitleMatch,
        automatic: bool,
    ) -> GateDecision;
}

/// Only an explicit no declines; an empty answer uploads.
pub fn interpret_answer(input: &str) -> GateDecision {
    match input.trim().to_lowercase().as_str() {
        "n" | "no" => GateDecision::Decline,
        _ => GateDecision::Upload,
    }
}

/// Asks on the terminal.
pub struct ConsoleGate;

impl UploadGate for ConsoleGate {
    fn decide(
        &mut self,
        item: &MediaItem,
        subtitle: &LocalSubtitleMatch,
        automatic: bool,
    ) -> GateDecision {
        if automatic {
            info!(
                "Automatic upload is enabled. Uploading subtitle for '{}'...",
                item.title
            );
            return GateDecision::Upload;
        }

        let filename = subtitle
            .file_path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                warn!("Cannot prompt for confirmation ({e}). Not uploading.");
                return GateDecision::Decline;
            }
        };
        match rl.readline(&format!(
            "?? Upload '{filename}' for '{}'? (Y/n): ",
            item.title
        )) {
            Ok(line) => interpret_answer(&line),
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => GateDecision::Abort,
            Err(e) => {
                warn!("Failed to read confirmation: {e}. Not uploading.");
                GateDecision::Decline
            }
        }
    }
}
