use clap::Parser;
use std::path::PathBuf;

/// Settings left out here fall back to environment variables, then to the
/// config file.
#[derive(Parser, Debug, Default)]
#[command(name = "arr-subdl-sync")]
#[command(about = "Find local subtitles for Radarr/Sonarr media and upload them to SubDL")]
pub struct Cli {
    /// URL of your Radarr instance
    #[arg(long)]
    pub radarr_url: Option<String>,

    /// API key for your Radarr instance
    #[arg(long)]
    pub radarr_api_key: Option<String>,

    /// Comma-separated list of base paths where your Radarr media is stored
    #[arg(long)]
    pub radarr_base_paths: Option<String>,

    /// URL of your Sonarr instance
    #[arg(long)]
    pub sonarr_url: Option<String>,

    /// API key for your Sonarr instance
    #[arg(long)]
    pub sonarr_api_key: Option<String>,

    /// Comma-separated list of base paths where your Sonarr media is stored
    #[arg(long)]
    pub sonarr_base_paths: Option<String>,

    /// API key for SubDL search
    #[arg(long)]
    pub subdl_search_key: Option<String>,

    /// Bearer token for the SubDL upload API
    #[arg(long)]
    pub subdl_upload_token: Option<String>,

    /// Language of the subtitles to search for and upload (e.g. 'en', 'es')
    #[arg(long)]
    pub language: Option<String>,

    /// Upload TV subtitles without prompting
    #[arg(long)]
    pub always_upload_tv: bool,

    /// Upload movie subtitles without prompting
    #[arg(long)]
    pub always_upload_movie: bool,

    /// File recording items that are already handled
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// Config file (default: <config dir>/arr-subdl-sync/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
