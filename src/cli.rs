// Command-line flags. Everything the client needs (key, endpoints, poll
// interval) is read here once and handed down explicitly; nothing is kept
// in globals.

use crate::api::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_UPLOAD_BASE_URL};
use crate::upload::UploadOptions;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "filestore")]
#[command(about = "Manage Gemini File Search stores and the documents inside them")]
#[command(version)]
pub struct Cli {
    /// One-shot action to run. Without it the interactive menu starts.
    #[arg(long, value_enum)]
    pub action: Option<Action>,

    /// Display name of the store to act on
    #[arg(long = "storage-name", value_name = "NAME")]
    pub storage_name: Option<String>,

    /// Folder whose files are uploaded
    #[arg(long, value_name = "PATH")]
    pub folder: Option<PathBuf>,

    /// Full resource name of a document (fileSearchStores/<id>/documents/<id>)
    #[arg(long, value_name = "NAME")]
    pub document: Option<String>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub key: Option<String>,

    #[arg(long, env = "GEMINI_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "GEMINI_UPLOAD_BASE_URL", default_value = DEFAULT_UPLOAD_BASE_URL)]
    pub upload_base_url: String,

    /// Seconds to wait between two polls of an upload operation
    #[arg(long, value_name = "SECONDS", default_value_t = 2)]
    pub poll_interval: u64,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    List,
    Delete,
    Upload,
    Create,
    ListDocuments,
    DeleteDocument,
}

impl Cli {
    /// The key, unless it is missing or blank.
    pub fn api_key(&self) -> Option<&str> {
        self.key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn client_config(&self, api_key: &str) -> ClientConfig {
        ClientConfig::new(api_key).with_base_urls(&self.base_url, &self.upload_base_url)
    }

    pub fn upload_options(&self, spinner: bool) -> UploadOptions {
        UploadOptions {
            poll_interval: Duration::from_secs(self.poll_interval),
            spinner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_shot_flags() {
        let cli = Cli::try_parse_from([
            "filestore",
            "--action=upload",
            "--storage-name=Docs",
            "--folder=/tmp/docs",
            "--key=abc",
        ])
        .expect("valid flags");
        assert_eq!(cli.action, Some(Action::Upload));
        assert_eq!(cli.storage_name.as_deref(), Some("Docs"));
        assert_eq!(cli.folder, Some(PathBuf::from("/tmp/docs")));
        assert_eq!(cli.api_key(), Some("abc"));
        assert_eq!(cli.poll_interval, 2);
    }

    #[test]
    fn kebab_case_action_names() {
        let cli = Cli::try_parse_from(["filestore", "--action", "list-documents"]).expect("valid");
        assert_eq!(cli.action, Some(Action::ListDocuments));
        let cli = Cli::try_parse_from(["filestore", "--action=delete-document"]).expect("valid");
        assert_eq!(cli.action, Some(Action::DeleteDocument));
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(Cli::try_parse_from(["filestore", "--action=purge"]).is_err());
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let cli = Cli::try_parse_from(["filestore", "--key", "  "]).expect("valid");
        assert_eq!(cli.api_key(), None);
    }

    #[test]
    fn client_config_uses_url_flags() {
        let cli = Cli::try_parse_from([
            "filestore",
            "--base-url=http://localhost:9000/v1beta/",
            "--upload-base-url=http://localhost:9000/upload/v1beta",
        ])
        .expect("valid");
        let config = cli.client_config("k");
        assert_eq!(config.api_key, "k");
        assert_eq!(config.base_url, "http://localhost:9000/v1beta");
        assert_eq!(config.upload_base_url, "http://localhost:9000/upload/v1beta");
    }
}
