use std::path::PathBuf;

use crate::cli::Cli;
use crate::retry::RetryConfig;

/// Application configuration, resolved from CLI flags and the environment.
pub struct Config {
    pub token: String,
    pub directory: PathBuf,
    pub checkpoint_file: PathBuf,
    pub request_timeout_secs: u64,
    pub run_timeout_secs: Option<u64>,
    pub retry: RetryConfig,
    pub concurrent_downloads: u16,
    pub dry_run: bool,
    pub no_progress_bar: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("directory", &self.directory)
            .field("checkpoint_file", &self.checkpoint_file)
            .field("concurrent_downloads", &self.concurrent_downloads)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Default checkpoint location: `offset.txt` next to the executable, so a
/// deployment carries its own resume state. Falls back to the working
/// directory when the executable path is unknown.
fn default_checkpoint_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("offset.txt")))
        .unwrap_or_else(|| PathBuf::from("offset.txt"))
}

impl Config {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        if cli.token.trim().is_empty() {
            anyhow::bail!("The API token is empty (set SLACK_TOKEN or pass --token)");
        }

        let directory = expand_tilde(&cli.directory);
        let checkpoint_file = cli
            .checkpoint_file
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(default_checkpoint_path);

        Ok(Self {
            token: cli.token,
            directory,
            checkpoint_file,
            request_timeout_secs: cli.request_timeout,
            run_timeout_secs: cli.run_timeout,
            retry: RetryConfig {
                max_retries: cli.max_retries,
                base_delay_secs: cli.retry_delay,
                ..RetryConfig::default()
            },
            concurrent_downloads: cli.concurrent_downloads.max(1),
            dry_run: cli.dry_run,
            no_progress_bar: cli.no_progress_bar,
        })
    }
}
