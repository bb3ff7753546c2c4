use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Parser, Debug)]
#[command(name = "slackdl-rs", about = "Download every file shared in a Slack workspace")]
pub struct Cli {
    /// API token used for all requests.
    /// WARNING: passing via --token is visible in process listings.
    /// Prefer the SLACK_TOKEN environment variable instead.
    #[arg(short = 't', long, env = "SLACK_TOKEN")]
    pub token: String,

    /// Local directory files are mirrored into, one subdirectory per
    /// channel or group
    #[arg(short = 'd', long, default_value = "data")]
    pub directory: String,

    /// Checkpoint file recording where the next run resumes
    /// (default: offset.txt next to the executable)
    #[arg(long)]
    pub checkpoint_file: Option<String>,

    /// Number of files downloaded in parallel
    #[arg(long, default_value_t = 4)]
    pub concurrent_downloads: u16,

    /// Retries per file after a transient download failure
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    /// Base delay in seconds between download retries
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout: u64,

    /// Give up on the whole run after this many seconds
    #[arg(long)]
    pub run_timeout: Option<u64>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// List and resolve everything without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,
}
