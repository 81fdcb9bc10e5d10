use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use smartmedia_core::{FetchBackend, ResolverConfig};

mod commands;
mod console;

/// Resolve and play video references
#[derive(Parser)]
#[command(name = "smartmedia", version, about)]
struct Cli {
    #[command(flatten)]
    resolver: ResolverArgs,

    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print how a reference is classified
    Classify { reference: String },
    /// Resolve a reference to a playable locator
    Resolve { reference: String },
    /// Drive a playback coordinator through references in order
    Watch {
        #[arg(required = true)]
        references: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    Innertube,
    YtDlp,
}

impl From<Backend> for FetchBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Innertube => FetchBackend::Innertube,
            Backend::YtDlp => FetchBackend::YtDlp,
        }
    }
}

#[derive(Args)]
struct ResolverArgs {
    /// Extraction backend
    #[arg(long, value_enum, env = "SMARTMEDIA_BACKEND", default_value_t = Backend::Innertube, global = true)]
    backend: Backend,

    /// Network timeout in seconds
    #[arg(long, env = "SMARTMEDIA_TIMEOUT", default_value_t = 30, global = true)]
    timeout: u64,

    /// User agent for progressive stream requests
    #[arg(long, env = "SMARTMEDIA_USER_AGENT", global = true)]
    user_agent: Option<String>,

    /// Proxy URL (e.g. socks5://127.0.0.1:9050)
    #[arg(long, env = "SMARTMEDIA_PROXY", global = true)]
    proxy: Option<String>,

    /// Path to the yt-dlp executable
    #[arg(long, env = "SMARTMEDIA_YTDLP_PATH", global = true)]
    ytdlp_path: Option<String>,

    /// Base URL of the player API
    #[arg(long, env = "SMARTMEDIA_API_BASE", global = true)]
    api_base: Option<String>,

    /// Client version reported to the player API
    #[arg(long, env = "SMARTMEDIA_CLIENT_VERSION", global = true)]
    client_version: Option<String>,
}

impl ResolverArgs {
    fn into_config(self) -> ResolverConfig {
        let defaults = ResolverConfig::default();
        ResolverConfig {
            backend: self.backend.into(),
            timeout_secs: self.timeout,
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            proxy: self.proxy,
            ytdlp_path: self.ytdlp_path,
            innertube_client_version: self
                .client_version
                .unwrap_or(defaults.innertube_client_version),
            api_base: self.api_base.unwrap_or(defaults.api_base),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logger
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let config = cli.resolver.into_config();
    match cli.command {
        Command::Classify { reference } => commands::print_classification(&reference),
        Command::Resolve { reference } => commands::print_resolution(&config, &reference).await,
        Command::Watch { references } => commands::watch(&config, &references).await,
    }
}
