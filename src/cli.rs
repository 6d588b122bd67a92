use std::{path::PathBuf, time::SystemTime};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{
    asc::{AppStoreConnectClient, BearerToken},
    config::{
        Config, Credentials, DEFAULT_BASE_URL, load_private_key, normalize_base_url, normalize_pem,
        resolve_private_key_path,
    },
    resolver::BuildNumberResolver,
};

#[derive(Parser, Debug)]
#[command(
    name = "next-build-number",
    version,
    about = "Print the next App Store Connect build number",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct Settings {
    /// App Store Connect Issuer ID
    #[arg(long = "issuer", env = "APP_STORE_CONNECT_ISSUER", global = true)]
    issuer_id: Option<String>,

    /// App Store Connect API Key ID
    #[arg(long = "key-id", env = "APP_STORE_CONNECT_API_KEY", global = true)]
    key_id: Option<String>,

    /// Apple ID of the app
    #[arg(long = "app-id", env = "APP_STORE_CONNECT_APP_ID", global = true)]
    app_id: Option<String>,

    /// Platform filter, e.g. IOS or MAC_OS
    #[arg(long, env = "PLATFORM", global = true)]
    platform: Option<String>,

    /// Path to the .p8 key (default: ~/private_keys/AuthKey_<key id>.p8)
    #[arg(long = "private-key", env = "APP_STORE_CONNECT_KEY_PATH", global = true)]
    private_key: Option<PathBuf>,

    /// Contents of the .p8 key; takes precedence over --private-key
    #[arg(long = "p8", env = "APP_STORE_CONNECT_P8", hide_env_values = true, global = true)]
    p8: Option<String>,

    /// App Store Connect API base URL, including the version segment
    #[arg(
        long = "base-url",
        env = "APP_STORE_CONNECT_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        global = true
    )]
    base_url: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the next build number (default)
    Next,
    /// Print a short-lived App Store Connect bearer token
    Token,
}

pub async fn run_cli() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(e) => debug!("no environment file loaded: {}", e),
    }

    let needs_app = !matches!(cli.command, Some(Commands::Token));
    let config = build_config(cli.settings, needs_app)?;
    let token = BearerToken::mint(&config.credentials, SystemTime::now())
        .context("Failed to create App Store Connect token")?;

    match cli.command.unwrap_or(Commands::Next) {
        Commands::Next => next_build_number_cmd(&config, token).await?,
        Commands::Token => println!("{}", token.as_str()),
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when run in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn required(value: Option<String>, flag: &str, env: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .with_context(|| format!("Missing {} (or env {})", flag, env))
}

fn build_config(settings: Settings, needs_app: bool) -> Result<Config> {
    let issuer_id = required(settings.issuer_id, "--issuer", "APP_STORE_CONNECT_ISSUER")?;
    let key_id = required(settings.key_id, "--key-id", "APP_STORE_CONNECT_API_KEY")?;
    let (app_id, platform) = if needs_app {
        (
            required(settings.app_id, "--app-id", "APP_STORE_CONNECT_APP_ID")?,
            required(settings.platform, "--platform", "PLATFORM")?,
        )
    } else {
        (
            settings.app_id.unwrap_or_default(),
            settings.platform.unwrap_or_default(),
        )
    };

    let p8_private_key_pem = match settings.p8.filter(|p| !p.trim().is_empty()) {
        Some(inline) => normalize_pem(&inline),
        None => {
            let path = resolve_private_key_path(settings.private_key, &key_id)?;
            debug!(path = %path.display(), "reading private key");
            load_private_key(&path)?
        }
    };

    Ok(Config {
        credentials: Credentials {
            issuer_id,
            key_id,
            p8_private_key_pem,
        },
        app_id,
        platform,
        base_url: normalize_base_url(&settings.base_url)?,
    })
}

async fn next_build_number_cmd(config: &Config, token: BearerToken) -> Result<()> {
    let client = AppStoreConnectClient::new(token)?.with_base_url(config.base_url.clone());
    let resolver = BuildNumberResolver::new(&client, &config.app_id, &config.platform);
    println!("{}", resolver.resolve().await);
    Ok(())
}
