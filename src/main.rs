//! Command-line entry point.
//!
//! Exit status: `0` when the persisted data is current (rebuilt or reused),
//! `1` when the build failed and the previous snapshot was kept, `2` when no
//! usable data exists or the run could not start.

use clap::Parser;
use derive_more::{Display, Error};
use exn::ResultExt;
use statdata_builder::{DataLoader, LoadOutcome};
use statdata_config::Config;
use statdata_remote::{ClientHandle, Credentials, SwgohHelpClient};
use statdata_storage::BackendHandle;
use statdata_storage::backend::{LocalBackend, ReadOnlyBackend};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Config file (TOML, YAML or JSON).
    #[arg(short, long, env = "STATDATA_CONFIG")]
    config: Option<PathBuf>,
    /// Directory holding the persisted game data.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    password: Option<String>,
    /// Build everything but write nothing.
    #[arg(long)]
    dry_run: bool,
    /// Log more; repeat for trace output. Ignored when `RUST_LOG` is set.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Display, Error)]
enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("could not open data directory")]
    Storage,
}

type Result<T> = std::result::Result<T, exn::Exn<ErrorKind>>;

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).or_raise(|| ErrorKind::Config)?;
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if self.username.is_some() {
            config.api.username = self.username;
        }
        if self.password.is_some() {
            config.api.password = self.password;
        }
        config.dry_run |= self.dry_run;
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();
}

fn client(config: &Config) -> Result<ClientHandle> {
    let (username, password) = config.api.credentials().or_raise(|| ErrorKind::Config)?;
    let credentials = Credentials {
        username: username.to_string(),
        password: password.to_string(),
        client_id: config.api.client_id.clone(),
        client_secret: config.api.client_secret.clone(),
    };
    Ok(Arc::new(SwgohHelpClient::new(&config.api.base_url, &config.api.language, credentials)))
}

fn storage(config: &Config) -> Result<BackendHandle> {
    let root = std::path::absolute(&config.data_dir).or_raise(|| ErrorKind::Storage)?;
    let local: BackendHandle = Arc::new(LocalBackend::new("local", root).or_raise(|| ErrorKind::Storage)?);
    Ok(if config.dry_run { Arc::new(ReadOnlyBackend::new(local)) } else { local })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let setup = args.into_config().and_then(|config| Ok((client(&config)?, storage(&config)?, config)));
    let (client, storage, config) = match setup {
        Ok(setup) => setup,
        Err(err) => {
            tracing::error!(error = ?err, "Could not start");
            return ExitCode::from(2);
        },
    };

    tracing::info!(data_dir = %config.data_dir.display(), dry_run = config.dry_run, "Loading game data");
    let mut loader = DataLoader::new(client, storage);
    match loader.load().await {
        Ok(LoadOutcome::Rebuilt | LoadOutcome::Reused) => ExitCode::SUCCESS,
        Ok(LoadOutcome::StaleFallback) => ExitCode::from(1),
        Err(err) => {
            tracing::error!(error = ?err, "No game data available");
            ExitCode::from(2)
        },
    }
}
