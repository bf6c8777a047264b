#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod commands;

use std::path::Path;
use std::sync::Arc;

use args::{Args, Command};
use clap::Parser;
use switchboard_config::Config;
use switchboard_llm::{Dispatcher, HttpTransport};
use tokio_util::sync::CancellationToken;

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_PATH: &str = "switchboard.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;

    // Initialize telemetry
    let _telemetry_guard = switchboard_telemetry::init(config.telemetry.as_ref(), &args.log)?;

    let transport = HttpTransport::from_config(&config)?;
    let dispatcher = Dispatcher::from_config(&config, Arc::new(transport))?;

    tracing::debug!(
        models = dispatcher.catalog().snapshot().len(),
        providers = ?config.credentialed_providers(),
        "switchboard ready"
    );

    // Ctrl-C cancels whatever is in flight
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            cancel_clone.cancel();
        }
    });

    let output = match &args.command {
        Command::Models => commands::models(&dispatcher)?,
        Command::Recommend(recommend) => commands::recommend(&dispatcher, recommend)?,
        Command::Dispatch(dispatch) => commands::dispatch(&dispatcher, dispatch, &cancel).await?,
        Command::Compare(compare) => commands::compare(&dispatcher, compare, &cancel).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(Path::new(DEFAULT_CONFIG_PATH)),
        None => Config::from_env(),
    }
}
