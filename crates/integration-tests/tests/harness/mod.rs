#![allow(dead_code)]

pub mod config;
pub mod mock_provider;

use std::sync::Arc;

use switchboard_config::Config;
use switchboard_llm::{Dispatcher, HttpTransport};

/// Build a dispatcher wired to real HTTP transport
pub fn dispatcher(config: &Config) -> anyhow::Result<Dispatcher> {
    let transport = HttpTransport::from_config(config)?;
    Ok(Dispatcher::from_config(config, Arc::new(transport))?)
}
