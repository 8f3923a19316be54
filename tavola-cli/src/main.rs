//! tavola - command line front end for the reservation bridge

mod cli;
mod logger;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tavola_client::{Backend, Bridge, BridgeConfig, LogNavigator, RestBackend};
use tokio::sync::broadcast;

use crate::cli::{Cli, Command};
use crate::logger::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logger(&cli.log_level, cli.json_logs);

    let config = resolve_config(BridgeConfig::from_env(), cli.cache_path.clone(), cli.timeout);
    tracing::debug!(
        configured = config.has_backend(),
        cache = ?config.cache_path,
        "Configuration loaded"
    );

    let rest = if config.has_backend() {
        Some(Arc::new(
            RestBackend::from_config(&config).context("failed to build backend client")?,
        ))
    } else {
        tracing::warn!("TAVOLA_BACKEND_URL or TAVOLA_ANON_KEY not set, running offline");
        None
    };
    let backend = rest.clone().map(|rest| rest as Arc<dyn Backend>);
    let bridge = Bridge::from_config(&config, backend).with_navigator(Arc::new(LogNavigator));
    let mut events = bridge.subscribe();

    if let Some(rest) = &rest {
        session::restore(bridge.cache(), rest).await;
    }

    run(cli.command, &bridge, rest.as_deref(), &config).await?;
    drain_events(&mut events);
    Ok(())
}

async fn run(
    command: Command,
    bridge: &Bridge,
    rest: Option<&RestBackend>,
    config: &BridgeConfig,
) -> anyhow::Result<()> {
    match command {
        Command::SyncCatalog => print(&bridge.sync_public_catalog().await?),
        Command::Guard { login_url } => {
            let login_url = login_url.as_deref().unwrap_or(&config.login_url);
            print(&bridge.require_admin_or_redirect(login_url).await?)
        }
        Command::SyncAdmin => print(&bridge.sync_admin_data().await?),
        Command::Create(args) => {
            let input = args.into();
            print(&bridge.create_reservation(&input).await?)
        }
        Command::Update(args) => {
            let (id, patch) = args.into_parts();
            print(&bridge.update_reservation(&id, &patch).await?)
        }
        Command::Delete { id } => print(&bridge.delete_reservation(&id).await?),
        Command::Login { email, password } => {
            let rest = rest.context("no backend configured")?;
            let signed_in = rest.sign_in_with_password(&email, &password).await?;
            session::store(bridge.cache(), &signed_in);
            print(&signed_in.user)
        }
        Command::Logout => {
            session::forget(bridge.cache());
            if let Some(rest) = rest {
                rest.sign_out().await?;
            }
            Ok(())
        }
        Command::Cache { key } => match key {
            Some(key) => print(&session::redacted_entry(bridge.cache(), &key)),
            None => print(&bridge.cache().keys()),
        },
    }
}

/// Apply command line overrides. Without any cache path the CLI uses a redb
/// file in the user data dir so sessions persist between runs.
fn resolve_config(
    config: BridgeConfig,
    cache_path: Option<PathBuf>,
    timeout: Option<u64>,
) -> BridgeConfig {
    let path = cache_path
        .or_else(|| config.cache_path.clone())
        .unwrap_or_else(default_cache_path);
    let config = config.with_cache_path(path);
    match timeout {
        Some(secs) => config.with_timeout(secs),
        None => config,
    }
}

fn default_cache_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("tavola"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cache.redb")
}

fn print<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn drain_events(events: &mut broadcast::Receiver<tavola_client::BridgeEvent>) {
    while let Ok(event) = events.try_recv() {
        tracing::info!(event = %event, "Bridge event");
    }
}
