// src/lib.rs

pub mod archive;
pub mod classify;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod naming;
pub mod orchestrator;
pub mod page;
pub mod progress;
pub mod resolver;
pub mod symbols;
pub mod ui;
pub mod utils;

mod workflows;

use crate::{cli::Cli, client::PageClient, config::AppConfig, error::AppResult};
use colored::*;
use log::{debug, info};
use std::sync::Arc;

/// Everything a workflow needs to run tasks. The client is swapped out in
/// place when the user supplies a fresh session cookie mid-session.
#[derive(Clone)]
pub struct RunContext {
    pub config: Arc<AppConfig>,
    pub http_client: Arc<PageClient>,
    pub args: Arc<Cli>,
    pub non_interactive: bool,
}

/// Library entry point, called by `main.rs`.
pub async fn run_from_cli(args: Arc<Cli>) -> AppResult<()> {
    debug!("CLI arguments: {:?}", args);
    if args.session_help {
        ui::box_message(
            "Obtaining the session cookie",
            constants::HELP_SESSION_GUIDE
                .lines()
                .collect::<Vec<_>>()
                .as_slice(),
            |s| s.cyan(),
        );
        println!(
            "\n{} Keep the cookie to yourself; it grants access to your account.",
            *symbols::INFO
        );
        return Ok(());
    }

    let (session_opt, source) = config::session::resolve_session(args.session.as_deref());
    if session_opt.is_some() {
        info!("Session cookie loaded from {}", source);
        println!("\n{} Session cookie loaded from {}.", *symbols::INFO, source);
    } else {
        info!("No session cookie found");
        println!(
            "\n{}",
            format!(
                "{} No session cookie found; only public courses will be reachable.",
                *symbols::INFO
            )
            .yellow()
        );
    }

    let config = Arc::new(AppConfig::new(session_opt)?);
    debug!(
        "Network config: connect_timeout={:?}, timeout={:?}, max_retries={}, max_fetch_bytes={}",
        config.connect_timeout, config.timeout, config.max_retries, config.max_fetch_bytes
    );

    let http_client = Arc::new(PageClient::new(config.clone())?);

    let context = RunContext {
        config,
        http_client,
        args: args.clone(),
        non_interactive: !args.interactive,
    };

    if args.interactive {
        workflows::run_interactive(context).await?;
    } else if args.url.is_some() {
        workflows::run_single(context).await?;
    }

    Ok(())
}
