// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use moodle_pack::{cli::Cli, logging, run_from_cli};
use std::{env, sync::Arc, time::Duration};

#[tokio::main]
async fn main() {
    // ANSI color support for Windows terminals.
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        println!("\n{} Interrupted by user.", "[!]".yellow());
        tokio::time::sleep(Duration::from_millis(100)).await;
        std::process::exit(130);
    });

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| "moodle-pack".to_string());

    let after_help = format!(
        "Examples:\n  # Interactive session (recommended)\n  {bin} -i\n\n  # Archive every section of one course\n  {bin} --url \"https://moodle.example.edu/course/view.php?id=42\"\n\n  # Sections 1-3 only, no per-section directories\n  {bin} --url \"https://...\" --sections 1-3 --flat\n\n  # Show how to obtain the session cookie\n  {bin} --session-help",
        bin = bin_name
    );

    let cmd = Cli::command().after_help(after_help);

    let args = Arc::new(Cli::from_arg_matches(&cmd.get_matches()).unwrap());

    logging::init_logger(args.log_level);

    if let Err(e) = run_from_cli(args).await {
        eprintln!("\n{} {}", "[X]".red(), format!("Run failed: {}", e).red());
        std::process::exit(1);
    }
}
