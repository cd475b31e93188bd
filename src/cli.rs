// src/cli.rs

use crate::constants;
use clap::{Parser, ValueEnum, command, crate_version};
use std::path::PathBuf;

/// Log verbosity for the hidden --log-level switch.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true,
)]
#[command(group(
    clap::ArgGroup::new("mode")
        .required(true)
        .args(&["interactive", "url", "session_help"]),
))]
pub struct Cli {
    // --- Mode ---
    /// Start an interactive session and enter course links one by one
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub interactive: bool,
    /// Course page URL to archive
    #[arg(long, help_heading = "Mode")]
    pub url: Option<String>,
    /// Show how to obtain the session cookie and exit
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub session_help: bool,

    // --- Options ---
    /// [URL mode] Sections to include (e.g. '1-5,8', 'all')
    #[arg(long, default_value_t = constants::DEFAULT_SELECTION.to_string(), value_name = "SELECTION", help_heading = "Options")]
    pub sections: String,
    /// [URL mode] List the course sections and exit without archiving
    #[arg(long, action = clap::ArgAction::SetTrue, requires = "url", help_heading = "Options")]
    pub list_sections: bool,
    /// Place every file at the archive root, without section directories
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub flat: bool,
    /// Session cookie value (MoodleSession), highest priority
    #[arg(long, help_heading = "Options")]
    pub session: Option<String>,
    /// Directory the finished archive is written to
    #[arg(short, long, value_name = "DIR", default_value_os_t = PathBuf::from(constants::DEFAULT_SAVE_DIR), help_heading = "Options")]
    pub output: PathBuf,

    // --- General ---
    /// Print this help message and exit
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// Print the version and exit
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// (hidden) Log level for the log file, used for debugging
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}
