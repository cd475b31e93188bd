// src/workflows.rs

use crate::{
    RunContext,
    client::PageClient,
    config, constants,
    error::{AppError, AppResult},
    orchestrator::{CourseRun, RunOutcome},
    page::CoursePage,
    progress::{ChannelSink, ProgressEvent},
    symbols, ui, utils,
};
use colored::*;
use indicatif::HumanBytes;
use log::{error, info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::thread;
use tempfile::NamedTempFile;
use url::Url;

/// Runs the single-course mode (--url).
pub(crate) async fn run_single(mut context: RunContext) -> AppResult<()> {
    // In URL mode the argument is guaranteed present by the clap mode group.
    let url = context.args.url.clone().unwrap();
    run_course_task(&mut context, &url).await
}

/// Runs the interactive mode: course links are entered one at a time.
pub(crate) async fn run_interactive(base_context: RunContext) -> AppResult<()> {
    ui::print_header("Interactive mode");
    ui::plain(&format!(
        "Enter course page links one at a time. Press {} to quit at any point.",
        *symbols::CTRL_C
    ));

    let mut context = base_context;
    loop {
        match ui::prompt("Enter a course page URL", None) {
            Ok(input) if !input.is_empty() => {
                if let Err(e) = run_course_task(&mut context, &input).await {
                    log::error!("Interactive task '{}' failed: {}", &input, e);
                    if matches!(e, AppError::UserInterrupt) {
                        continue;
                    }
                    let error_message = match e {
                        AppError::Http { status, .. } if status == 403 || status == 404 => {
                            format!(
                                "{} {}",
                                *symbols::WARN,
                                "The course does not exist or is not accessible, check the link."
                                    .yellow()
                            )
                        }
                        AppError::Network(req_err) => {
                            let friendly_msg = match req_err.status() {
                                Some(status) => format!("The server returned an error: {}", status),
                                None => "Network connection error.".to_string(),
                            };
                            format!("{} {}", *symbols::ERROR, friendly_msg.red())
                        }
                        AppError::UserInputError(msg) => {
                            format!("{} {}", *symbols::WARN, msg.yellow())
                        }
                        _ => format!(
                            "{} Error while processing: {}",
                            *symbols::ERROR,
                            e.to_string().red()
                        ),
                    };
                    eprintln!("\n{}", error_message);
                }
            }
            Ok(_) => break, // Empty line quits the loop.
            Err(_) => return Err(AppError::UserInterrupt),
        }
    }

    ui::plain("");
    ui::info("Leaving interactive mode.");
    Ok(())
}

// --- Module-internal helpers ---

/// Fetch, select, run, write: the whole pipeline for one course page.
async fn run_course_task(context: &mut RunContext, raw_url: &str) -> AppResult<()> {
    let url = Url::parse(raw_url).map_err(|_| {
        AppError::UserInputError(format!("'{}' is not a valid course page URL.", raw_url))
    })?;

    let mut page = fetch_course_page(context, &url).await?;
    let course_name = page.course_name();
    let titles = page.discover_sections();
    if titles.is_empty() {
        ui::warn("No sections found on this course page.");
        return Ok(());
    }

    if context.args.list_sections {
        print_section_listing(&course_name, &titles);
        return Ok(());
    }

    let selected = choose_sections(context, &titles)?;
    if selected.is_empty() {
        println!("\n{} No sections selected, nothing to archive.", *symbols::INFO);
        return Ok(());
    }

    let base_output_dir = context.args.output.clone();
    fs::create_dir_all(&base_output_dir)?;
    let absolute_path = dunce::canonicalize(&base_output_dir)?;
    info!("The archive will be saved to: \"{}\"", absolute_path.display());
    println!(
        "\n{} The archive will be saved to: \"{}\"",
        *symbols::INFO,
        absolute_path.display()
    );
    ui::info(&format!(
        "Archiving {} of {} sections from '{}'...",
        selected.len(),
        titles.len(),
        utils::truncate_text(&course_name, 60)
    ));

    let (tx, rx) = mpsc::channel();
    let renderer = thread::spawn(move || render_progress(rx));

    let mut run = CourseRun::new(
        &page,
        context.http_client.clone(),
        Arc::new(ChannelSink::new(tx)),
        context.args.flat,
    );
    for title in &selected {
        run.select_section(title);
    }
    let outcome = run.start().await;
    // The run dropped its sink, so the renderer sees the channel close.
    let _ = renderer.join();

    match outcome? {
        RunOutcome::AbortedNoSelection => {
            println!("\n{} No sections selected, nothing to archive.", *symbols::INFO);
            Ok(())
        }
        RunOutcome::Completed { archive_name, bytes, stats } => {
            let size = bytes.len() as u64;
            let path = write_archive(&absolute_path, &archive_name, &bytes)?;
            stats.print_report();
            if stats.failed > 0 {
                ui::warn("Some activities failed to resolve; the archive is missing their files.");
            }
            println!(
                "\n{} Archive written to: \"{}\" ({})",
                *symbols::OK,
                path.display(),
                HumanBytes(size)
            );
            Ok(())
        }
    }
}

/// Fetches and parses the course page. An authentication failure in an
/// interactive session prompts for a fresh cookie and swaps the client
/// in the context, then retries.
async fn fetch_course_page(context: &mut RunContext, url: &Url) -> AppResult<CoursePage> {
    loop {
        match context.http_client.fetch(url.clone()).await {
            Ok(fetched) => {
                if !fetched.is_html() {
                    return Err(AppError::UserInputError(format!(
                        "'{}' returned '{}' instead of an HTML page; pass a course page link.",
                        url, fetched.content_type
                    )));
                }
                return Ok(CoursePage::parse(&fetched.text(), fetched.final_url.clone()));
            }
            Err(e @ (AppError::SessionInvalid | AppError::SessionMissing)) => {
                if context.non_interactive {
                    return Err(e);
                }
                warn!("Course page fetch rejected: {}", e);
                context.http_client = handle_session_failure(context).await?;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Prompts for a new session cookie and returns a client built around it.
async fn handle_session_failure(context: &RunContext) -> AppResult<Arc<PageClient>> {
    ui::box_message(
        "Authentication required",
        &[
            "The Moodle site redirected to its login page.",
            "The session cookie is missing, expired, or rejected.",
            "Enter '2' for a step-by-step guide to obtaining a fresh one.",
        ],
        |s| s.red(),
    );
    loop {
        let prompt_msg = format!(
            "Choose: [1] enter a new cookie  [2] show the guide (press {} to abort)",
            *symbols::CTRL_C
        );
        match ui::prompt(&prompt_msg, Some("1")) {
            Ok(choice) if choice == "1" => {
                match ui::prompt_hidden("Paste the MoodleSession value (input hidden, Enter to finish)") {
                    Ok(new_session) if !new_session.is_empty() => {
                        info!("A new session cookie was entered");
                        if ui::confirm("Save this cookie for later runs?", false) {
                            if let Err(e) = config::session::save_session(&new_session) {
                                error!("Saving the session cookie failed: {}", e);
                                eprintln!(
                                    "{} Could not save the session cookie: {}",
                                    *symbols::WARN,
                                    e
                                );
                            }
                        }
                        let config = Arc::new(context.config.with_session(Some(new_session)));
                        return Ok(Arc::new(PageClient::new(config)?));
                    }
                    _ => println!("{}", "The cookie value cannot be empty.".yellow()),
                }
            }
            Ok(choice) if choice == "2" => {
                ui::box_message(
                    "Obtaining the session cookie",
                    constants::HELP_SESSION_GUIDE
                        .lines()
                        .collect::<Vec<_>>()
                        .as_slice(),
                    |s| s.cyan(),
                );
            }
            Err(_) => {
                warn!("Session prompt interrupted");
                return Err(AppError::UserInterrupt);
            }
            _ => continue,
        }
    }
}

/// Section choice: the menu in interactive sessions, --sections otherwise.
fn choose_sections(context: &RunContext, titles: &[String]) -> AppResult<Vec<String>> {
    if context.non_interactive {
        let indices = utils::parse_selection_indices(&context.args.sections, titles.len());
        if indices.is_empty() {
            return Err(AppError::UserInputError(format!(
                "Selection '{}' does not match any of the {} sections.",
                context.args.sections,
                titles.len()
            )));
        }
        Ok(indices.into_iter().map(|i| titles[i].clone()).collect())
    } else {
        Ok(ui::get_user_choices_from_menu(
            titles,
            "Course sections",
            &context.args.sections,
        ))
    }
}

fn print_section_listing(course_name: &str, titles: &[String]) {
    ui::print_header(&format!("Sections of '{}'", utils::truncate_text(course_name, 60)));
    let pad = titles.len().to_string().len();
    for (i, title) in titles.iter().enumerate() {
        println!("  [{}] {}", format!("{:<pad$}", i + 1, pad = pad).yellow(), title);
    }
    ui::plain("");
    ui::info(&format!(
        "{} sections found. Pass --sections to archive a subset.",
        titles.len()
    ));
}

/// Runs on its own thread and owns the terminal while a run is active.
fn render_progress(rx: mpsc::Receiver<ProgressEvent>) {
    let pbar = ui::new_run_progress_bar();
    while let Ok(event) = rx.recv() {
        match event {
            ProgressEvent::Section { name, percent } => {
                pbar.set_prefix(utils::truncate_text(&name, 20));
                pbar.set_position(percent as u64);
            }
            ProgressEvent::File { name, index, total } => {
                pbar.set_message(format!("[{}/{}] {}", index, total, utils::truncate_text(&name, 40)));
            }
            ProgressEvent::Completed => pbar.finish_and_clear(),
        }
    }
    // A run that errored out closes the channel without Completed.
    if !pbar.is_finished() {
        pbar.finish_and_clear();
    }
}

/// Writes the archive next to a temp file first so a crash never leaves a
/// half-written zip at the target path.
fn write_archive(dir: &Path, archive_name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
    let target = dir.join(format!("{}.zip", archive_name));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    if target.exists() {
        fs::remove_file(&target)?;
    }
    tmp.persist(&target)?;
    info!("Archive persisted at \"{}\"", target.display());
    Ok(target)
}
