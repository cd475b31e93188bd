// src/orchestrator.rs

use crate::{
    archive::ArchiveBuilder,
    client::PageClient,
    error::AppResult,
    models::{Resolution, describe_failure},
    page::CoursePage,
    progress::{ProgressEvent, ProgressSink},
    resolver::resolver_for,
    symbols, ui, utils,
};
use colored::*;
use log::{error, info};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub sections: usize,
    pub activities: usize,
    pub files: usize,
    pub resolved: usize,
    pub skipped: usize,
    pub failed: usize,
    skipped_details: Vec<(String, String)>,
    failed_details: Vec<(String, String)>,
}

impl RunStats {
    fn record_resolved(&mut self, file_count: usize) {
        self.resolved += 1;
        self.files += file_count;
    }

    fn record_skip(&mut self, label: &str, reason: &str) {
        info!("Skipping activity '{}': {}", label, reason);
        self.skipped += 1;
        self.skipped_details.push((label.to_string(), reason.to_string()));
    }

    fn record_failure(&mut self, label: &str, reason: &str) {
        error!("Activity '{}' failed: {}", label, reason);
        self.failed += 1;
        self.failed_details.push((label.to_string(), reason.to_string()));
    }

    pub fn print_report(&self) {
        info!(
            "Run report: Sections={}, Activities={}, Files={}, Skipped={}, Failed={}",
            self.sections, self.activities, self.files, self.skipped, self.failed
        );

        if !self.skipped_details.is_empty() || !self.failed_details.is_empty() {
            ui::print_sub_header("Resolution details");
            if !self.skipped_details.is_empty() {
                println!("\n{} Skipped activities ({}):", *symbols::INFO, self.skipped);
                print_grouped_report(&self.skipped_details, |s| s.cyan());
            }
            if !self.failed_details.is_empty() {
                println!("\n{} Failed activities ({}):", *symbols::ERROR, self.failed);
                print_grouped_report(&self.failed_details, |s| s.red());
            }
        }
        ui::print_sub_header("Run summary");
        if self.activities > 0 && self.failed == 0 {
            println!(
                "{} All {} activities across {} sections handled ({} skipped), {} files archived.",
                *symbols::OK,
                self.activities,
                self.sections,
                self.skipped,
                self.files
            );
        } else {
            let summary = format!(
                "{} | {} | {} | {}",
                format!("Resolved: {}", self.resolved).green(),
                format!("Failed: {}", self.failed).red(),
                format!("Skipped: {}", self.skipped).yellow(),
                format!("Files: {}", self.files)
            );
            println!("{}", summary);
        }
    }
}

fn print_grouped_report(items: &[(String, String)], color_fn: fn(ColoredString) -> ColoredString) {
    let mut grouped: HashMap<&String, Vec<&String>> = HashMap::new();
    for (label, reason) in items {
        grouped.entry(reason).or_default().push(label);
    }
    let mut sorted_reasons: Vec<_> = grouped.keys().collect();
    sorted_reasons.sort();
    for reason in sorted_reasons {
        println!("  - {}", color_fn(format!("Reason: {}", reason).into()));
        let mut labels = grouped.get(reason).unwrap().clone();
        labels.sort();
        for label in labels {
            println!("    - {}", label);
        }
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed {
        archive_name: String,
        bytes: Vec<u8>,
        stats: RunStats,
    },
    AbortedNoSelection,
}

/// One archive run over a parsed course page: select sections, then `start`
/// resolves everything sequentially and finalizes the archive. The run owns
/// its selection, statistics, and archive tree; nothing survives it.
pub struct CourseRun<'a> {
    page: &'a CoursePage,
    client: Arc<PageClient>,
    sink: Arc<dyn ProgressSink>,
    selection: Vec<String>,
    flat: bool,
    builder: ArchiveBuilder,
    stats: RunStats,
}

impl<'a> CourseRun<'a> {
    pub fn new(
        page: &'a CoursePage,
        client: Arc<PageClient>,
        sink: Arc<dyn ProgressSink>,
        flat: bool,
    ) -> Self {
        Self {
            page,
            client,
            sink,
            selection: Vec::new(),
            flat,
            builder: ArchiveBuilder::new(),
            stats: RunStats::default(),
        }
    }

    /// Ordered-set append: re-selecting a section is ignored.
    pub fn select_section(&mut self, title: &str) {
        if !self.selection.iter().any(|t| t == title) {
            self.selection.push(title.to_string());
        }
    }

    /// Runs the pipeline. Activity failures are recorded and never abort the
    /// run; the archive is delivered no matter how many of them failed.
    pub async fn start(mut self) -> AppResult<RunOutcome> {
        if self.selection.is_empty() {
            info!("No sections selected, aborting the run");
            return Ok(RunOutcome::AbortedNoSelection);
        }

        let selection = std::mem::take(&mut self.selection);
        let total_sections = selection.len();
        for (s_idx, title) in selection.iter().enumerate() {
            let percent = (s_idx * 100 / total_sections) as u8;
            self.sink.emit(ProgressEvent::Section { name: title.clone(), percent });
            info!("Processing section '{}'", title);
            self.stats.sections += 1;

            let activities = self.page.activities(title);
            let total = activities.len();
            for (i, activity) in activities.iter().enumerate() {
                self.sink.emit(ProgressEvent::File {
                    name: activity.label.clone(),
                    index: i + 1,
                    total,
                });
                self.stats.activities += 1;

                let section_dir = if self.flat { "" } else { title.as_str() };
                let resolver = resolver_for(activity.kind, self.client.clone());
                match resolver.resolve(activity).await {
                    Ok(Resolution { artifacts, folder, status }) => {
                        let count = artifacts.len();
                        for artifact in artifacts {
                            self.builder.add_artifact(section_dir, artifact, folder.as_deref());
                        }
                        use crate::models::ResolveStatus::*;
                        match status {
                            Resolved => self.stats.record_resolved(count),
                            Unsupported => {
                                let (_, _, msg) = status.get_display_info();
                                let reason = format!("{} ({})", msg, activity.kind.describe());
                                self.stats.record_skip(&activity.label, &reason);
                            }
                            NothingFound => {
                                let (_, _, msg) = status.get_display_info();
                                self.stats.record_skip(&activity.label, msg);
                            }
                            Failed => {
                                let (_, _, msg) = status.get_display_info();
                                self.stats.files += count;
                                self.stats.record_failure(&activity.label, msg);
                            }
                        }
                    }
                    Err(e) => {
                        self.stats.record_failure(&activity.label, &describe_failure(&e));
                    }
                }
            }
        }

        self.sink.emit(ProgressEvent::Section { name: "Completed".to_string(), percent: 100 });
        let archive_name = utils::sanitize_filename(&self.page.course_name());
        let stats = self.stats;
        let bytes = self.builder.finalize()?;
        self.sink.emit(ProgressEvent::Completed);

        info!(
            "Run finished: {} files in archive '{}' ({} bytes)",
            stats.files,
            archive_name,
            bytes.len()
        );
        Ok(RunOutcome::Completed { archive_name, bytes, stats })
    }
}
