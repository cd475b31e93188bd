// tests/orchestrator_test.rs

use moodle_pack::{
    client::PageClient,
    config::AppConfig,
    error::AppResult,
    orchestrator::{CourseRun, RunOutcome},
    page::CoursePage,
    progress::{ChannelSink, ProgressEvent},
};
use std::fs;
use std::io::{Cursor, Read};
use std::sync::{Arc, mpsc};
use url::Url;
use zip::ZipArchive;

// Helpers shared by the run tests.
fn test_client() -> Arc<PageClient> {
    let config = Arc::new(AppConfig::default());
    Arc::new(PageClient::new(config).expect("Failed to create client"))
}

// Parses the fixture course page against the mock server's base URL so the
// relative activity links resolve onto the mock endpoints.
fn course_page(base: &str) -> CoursePage {
    let html = fs::read_to_string("tests/fixtures/course_page.html")
        .expect("Failed to read the course page fixture");
    let mut page =
        CoursePage::parse(&html, Url::parse(base).expect("Mock server URL must parse"));
    page.discover_sections();
    page
}

fn section(name: &str, percent: u8) -> ProgressEvent {
    ProgressEvent::Section { name: name.to_string(), percent }
}

fn file(name: &str, index: usize, total: usize) -> ProgressEvent {
    ProgressEvent::File { name: name.to_string(), index, total }
}

#[tokio::test]
async fn test_run_archives_selected_sections() -> AppResult<()> {
    // --- 1. Arrange ---
    let mut server = mockito::Server::new_async().await;

    // "Intro": the forum is skipped offline; the resource goes through its
    // wrapper page to a PDF.
    let wrapper_mock = server
        .mock("GET", "/mod/resource/view.php?id=11")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(
            r#"<div class="resourceworkaround">
                 <a href="/pluginfile.php/11/mod_resource/content/1/syllabus.pdf">syllabus.pdf</a>
               </div>"#,
        )
        .create_async()
        .await;
    let syllabus_mock = server
        .mock("GET", "/pluginfile.php/11/mod_resource/content/1/syllabus.pdf")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body("%PDF-1.4 syllabus")
        .create_async()
        .await;

    // "Lab 1": a folder with two files and a video behind a native player.
    let folder_mock = server
        .mock("GET", "/mod/folder/view.php?id=21")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(
            r#"<div id="region-main"><h2>Lab materials</h2>
                 <div class="foldertree">
                   <a href="/pluginfile.php/21/mod_folder/content/0/worksheet.pdf">worksheet.pdf</a>
                   <a href="/pluginfile.php/21/mod_folder/content/0/data%20set.csv">data set.csv</a>
                 </div>
               </div>"#,
        )
        .create_async()
        .await;
    let worksheet_mock = server
        .mock("GET", "/pluginfile.php/21/mod_folder/content/0/worksheet.pdf")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body("worksheet bytes")
        .create_async()
        .await;
    let dataset_mock = server
        .mock("GET", "/pluginfile.php/21/mod_folder/content/0/data%20set.csv")
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body("a,b\n1,2\n")
        .create_async()
        .await;
    let video_page_mock = server
        .mock("GET", "/mod/videofile/view.php?id=22")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(r#"<video controls><source src="/media/walkthrough.mp4" type="video/mp4"></video>"#)
        .create_async()
        .await;
    let media_mock = server
        .mock("GET", "/media/walkthrough.mp4")
        .with_status(200)
        .with_header("content-type", "video/mp4")
        .with_body("mp4 bytes")
        .create_async()
        .await;

    let page = course_page(&server.url());
    let (tx, rx) = mpsc::channel();
    let mut run = CourseRun::new(&page, test_client(), Arc::new(ChannelSink::new(tx)), false);
    run.select_section("Intro");
    run.select_section("Lab 1");

    // --- 2. Act ---
    let outcome = run.start().await?;

    // --- 3. Assert ---
    wrapper_mock.assert_async().await;
    syllabus_mock.assert_async().await;
    folder_mock.assert_async().await;
    worksheet_mock.assert_async().await;
    dataset_mock.assert_async().await;
    video_page_mock.assert_async().await;
    media_mock.assert_async().await;

    let RunOutcome::Completed { archive_name, bytes, stats } = outcome else {
        panic!("Expected a completed run");
    };
    assert_eq!(archive_name, "Systems Programming 101");
    assert_eq!(stats.sections, 2);
    assert_eq!(stats.activities, 4);
    assert_eq!(stats.resolved, 3);
    assert_eq!(stats.skipped, 1, "The forum must be skipped, not failed");
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.files, 4);

    // Every event in order: sections step the percentage, files carry their
    // position within the section, and Completed closes the stream.
    let events: Vec<ProgressEvent> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![
            section("Intro", 0),
            file("Announcements", 1, 2),
            file("Syllabus", 2, 2),
            section("Lab 1", 50),
            file("Lab materials", 1, 2),
            file("Setup walkthrough", 2, 2),
            section("Completed", 100),
            ProgressEvent::Completed,
        ]
    );

    // The archive nests section / folder / file and keeps the bytes intact.
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("The run must produce a valid archive");
    let names: Vec<String> = archive.file_names().map(String::from).collect();
    assert!(names.iter().any(|n| n == "Intro/Syllabus.pdf"), "names: {:?}", names);
    assert!(names.iter().any(|n| n == "Lab 1/Lab materials/worksheet.pdf"));
    assert!(names.iter().any(|n| n == "Lab 1/Lab materials/data set.csv"));
    assert!(names.iter().any(|n| n == "Lab 1/Setup walkthrough.mp4"));

    let mut contents = Vec::new();
    archive
        .by_name("Intro/Syllabus.pdf")
        .expect("The syllabus must be in the archive")
        .read_to_end(&mut contents)?;
    assert_eq!(contents, b"%PDF-1.4 syllabus");
    Ok(())
}

#[tokio::test]
async fn test_failing_activity_does_not_abort_the_run() -> AppResult<()> {
    // --- 1. Arrange ---
    let mut server = mockito::Server::new_async().await;

    // The resource page is gone; the run must record the failure and still
    // deliver an archive.
    let gone_mock = server
        .mock("GET", "/mod/resource/view.php?id=11")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let page = course_page(&server.url());
    let (tx, rx) = mpsc::channel();
    let mut run = CourseRun::new(&page, test_client(), Arc::new(ChannelSink::new(tx)), false);
    run.select_section("Intro");

    // --- 2. Act ---
    let outcome = run.start().await?;

    // --- 3. Assert ---
    gone_mock.assert_async().await;

    let RunOutcome::Completed { bytes, stats, .. } = outcome else {
        panic!("A per-activity failure must not abort the run");
    };
    assert_eq!(stats.sections, 1);
    assert_eq!(stats.activities, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.resolved, 0);
    assert_eq!(stats.files, 0);

    // The progress stream still runs to completion.
    let events: Vec<ProgressEvent> = rx.try_iter().collect();
    assert_eq!(events.last(), Some(&ProgressEvent::Completed));

    // Nothing resolved, so the archive carries no entries but is valid.
    let archive = ZipArchive::new(Cursor::new(bytes)).expect("The archive must still be valid");
    assert_eq!(archive.len(), 0);
    Ok(())
}

#[tokio::test]
async fn test_flat_layout_files_at_the_archive_root() -> AppResult<()> {
    // --- 1. Arrange ---
    let mut server = mockito::Server::new_async().await;

    // Served directly as a file: no wrapper hop involved.
    let direct_mock = server
        .mock("GET", "/mod/resource/view.php?id=11")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body("%PDF-1.4 direct")
        .create_async()
        .await;

    let page = course_page(&server.url());
    let (tx, _rx) = mpsc::channel();
    let mut run = CourseRun::new(&page, test_client(), Arc::new(ChannelSink::new(tx)), true);
    run.select_section("Intro");

    // --- 2. Act ---
    let outcome = run.start().await?;

    // --- 3. Assert ---
    direct_mock.assert_async().await;
    let RunOutcome::Completed { bytes, stats, .. } = outcome else {
        panic!("Expected a completed run");
    };
    assert_eq!(stats.resolved, 1);

    let archive = ZipArchive::new(Cursor::new(bytes))?;
    let names: Vec<String> = archive.file_names().map(String::from).collect();
    assert!(
        names.iter().any(|n| n == "Syllabus.pdf"),
        "Flat layout must drop the section directory: {:?}",
        names
    );
    assert!(!names.iter().any(|n| n.starts_with("Intro/")));
    Ok(())
}

#[tokio::test]
async fn test_empty_section_still_reports_progress() -> AppResult<()> {
    // --- 1. Arrange ---
    // "Reading period" holds no activities; no endpoint is ever called.
    let page = course_page("https://moodle.example/");
    let (tx, rx) = mpsc::channel();
    let mut run = CourseRun::new(&page, test_client(), Arc::new(ChannelSink::new(tx)), false);
    run.select_section("Reading period");

    // --- 2. Act ---
    let outcome = run.start().await?;

    // --- 3. Assert ---
    let RunOutcome::Completed { bytes, stats, .. } = outcome else {
        panic!("Expected a completed run");
    };
    assert_eq!(stats.sections, 1);
    assert_eq!(stats.activities, 0);

    let events: Vec<ProgressEvent> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![
            section("Reading period", 0),
            section("Completed", 100),
            ProgressEvent::Completed,
        ]
    );

    let archive = ZipArchive::new(Cursor::new(bytes))?;
    assert_eq!(archive.len(), 0);
    Ok(())
}
