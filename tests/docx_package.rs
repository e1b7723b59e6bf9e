#![cfg(feature = "docx")]

use behavior_evidence::{EvidenceRecorder, OutputFormat};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Minimal PNG: signature plus an IHDR chunk carrying the dimensions.
/// Only the header matters here; the emitter reads IHDR and embeds the
/// bytes verbatim.
fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
    bytes.extend(13u32.to_be_bytes());
    bytes.extend(b"IHDR");
    bytes.extend(width.to_be_bytes());
    bytes.extend(height.to_be_bytes());
    bytes.extend([8, 6, 0, 0, 0]);
    bytes.extend([0, 0, 0, 0]);
    bytes
}

fn read_zip_entry(path: &Path, name: &str) -> String {
    let file = File::open(path).expect("open docx package");
    let mut archive = zip::ZipArchive::new(file).expect("read docx as zip");
    let mut entry = archive.by_name(name).expect("zip entry present");
    let mut content = String::new();
    entry.read_to_string(&mut content).expect("read zip entry");
    content
}

#[test]
fn screenshot_bundle_saves_as_docx_package() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let mut recorder =
        EvidenceRecorder::new(temp_dir.path().join("evidence")).expect("create recorder");
    recorder
        .start_scenario("Login", "Valid user sees dashboard")
        .expect("start scenario");

    let screenshots_dir = recorder
        .screenshots_dir()
        .expect("screenshot dir")
        .to_path_buf();
    let shot_path = screenshots_dir.join("dashboard.png");
    fs::write(&shot_path, png_bytes(1280, 720)).expect("write screenshot");

    recorder.add_ui_screenshot(
        shot_path.to_str().expect("utf-8 path"),
        "dashboard after login",
        "https://example.test/dashboard",
    );
    recorder.add_database_query("SELECT count(*) FROM sessions", None, None);

    let path = recorder
        .save_evidence(OutputFormat::Auto)
        .expect("docx evidence path");
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("docx"));

    let document = read_zip_entry(&path, "word/document.xml");
    assert!(document.contains("Login - Valid user sees dashboard"));
    assert!(document.contains("Description: dashboard after login"));
    assert!(document.contains("Page URL: https://example.test/dashboard"));
    assert!(document.contains("Database Queries"));
    assert!(document.contains("r:embed"));

    let rels = read_zip_entry(&path, "word/_rels/document.xml.rels");
    assert!(rels.contains("media/image1.png"));

    let file = File::open(&path).expect("open docx package");
    let mut archive = zip::ZipArchive::new(file).expect("read docx as zip");
    assert!(archive.by_name("word/media/image1.png").is_ok());

    // Embedded screenshots are transient; a successful document save
    // removes the scenario's temp directory.
    assert!(!screenshots_dir.exists());
}

#[test]
fn missing_screenshot_degrades_to_placeholder() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let mut recorder =
        EvidenceRecorder::new(temp_dir.path().join("evidence")).expect("create recorder");
    recorder
        .start_scenario("Login", "Screenshot lost")
        .expect("start scenario");

    let ghost = temp_dir.path().join("ghost.png");
    recorder.add_ui_screenshot(ghost.to_str().expect("utf-8 path"), "", "");

    let path = recorder
        .save_evidence(OutputFormat::Docx)
        .expect("docx evidence path");

    let document = read_zip_entry(&path, "word/document.xml");
    assert!(document.contains("[Screenshot file not found:"));
    assert!(!document.contains("r:embed"));
}

#[test]
fn json_save_keeps_temp_screenshot_dir() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let mut recorder =
        EvidenceRecorder::new(temp_dir.path().join("evidence")).expect("create recorder");
    recorder
        .start_scenario("Login", "JSON only")
        .expect("start scenario");
    let screenshots_dir = recorder
        .screenshots_dir()
        .expect("screenshot dir")
        .to_path_buf();

    recorder.add_database_query("SELECT 1", None, None);
    recorder
        .save_evidence(OutputFormat::Json)
        .expect("json evidence path");

    assert!(screenshots_dir.exists());
}
