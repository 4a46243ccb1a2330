use image::{Rgba, RgbaImage};
use pdf_async_runtime::*;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([20, 120, 40, 255]))
        .save(&path)
        .unwrap();
    path
}

async fn run(commands: Vec<ExportCommand>) -> Vec<ExportUpdate> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();

    for command in commands {
        command_tx.send(command).unwrap();
    }
    drop(command_tx);

    worker_task(command_rx, update_tx).await;

    let mut updates = Vec::new();
    while let Some(update) = update_rx.recv().await {
        updates.push(update);
    }
    updates
}

#[tokio::test]
async fn test_export_command_writes_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_png(dir.path(), "first.png", 300, 800);
    let second = write_png(dir.path(), "second.png", 300, 200);
    let out_dir = dir.path().join("out");

    let updates = run(vec![ExportCommand::Export {
        units: vec![
            ImageUnitSpec::new(&first),
            ImageUnitSpec {
                page_break: true,
                ..ImageUnitSpec::new(&second)
            },
        ],
        overrides: ExportOverrides {
            filename: Some("Field Notes.pdf".to_string()),
            scale: Some(1.0),
            ..Default::default()
        },
        output_dir: out_dir.clone(),
    }])
    .await;

    let progress = updates
        .iter()
        .filter(|u| matches!(u, ExportUpdate::Progress { .. }))
        .count();
    assert_eq!(progress, 3);

    match updates.last() {
        Some(ExportUpdate::Complete {
            path,
            filename,
            page_count,
        }) => {
            assert_eq!(filename, "Field_Notes.pdf");
            assert_eq!(path, &out_dir.join("Field_Notes.pdf"));
            // 900 x 2400 layout slices into two A4 pages, 900 x 600 fits on one
            assert_eq!(*page_count, 3);

            let doc = lopdf::Document::load(path).unwrap();
            assert_eq!(doc.get_pages().len(), 3);
        }
        other => panic!("Expected Complete, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_image_reports_generic_failure() {
    let dir = tempfile::tempdir().unwrap();

    let updates = run(vec![ExportCommand::Export {
        units: vec![ImageUnitSpec::new(dir.path().join("missing.png"))],
        overrides: ExportOverrides::default(),
        output_dir: dir.path().to_path_buf(),
    }])
    .await;

    match updates.as_slice() {
        [ExportUpdate::Failed { message }] => {
            assert_eq!(
                message,
                "There was an error generating the PDF. Please try again."
            );
            assert!(!message.contains("missing.png"));
        }
        other => panic!("Expected a single Failed update, got {:?}", other),
    }
    assert!(!dir.path().join("report.pdf").exists());
}

#[tokio::test]
async fn test_plan_command_predicts_pages() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "tall.png", 300, 800);

    let updates = run(vec![ExportCommand::Plan {
        units: vec![ImageUnitSpec::new(&image)],
        overrides: ExportOverrides::default(),
    }])
    .await;

    match updates.as_slice() {
        [ExportUpdate::Planned { stats }] => {
            assert_eq!(stats.units.len(), 1);
            assert_eq!(stats.units[0].pages, 2);
            assert_eq!(stats.total_pages, 2);
        }
        other => panic!("Expected Planned, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_overrides_report_failure() {
    let updates = run(vec![ExportCommand::Plan {
        units: vec![],
        overrides: ExportOverrides {
            scale: Some(-1.0),
            ..Default::default()
        },
    }])
    .await;

    assert!(matches!(
        updates.as_slice(),
        [ExportUpdate::Failed { .. }]
    ));
}
