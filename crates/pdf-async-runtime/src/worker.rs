use crate::{ExportCommand, ExportUpdate, ImageUnitSpec};
use pdf_report::{
    ContentUnit, ExportConfiguration, ExportOverrides, ExportProgress, Exporter, ImageContent,
    SurfaceRenderer, calculate_statistics,
};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Async worker task that processes export commands and sends updates
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<ExportCommand>,
    update_tx: mpsc::UnboundedSender<ExportUpdate>,
) {
    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            ExportCommand::Export {
                units,
                overrides,
                output_dir,
            } => handle_export(units, overrides, output_dir, &update_tx).await,
            ExportCommand::Plan { units, overrides } => {
                handle_plan(units, overrides, &update_tx).await
            }
        }
    }
    log::debug!("Export worker stopped");
}

/// Decode image files into content units, in order
pub async fn load_image_units(
    specs: &[ImageUnitSpec],
) -> pdf_report::Result<Vec<ContentUnit<ImageContent>>> {
    let mut units = Vec::with_capacity(specs.len());
    for spec in specs {
        let content = ImageContent::open(&spec.path).await?;
        log::debug!("Loaded {}", spec.path.display());
        units.push(ContentUnit {
            content,
            page_break: spec.page_break,
            custom_height: spec.custom_height,
        });
    }
    Ok(units)
}

async fn handle_export(
    specs: Vec<ImageUnitSpec>,
    overrides: ExportOverrides,
    output_dir: PathBuf,
    update_tx: &mpsc::UnboundedSender<ExportUpdate>,
) {
    let progress_tx = update_tx.clone();
    let exporter = Exporter::new(
        ExportConfiguration::from_overrides(overrides),
        SurfaceRenderer::new(),
    )
    .with_progress(move |progress| {
        if let Some(update) = progress_update(progress) {
            let _ = progress_tx.send(update);
        }
    });

    let result = async {
        let units = load_image_units(&specs).await?;
        exporter.export_to_dir(&units, &output_dir).await
    }
    .await;

    let update = match result {
        Ok((path, artifact)) => ExportUpdate::Complete {
            path,
            filename: artifact.filename,
            page_count: artifact.page_count,
        },
        Err(e) => {
            log::error!("Export command failed: {}", e);
            ExportUpdate::Failed {
                message: e.user_message().to_string(),
            }
        }
    };
    let _ = update_tx.send(update);
}

async fn handle_plan(
    specs: Vec<ImageUnitSpec>,
    overrides: ExportOverrides,
    update_tx: &mpsc::UnboundedSender<ExportUpdate>,
) {
    let config = ExportConfiguration::from_overrides(overrides);
    let result = async {
        let units = load_image_units(&specs).await?;
        calculate_statistics(&units, &config)
    }
    .await;

    let update = match result {
        Ok(stats) => ExportUpdate::Planned { stats },
        Err(e) => {
            log::error!("Plan command failed: {}", e);
            ExportUpdate::Failed {
                message: e.user_message().to_string(),
            }
        }
    };
    let _ = update_tx.send(update);
}

fn progress_update(progress: ExportProgress) -> Option<ExportUpdate> {
    match progress {
        ExportProgress::UnitRendered {
            unit, total_units, ..
        } => Some(ExportUpdate::Progress {
            operation: "Rendering content".to_string(),
            current: unit + 1,
            total: total_units,
        }),
        ExportProgress::Serialized { .. } => Some(ExportUpdate::Progress {
            operation: "Writing PDF".to_string(),
            current: 1,
            total: 1,
        }),
        ExportProgress::CoverPage { .. } | ExportProgress::Overlaid { .. } => None,
    }
}
