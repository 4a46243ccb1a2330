use std::path::PathBuf;

mod logger;
mod worker;

pub use logger::{DiagnosticLog, LogEntry};
pub use worker::{load_image_units, worker_task};

// Re-export types from the library crate
pub use pdf_report::{ExportConfiguration, ExportOverrides, ExportStatistics};

/// An image file to paginate as one content unit
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUnitSpec {
    pub path: PathBuf,
    pub page_break: bool,
    pub custom_height: Option<f32>,
}

impl ImageUnitSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            page_break: false,
            custom_height: None,
        }
    }
}

/// Commands sent from the host to the worker
#[derive(Debug)]
pub enum ExportCommand {
    Export {
        units: Vec<ImageUnitSpec>,
        overrides: ExportOverrides,
        output_dir: PathBuf,
    },
    Plan {
        units: Vec<ImageUnitSpec>,
        overrides: ExportOverrides,
    },
}

/// Updates sent from the worker to the host
#[derive(Debug, Clone)]
pub enum ExportUpdate {
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    Planned {
        stats: ExportStatistics,
    },
    Complete {
        path: PathBuf,
        filename: String,
        page_count: usize,
    },
    /// Carries a message fit for end users; details go to the log
    Failed {
        message: String,
    },
}
