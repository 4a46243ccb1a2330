use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_async_runtime::{
    DiagnosticLog, ExportCommand, ExportOverrides, ExportUpdate, ImageUnitSpec, worker_task,
};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "pdft", about = "Paginate rendered reports into PDF", version)]
struct Cli {
    /// Print the diagnostic log after the command
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export image files as one paginated PDF
    Export {
        #[command(flatten)]
        report: ReportArgs,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Show the predicted page layout without writing a PDF
    Plan {
        #[command(flatten)]
        report: ReportArgs,
    },

    /// Print the download name a filename would be saved under
    Sanitize {
        name: String,
    },
}

#[derive(Args)]
struct ReportArgs {
    /// Input images, one content unit each, in order
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// JSON file with export options; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output filename
    #[arg(long)]
    filename: Option<String>,

    /// Paper format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Paper orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Raster scale factor
    #[arg(long)]
    scale: Option<f32>,

    /// JPEG quality (0-1)
    #[arg(long)]
    quality: Option<f32>,

    /// Embed pages losslessly instead of as JPEG
    #[arg(long)]
    lossless: bool,

    /// Margin in points (uniform on all sides)
    #[arg(long)]
    margin: Option<f32>,

    /// Cover page PDF (path or http(s) URL)
    #[arg(long)]
    cover: Option<String>,

    /// Diagonal watermark text
    #[arg(long)]
    watermark: Option<String>,

    /// Input numbers (1-based) that start with a page break
    #[arg(long, num_args = 1..)]
    page_break: Vec<usize>,

    /// Per-input slice height as N=POINTS (1-based input number)
    #[arg(long, num_args = 1.., value_parser = parse_custom_height)]
    custom_height: Vec<(usize, f32)>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    A4,
    Letter,
    Legal,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<FormatArg> for pdf_report::PaperFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::A4 => Self::A4,
            FormatArg::Letter => Self::Letter,
            FormatArg::Legal => Self::Legal,
        }
    }
}

impl From<OrientationArg> for pdf_report::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

fn parse_custom_height(value: &str) -> std::result::Result<(usize, f32), String> {
    let (unit, height) = value
        .split_once('=')
        .ok_or_else(|| format!("expected N=POINTS, got '{}'", value))?;
    let unit = unit
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid input number '{}': {}", unit, e))?;
    let height = height
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("invalid height '{}': {}", height, e))?;
    Ok((unit, height))
}

impl ReportArgs {
    fn units(&self) -> Vec<ImageUnitSpec> {
        self.input
            .iter()
            .enumerate()
            .map(|(i, path)| ImageUnitSpec {
                path: path.clone(),
                page_break: self.page_break.contains(&(i + 1)),
                custom_height: self
                    .custom_height
                    .iter()
                    .rev()
                    .find(|(unit, _)| *unit == i + 1)
                    .map(|(_, height)| *height),
            })
            .collect()
    }

    /// Options file first, then flags on top.
    async fn overrides(&self) -> Result<ExportOverrides> {
        let base = match &self.config {
            Some(path) => ExportOverrides::load(path).await?,
            None => ExportOverrides::default(),
        };

        let flags = ExportOverrides {
            filename: self.filename.clone(),
            orientation: self.orientation.map(Into::into),
            format: self.format.map(Into::into),
            margins: self.margin.map(pdf_report::Margins::uniform),
            scale: self.scale,
            quality: self.quality,
            encoding: self.lossless.then_some(pdf_report::ImageEncoding::Lossless),
            include_cover_page: self.cover.as_ref().map(|_| true),
            cover_page_url: self.cover.clone(),
            cover_fetch_timeout_secs: None,
            watermark: self.watermark.clone(),
        };

        Ok(base.merge(flags))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log = DiagnosticLog::new(500).with_level(if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
    log.clone().init()?;

    let result = run(cli.command).await;

    if cli.verbose {
        for entry in log.entries() {
            eprintln!("{}", entry);
        }
    }
    result
}

async fn run(command: Commands) -> Result<()> {
    let command = match command {
        Commands::Sanitize { name } => {
            println!("{}", pdf_report::download_name(&name));
            return Ok(());
        }
        Commands::Export { report, output } => ExportCommand::Export {
            units: report.units(),
            overrides: report.overrides().await?,
            output_dir: output,
        },
        Commands::Plan { report } => ExportCommand::Plan {
            units: report.units(),
            overrides: report.overrides().await?,
        },
    };

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    command_tx.send(command)?;
    drop(command_tx);

    let print_updates = async {
        let mut failure = None;
        while let Some(update) = update_rx.recv().await {
            match update {
                ExportUpdate::Progress {
                    operation,
                    current,
                    total,
                } => println!("{} ({}/{})", operation, current, total),
                ExportUpdate::Planned { stats } => {
                    println!("Export Plan:");
                    println!(
                        "  Page size: {:.1} x {:.1} pt",
                        stats.page_geometry.width_pt, stats.page_geometry.height_pt
                    );
                    println!("  Cover pages: {}", stats.cover_pages);
                    for unit in &stats.units {
                        println!(
                            "  Input {}: {}x{} px, slice {:.1} px → {} pages",
                            unit.unit + 1,
                            unit.width_px,
                            unit.height_px,
                            unit.slice_height_px,
                            unit.pages
                        );
                    }
                    println!("  Total pages: {}", stats.total_pages);
                }
                ExportUpdate::Complete {
                    path, page_count, ..
                } => println!("Exported {} pages → {}", page_count, path.display()),
                ExportUpdate::Failed { message } => failure = Some(message),
            }
        }
        failure
    };

    let ((), failure) = tokio::join!(worker_task(command_rx, update_tx), print_updates);
    if let Some(message) = failure {
        bail!(message);
    }
    Ok(())
}
