use clap::Parser;
use folder_watermark::types::{ColorMode, PositionMode, WatermarkRequest, parse_same_folder_flag};
use folder_watermark::{config, output, process};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folder-watermark")]
#[command(about = "Stamp a text watermark on every image in a directory tree")]
#[command(long_about = "\
Stamp a text watermark on every image in a directory tree

Every .png, .jpg, .jpeg, .webp and .tiff file under INPUT is stamped and
written, in its original format, to a sibling folder named INPUT_TEXT that
mirrors the input layout. Source files are never modified.

  photos/                     photos_DRAFT/
  ├── a.jpg            →      ├── a.jpg
  ├── notes.txt               └── trip/
  └── trip/                       └── b.png
      └── b.png

Positions:  1 top-left, 2 top-right, 3 bottom-left, 4 bottom-right, 5 center,
            or random (a new draw per image)
Colors:     red, yellow, green, orange, #RRGGBB, or random

With a random color, every image in a folder shares one color unless
SAME_FOLDER is no/false/0/n.

Run 'folder-watermark --gen-config' to print a documented watermark.toml.")]
#[command(version)]
struct Cli {
    /// Directory to watermark
    #[arg(required_unless_present = "gen_config")]
    input: Option<PathBuf>,

    /// Watermark text, used verbatim
    #[arg(default_value = "WATERMARK")]
    text: String,

    /// 1-5, a position name, or random
    #[arg(default_value = "random")]
    position: String,

    /// Palette name, hex color, or random
    #[arg(default_value = "random")]
    color: String,

    /// Same color for every image in a folder (no/false/0/n to disable)
    same_folder: Option<String>,

    /// Config file (default: watermark.toml in the input directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Font file, overriding font.path from the config
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output directory (default: INPUT_TEXT next to the input)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write a JSON report of every stamped and failed file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print a stock watermark.toml with all options documented
    #[arg(long)]
    gen_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }
    let Some(input) = cli.input.clone() else {
        return Err("an input directory is required".into());
    };

    let request = build_request(&cli);

    let mut settings = config::load_config(cli.config.as_deref(), &input)?;
    if let Some(font) = &cli.font {
        settings.font.path = font.clone();
    }
    init_thread_pool(&settings.processing);

    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| process::output_dir_for(&input, &request.text));
    output::print_run_header(&input, &output_dir, &request);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = process::process(&request, &input, &output_dir, &settings, Some(tx))?;
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;

    output::print_summary(&result);

    if let Some(report) = &cli.report {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(report, json)?;
        println!("Report: {}", report.display());
    }

    Ok(())
}

/// Turn the positional selectors into a request, falling back on anything
/// unrecognized.
fn build_request(cli: &Cli) -> WatermarkRequest {
    let position = cli.position.parse().unwrap_or_else(|err| {
        tracing::warn!(%err, fallback = %PositionMode::FALLBACK, "using fallback position");
        PositionMode::FALLBACK
    });
    let color = cli.color.parse().unwrap_or_else(|err| {
        tracing::warn!(%err, fallback = %ColorMode::FALLBACK, "using fallback color");
        ColorMode::FALLBACK
    });
    WatermarkRequest {
        text: cli.text.clone(),
        position,
        color,
        same_folder_same_color: parse_same_folder_flag(cli.same_folder.as_deref()),
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
