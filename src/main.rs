use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use scatter_vector::logging::{init_logging, LogConfig};
use scatter_vector::parser::{parse_gestures, Gesture, GestureAction};
use scatter_vector::{
    FileSource, OutputFormat, PixelRect, RenderOptions, ScatterVector, ScatterVectorConfig,
};
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Png,
    Svg,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => OutputFormat::Png,
            Format::Svg => OutputFormat::Svg,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "scatter-vector")]
#[command(about = "Plot one column against many as a row of linked scatterplots", long_about = None)]
struct Args {
    /// CSV or JSON data file, `-` for CSV on stdin
    data: Option<String>,

    /// Column drawn on the shared vertical axis
    #[arg(short, long)]
    primary: String,

    /// Categorical columns forming the color group
    #[arg(long, value_delimiter = ',')]
    factors: Vec<String>,

    /// Numeric columns to plot against the primary
    #[arg(long, value_delimiter = ',')]
    values: Vec<String>,

    /// Panel edge length in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Inset within each panel
    #[arg(long)]
    padding: Option<u32>,

    /// JSON configuration file; command line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "svg")]
    format: Format,

    /// Write the image here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Brush gesture, e.g. 'pl: 10,10 -> 60,80' or '#0: clear'
    #[arg(long)]
    brush: Vec<String>,

    /// Write the selected rows as CSV
    #[arg(long)]
    selection: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_config = LogConfig::from_verbosity(args.verbose)
        .with_ansi(io::stderr().is_terminal())
        .with_target(args.verbose >= 2);
    init_logging(&log_config)
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;

    // Parse gesture scripts before touching the data
    let mut gestures = Vec::new();
    for script in &args.brush {
        match parse_gestures(script) {
            Ok((_, parsed)) => gestures.extend(parsed),
            Err(e) => {
                eprintln!("Parse error: {:?}", e);
                std::process::exit(1);
            }
        }
    }

    let config = build_config(&args)?;
    let mut plot = ScatterVector::new(config).context("Invalid configuration")?;
    plot.draw(&args.primary, &FileSource)
        .context("Failed to draw plot")?;

    for gesture in &gestures {
        replay(&mut plot, gesture)?;
    }

    if let Some(path) = &args.selection {
        write_selection(&plot, path)?;
    }

    let options = RenderOptions {
        format: args.format.into(),
        ..RenderOptions::default()
    };
    let bytes = plot.render(&options).context("Failed to render plot")?;

    match &args.output {
        Some(path) => {
            fs::write(path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = bytes.len(), "wrote image");
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&bytes)
                .context("Failed to write image to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

/// Merge the optional config file with command line flags.
fn build_config(args: &Args) -> Result<ScatterVectorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            ScatterVectorConfig::from_json(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => ScatterVectorConfig::new(""),
    };

    if let Some(data) = &args.data {
        config.url = data.clone();
    }
    if !args.factors.is_empty() {
        config.factors = args.factors.clone();
    }
    if !args.values.is_empty() {
        config.values = args.values.clone();
    }
    if let Some(size) = args.size {
        config.size = size;
    }
    if let Some(padding) = args.padding {
        config.padding = padding;
    }
    debug!(?config, "effective configuration");
    Ok(config)
}

fn replay(plot: &mut ScatterVector, gesture: &Gesture) -> Result<()> {
    let Some(panel) = gesture.panel.resolve(plot.panels()) else {
        bail!("no panel matches {:?}", gesture.panel);
    };

    plot.brush_start(panel)?;
    if let GestureAction::Drag { from, to } = gesture.action {
        plot.brush_move(panel, PixelRect::new(from, to))?;
    }
    let transition = plot.brush_end(panel)?;
    debug!(panel, ?transition, "replayed gesture");
    Ok(())
}

fn write_selection(plot: &ScatterVector, path: &Path) -> Result<()> {
    let Some(dataset) = plot.dataset() else {
        bail!("no data loaded");
    };
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(dataset.columns())?;

    let rows = plot.selected_rows();
    for row in &rows {
        writer.write_record(row.cells().iter().map(|cell| cell.raw()))?;
    }
    writer.flush()?;
    info!(rows = rows.len(), path = %path.display(), "wrote selection");
    Ok(())
}
