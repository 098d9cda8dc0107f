use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use wdi_explore::api::Client;
use wdi_explore::config::AnalysisConfig;
use wdi_explore::pipeline;
use wdi_explore::viz::{OutputFormat, PlottersRenderer};

#[derive(Parser, Debug)]
#[command(
    name = "wdi-explore",
    version,
    about = "Describe, correlate and chart World Bank development indicators"
)]
struct Cli {
    /// JSON analysis configuration (defaults to the built-in seven-country report).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Read `<code>.xlsx` / `<code>.xls` workbooks from this directory instead of downloading.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Override the download base URL.
    #[arg(long)]
    base_url: Option<String>,
    /// Directory for rendered figures.
    #[arg(long, default_value = "figures")]
    out_dir: PathBuf,
    /// Image format of rendered figures.
    #[arg(long, value_enum, default_value_t = Format::Svg)]
    format: Format,
    /// Figure width in pixels.
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Figure height in pixels.
    #[arg(long, default_value_t = 800)]
    height: u32,
    /// Print every loaded table before the analysis.
    #[arg(long, default_value_t = false)]
    show_tables: bool,
    /// Print the effective configuration as JSON and exit.
    #[arg(long, default_value_t = false)]
    print_config: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Svg,
    Png,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Svg => OutputFormat::Svg,
            Format::Png => OutputFormat::Png,
        }
    }
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = Cli::parse();
    log::debug!("{args:#?}");

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(url) = &args.base_url {
        config.base_url = url.clone();
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.print_config {
        serde_json::to_writer_pretty(&mut out, &config).context("failed to print config")?;
        writeln!(out)?;
        return Ok(());
    }

    let client = Client::with_base_url(config.base_url.clone());
    let loaded = pipeline::load_all(&config, &client, args.data_dir.as_deref())?;

    let mut renderer = PlottersRenderer::new(args.format.into(), args.width, args.height)
        .with_out_dir(&args.out_dir);
    let artifacts = pipeline::analyze(&config, &loaded, &mut renderer, &mut out, args.show_tables)?;

    log::info!(
        "rendered {} figures into {}",
        artifacts.len(),
        args.out_dir.display()
    );
    Ok(())
}
