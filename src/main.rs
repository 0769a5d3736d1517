use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use streamcharts::chart::{self, ChartParams, RawParams};
use streamcharts::dataset::{genre_options, Dataset};
use streamcharts::report::{self, Summary};
use streamcharts::{format_number, Config};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "streamcharts")]
#[command(author, version, about = "Sankey and parallel-coordinates charts for streaming platform data")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// CSV file with one song per row (optional in GUI mode)
    path: Option<PathBuf>,

    /// Launch GUI file picker
    #[arg(long)]
    gui: bool,

    #[command(flatten)]
    selection: Selection,

    /// Output report file (.html, .json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for auto-generated reports
    #[arg(long, default_value = "streamcharts-reports")]
    report_dir: PathBuf,

    /// Don't auto-generate an HTML report
    #[arg(long)]
    no_report: bool,

    /// Don't prompt to open report
    #[arg(long)]
    no_open: bool,

    /// Config file (default: nearest streamcharts.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Selector values shared by the report and subcommands
#[derive(ClapArgs, Debug, Clone, Default)]
struct Selection {
    /// Sankey platform filter ("all" or a platform id such as Apple_Music)
    #[arg(long)]
    platform: Option<String>,

    /// Genre filter for the parallel plot ("all" or a substring)
    #[arg(long)]
    genre: Option<String>,

    /// Top fraction per platform counted as passing (0 disables thresholds)
    #[arg(long)]
    percentile: Option<f64>,
}

impl From<Selection> for RawParams {
    fn from(s: Selection) -> Self {
        RawParams {
            platform: s.platform,
            genre: s.genre,
            percentile: s.percentile,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start interactive web UI
    Serve {
        /// CSV file to chart
        path: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,
    },

    /// Print Sankey nodes and links as JSON
    Sankey {
        path: PathBuf,

        #[arg(long, default_value = "all")]
        platform: String,
    },

    /// Print the parallel-coordinates chart as JSON
    Parallel {
        path: PathBuf,

        #[arg(long, default_value = "all")]
        genre: String,

        #[arg(long, default_value = "0")]
        percentile: f64,
    },

    /// List genre selector options
    Genres { path: PathBuf },

    /// Show per-platform threshold values
    Thresholds {
        path: PathBuf,

        #[arg(long, default_value = "all")]
        genre: String,

        #[arg(long, default_value = "0.25")]
        percentile: f64,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("streamcharts={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref()).context("loading configuration")?;

    // Handle subcommands first
    if let Some(cmd) = args.command {
        return run_command(cmd, &config);
    }

    let (path, use_gui) = resolve_path(&args)?;

    let dataset = Dataset::load(&path, &config);
    let params = ChartParams::parse(&args.selection.clone().into(), &config)?;
    let data = chart::render(&dataset, &params, &config)?;
    let summary = Summary::from_chart(&data);

    if !args.quiet {
        print_summary(&path, &params, &summary);
    }

    // Determine report path
    let report_path = if let Some(ref output) = args.output {
        Some(output.clone())
    } else if !args.no_report {
        std::fs::create_dir_all(&args.report_dir)
            .with_context(|| format!("creating {}", args.report_dir.display()))?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        Some(args.report_dir.join(format!("streamcharts_{}.html", timestamp)))
    } else {
        None
    };

    if let Some(ref output_path) = report_path {
        report::generate(output_path, &data)
            .with_context(|| format!("writing report {}", output_path.display()))?;
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());
        }

        if !args.no_open {
            maybe_open(output_path, use_gui, args.quiet);
        }
    }

    Ok(())
}

fn run_command(cmd: Command, config: &Config) -> Result<()> {
    match cmd {
        Command::Serve { path, port } => {
            streamcharts::serve::start(port, path, config.clone())?;
        }

        Command::Sankey { path, platform } => {
            let dataset = Dataset::load(&path, config);
            let raw = RawParams {
                platform: Some(platform),
                ..RawParams::default()
            };
            let params = ChartParams::parse(&raw, config)?;
            let sankey = chart::render_sankey(&dataset, &params.platform, config);
            println!("{}", serde_json::to_string_pretty(&sankey)?);
        }

        Command::Parallel { path, genre, percentile } => {
            let dataset = Dataset::load(&path, config);
            let params = ChartParams::parse(&selection(genre, percentile), config)?;
            let parallel = chart::render_parallel(&dataset, &params.genre, params.percentile, config)?;
            println!("{}", serde_json::to_string_pretty(&parallel)?);
        }

        Command::Genres { path } => {
            let dataset = Dataset::load(&path, config);
            for genre in genre_options(&dataset.records) {
                println!("{}", genre);
            }
        }

        Command::Thresholds { path, genre, percentile } => {
            let dataset = Dataset::load(&path, config);
            let params = ChartParams::parse(&selection(genre, percentile), config)?;
            let parallel = chart::render_parallel(&dataset, &params.genre, params.percentile, config)?;

            println!("{:<16} {:>14} {:>10}", "PLATFORM", "THRESHOLD", "PASSING");
            println!("{}", "-".repeat(42));
            for (i, axis) in parallel.axes.iter().enumerate() {
                let passing = parallel
                    .lines
                    .iter()
                    .filter(|l| {
                        parallel
                            .thresholds
                            .get(&axis.id)
                            .is_some_and(|t| l.values.get(i).copied().unwrap_or(0.0) >= *t)
                    })
                    .count();
                let threshold = parallel
                    .thresholds
                    .get(&axis.id)
                    .map(|t| format_number(*t))
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<16} {:>14} {:>10}", axis.label, threshold, passing);
            }
        }
    }

    Ok(())
}

fn selection(genre: String, percentile: f64) -> RawParams {
    RawParams {
        platform: None,
        genre: Some(genre),
        percentile: Some(percentile),
    }
}

fn print_summary(path: &Path, params: &ChartParams, summary: &Summary) {
    eprintln!("\x1b[1mstreamcharts\x1b[0m");
    eprintln!("{}", "─".repeat(60));
    eprintln!("Source:      {}", path.display());
    eprintln!(
        "Selection:   platform={} genre={} percentile={}",
        params.platform, params.genre, params.percentile
    );
    eprintln!("{}", "─".repeat(60));
    eprintln!("  Songs plotted:   {}", summary.songs);
    eprintln!("  Genres:          {}", summary.genres);
    eprintln!("  Sankey links:    {} ({} hits)", summary.links, summary.hits);

    if params.percentile > 0.0 {
        eprintln!("  Pass all:        {}", summary.top_performers);
        for (label, value) in &summary.thresholds {
            eprintln!("    {:<14} >= {}", label, format_number(*value));
        }
    }
}

fn resolve_path(args: &Args) -> Result<(PathBuf, bool)> {
    #[cfg(feature = "gui")]
    {
        if args.gui || args.path.is_none() {
            return match pick_path_gui() {
                Some(p) => Ok((p, true)),
                None => anyhow::bail!("No CSV file selected."),
            };
        }
    }

    #[cfg(not(feature = "gui"))]
    if args.gui {
        anyhow::bail!("GUI mode not available in this build");
    }

    match args.path.clone() {
        Some(p) => Ok((p, false)),
        None => anyhow::bail!("Usage: streamcharts <CSV>\nRun 'streamcharts --help' for more options."),
    }
}

#[cfg(feature = "gui")]
fn pick_path_gui() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select streaming dataset")
        .add_filter("CSV files", &["csv"])
        .pick_file()
}

fn maybe_open(path: &Path, use_gui: bool, quiet: bool) {
    if use_gui {
        // In GUI mode, auto-open the report (no prompt)
        let _ = open::that(path);
        return;
    }
    if quiet {
        return;
    }

    eprint!("\nOpen report in browser? [Y/n] ");
    io::stderr().flush().ok();

    let mut input = String::new();
    // EOF (no terminal attached) means no answer
    if matches!(io::stdin().read_line(&mut input), Ok(n) if n > 0) {
        let input = input.trim().to_lowercase();
        if input.is_empty() || input == "y" || input == "yes" {
            debug!(path = %path.display(), "opening report");
            if let Err(e) = open::that(path) {
                eprintln!("Failed to open report: {}", e);
            }
        }
    }
}
