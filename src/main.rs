use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod controller;
mod dashboard;
mod domain;
mod engine;
mod inputter;
mod model;
mod surface;
mod table;
mod ui;

use catalog::Category;
use controller::Controller;
use dashboard::Dashboard;
use domain::{Config, SightingsError};
use model::{Model, Status};
use surface::{Page, Surface};
use table::Dataset;
use ui::TableUI;

/// Browse a table of sightings and filter it by date, city, state, country or shape.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Dataset to show (csv, json or parquet)
    path: String,

    /// Category that is active at startup (Date, City, State, Country, Shape)
    #[arg(short, long, default_value = "Date", value_parser = parse_category)]
    category: Category,

    /// Filter value submitted at startup
    #[arg(short, long)]
    filter: Option<String>,

    /// Print the rendered rows tab separated instead of starting the UI
    #[arg(short, long)]
    print: bool,

    /// Event poll time in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Widest a column is drawn
    #[arg(long, default_value_t = 40)]
    max_column_width: usize,

    /// Where log output goes, the terminal belongs to the UI
    #[arg(long, default_value = "sightings.log")]
    log_file: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse::<Category>().map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(args: &Args) -> Result<(), SightingsError> {
    let file = File::create(&args.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(tracing_error::ErrorLayer::default())
        .try_init()
        .map_err(|e| SightingsError::Logging(e.to_string()))
}

fn run(args: Args) -> Result<(), SightingsError> {
    init_logging(&args)?;

    let path = shellexpand::full(&args.path)
        .map_err(|e| SightingsError::LoadingFailed(e.to_string()))?
        .into_owned();
    info!("Starting sightings with {path}");
    let dataset = Dataset::load(PathBuf::from(path))?;

    let cfg = Config::default()
        .with_event_poll_time(args.poll_ms)
        .with_max_column_width(args.max_column_width)
        .with_initial_category(args.category);

    if args.print {
        return print_table(dataset, &cfg, args.filter.as_deref());
    }

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &cfg, dataset, args.filter.as_deref());
    ratatui::restore();
    info!("Bye");
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    cfg: &Config,
    dataset: Dataset,
    filter: Option<&str>,
) -> Result<(), SightingsError> {
    let size = terminal.size()?;
    let mut model = Model::init(cfg, dataset, size.width as usize, size.height as usize);
    if let Some(filter) = filter {
        model.apply_filter(filter);
    }

    let mut ui = TableUI::new();
    let controller = Controller::new(cfg);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }
    Ok(())
}

fn print_table(
    dataset: Dataset,
    cfg: &Config,
    filter: Option<&str>,
) -> Result<(), SightingsError> {
    let mut out = std::io::stdout().lock();
    write_table(&mut out, dataset, cfg, filter)
}

/// Writes the header and the rendered rows tab separated.
fn write_table<W: Write>(
    out: &mut W,
    dataset: Dataset,
    cfg: &Config,
    filter: Option<&str>,
) -> Result<(), SightingsError> {
    let page = Page::new(dataset.header, dataset.widths);
    let mut dashboard = Dashboard::mount(Arc::new(dataset.records), page, cfg.initial_category);
    if let Some(value) = filter {
        dashboard.surface_mut().set_value(value);
        dashboard.submit();
    }
    let page = dashboard.unmount();

    writeln!(out, "{}", page.header.join("\t"))?;
    for row in &page.rows {
        writeln!(out, "{}", row.join("\t"))?;
    }
    Ok(())
}
