//! `biogenesis` terminal front end.
//!
//! # Responsibility
//! - Parse flags, bootstrap config and file logging, build the dataset.
//! - Adapt the core surfaces (cards, status line, map) to plain text.
//!
//! Simulated query failures are display state, not process errors; only
//! bootstrap problems make the binary exit non-zero.

use anyhow::{bail, Context, Result};
use biogenesis_core::{
    default_log_level, generate, init_logging, CoreConfig, DistributionSummary, GeoPoint,
    InMemoryPlantRepository, InputDecision, LogLevel, MapController, MapSurface,
    PlantRepository, ProgressSchedule, ProgressTimer, RandomSource, RenderSurface,
    RenderedList, ReporterStatus, SearchSession, Severity, SimulatedQueryService, SortOrder,
    SortSpec, StatusLine, StatusReporter, StdRandom, UiEvent, Workbench, PROGRESS_DONE,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Debug, Parser)]
#[command(name = "biogenesis", version, about = "Synthetic plant genetics workbench")]
struct Cli {
    /// JSON config file; missing fields use defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Seed for reproducible datasets, latencies and failures.
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Enables rolling file logs in this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[arg(long, global = true, default_value_t = default_log_level().to_string())]
    log_level: String,
    /// Prints the in-memory status log before exiting.
    #[arg(long, global = true)]
    show_log: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Shows the full dataset.
    List(SortArgs),
    /// Runs one query through the simulated service.
    Search {
        query: String,
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Shows the distribution view of one record.
    Map { id: String },
    /// Reads search input and `:commands` from stdin.
    Interactive,
}

#[derive(Debug, Args)]
struct SortArgs {
    /// name_asc, id_desc, iucn_risk, location_name, ...
    #[arg(long, default_value = "id_asc")]
    sort: SortSpec,
    /// Overrides the direction of `--sort`.
    #[arg(long)]
    order: Option<SortOrder>,
}

impl SortArgs {
    fn spec(&self) -> SortSpec {
        match self.order {
            Some(order) => self.sort.with_order(order),
            None => self.sort,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(dir) = &cli.log_dir {
        let dir = absolute_dir(dir)?;
        init_logging(&cli.log_level, &dir.to_string_lossy())
            .map_err(anyhow::Error::msg)
            .context("failed to start file logging")?;
    }

    let config = match &cli.config {
        Some(path) => CoreConfig::load(path)
            .with_context(|| format!("failed to load config `{}`", path.display()))?,
        None => CoreConfig::default(),
    };

    let mut rng: Box<dyn RandomSource> = match cli.seed {
        Some(seed) => Box::new(StdRandom::seeded(seed)),
        None => Box::new(StdRandom::from_os()),
    };
    let reporter = StatusReporter::from_config(&config);
    let dataset = generate(config.dataset_size, rng.as_mut());
    let repo = Arc::new(
        InMemoryPlantRepository::with_records(dataset)
            .context("generated dataset failed validation")?,
    );
    let service = SimulatedQueryService::new(
        Arc::clone(&repo),
        reporter.clone(),
        fork(rng.as_mut()),
        &config,
    );
    log::info!(
        "event=cli_start module=cli status=ok records={} seed={:?}",
        repo.len()?,
        cli.seed
    );

    match &cli.command {
        Command::List(sort) => {
            let mut session =
                SearchSession::new(repo.snapshot()?, reporter.clone(), config.max_results);
            session.on_sort_change(sort.spec());
            print_session(&session);
        }
        Command::Search { query, sort } => {
            let mut session =
                SearchSession::new(repo.snapshot()?, reporter.clone(), config.max_results);
            session.on_sort_change(sort.spec());
            if let InputDecision::Dispatch(ticket) = session.on_input(query) {
                let outcome = service.query(&ticket.query).await;
                session.on_query_result(&ticket, outcome);
            }
            print_session(&session);
        }
        Command::Map { id } => {
            let Some(record) = repo.get_plant(id)? else {
                reporter.log(LogLevel::Critical, format!("plant details not found: {id}"));
                dump_log_if(cli.show_log, &reporter);
                bail!("plant `{id}` not found");
            };
            let mut map = MapController::new(TerminalMap, config.map);
            map.show_distribution(&record, rng.as_mut());
        }
        Command::Interactive => {
            run_loader(&config, fork(rng.as_mut())).await;
            let workbench = Workbench::new(
                service,
                &config,
                TerminalView,
                TerminalStatus::default(),
                TerminalMap,
                fork(rng.as_mut()),
            )?;
            let (tx, rx) = mpsc::unbounded_channel();
            let settle = config.debounce() + Duration::from_millis(config.latency_max_ms);
            let (summary, input) =
                tokio::join!(workbench.run(rx), read_events(tx, repo.as_ref(), settle));
            input?;
            println!(
                "queries issued: {}, stale results dropped: {}, critical errors: {}",
                summary.queries_issued, summary.stale_dropped, summary.critical_count
            );
        }
    }

    dump_log_if(cli.show_log, &reporter);
    Ok(())
}

/// Child source derived from `rng`, so one `--seed` fixes every stream.
fn fork(rng: &mut dyn RandomSource) -> Box<dyn RandomSource> {
    Box::new(StdRandom::seeded(rng.next_below(u64::MAX)))
}

fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    Ok(cwd.join(dir))
}

async fn run_loader(config: &CoreConfig, rng: Box<dyn RandomSource>) {
    let mut loader = ProgressTimer::new();
    let mut progress = loader.start(ProgressSchedule::Loader, config.loader_tick(), rng);
    while *progress.borrow_and_update() < PROGRESS_DONE {
        if progress.changed().await.is_err() {
            break;
        }
        eprint!("\rloading genetic archive {:>3}%", *progress.borrow());
    }
    eprintln!();
}

/// Feeds stdin lines to the workbench until `:quit` or end of input.
async fn read_events(
    tx: mpsc::UnboundedSender<UiEvent>,
    repo: &InMemoryPlantRepository,
    settle: Duration,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let event = match parse_line(&line, repo) {
            Ok(event) => event,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        let quit = event == UiEvent::Shutdown;
        if tx.send(event).is_err() || quit {
            return Ok(());
        }
    }
    // Piped input ends early; let the last query land before stopping.
    tokio::time::sleep(settle).await;
    let _ = tx.send(UiEvent::Shutdown);
    Ok(())
}

fn parse_line(line: &str, repo: &InMemoryPlantRepository) -> Result<UiEvent, String> {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Ok(UiEvent::Input(line.to_string()));
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match name {
        "sort" => arg
            .parse()
            .map(UiEvent::SortChanged)
            .map_err(|err| format!("{err}")),
        "map" if !arg.is_empty() => {
            // Unknown ids still go through so the workbench can flag them.
            let (coordinates, polygon) = match repo.get_plant(arg) {
                Ok(Some(record)) => (record.coordinates, record.distribution_polygon),
                _ => (GeoPoint::default(), Vec::new()),
            };
            Ok(UiEvent::ShowOnMap {
                id: arg.to_string(),
                coordinates,
                polygon,
            })
        }
        "details" if !arg.is_empty() => Ok(UiEvent::ShowDetails {
            id: arg.to_string(),
        }),
        "analysis" => Ok(UiEvent::RunAnalysis),
        "openmap" => Ok(UiEvent::OpenMap),
        "close" => Ok(UiEvent::CloseMap),
        "quit" | "q" => Ok(UiEvent::Shutdown),
        _ => Err(format!(
            "unknown command `:{command}`; try :sort, :map, :openmap, :details, :analysis, :close, :quit"
        )),
    }
}

fn print_session(session: &SearchSession) {
    let display = session.display();
    println!("critical species: {}", display.critical_count);
    print_cards(&display.list);
    if let Some(banner) = &display.banner {
        println!("[{}] {}", banner.severity.log_level(), banner.message);
    }
}

fn print_cards(list: &RenderedList) {
    for card in &list.cards {
        println!(
            "{:<7} {:<2}  {} ({}) | {} | {} | {} | folding {} {:.2} | anomaly {:.3}",
            card.id,
            card.iucn_code,
            card.name,
            card.scientific_name,
            card.family,
            card.habitat,
            card.elevation,
            card.folding_status.label(),
            card.folding_score,
            card.anomaly_index
        );
    }
    println!("{} result(s)", list.count);
}

fn dump_log_if(enabled: bool, reporter: &StatusReporter) {
    if !enabled {
        return;
    }
    println!("--- status log (newest first) ---");
    for entry in reporter.entries() {
        println!("{}", entry.display_line(true));
    }
}

struct TerminalView;

impl RenderSurface for TerminalView {
    fn render(&mut self, list: &RenderedList) {
        print_cards(list);
    }
}

#[derive(Default)]
struct TerminalStatus {
    last_banner: Option<(Severity, String)>,
    last_critical: Option<usize>,
    last_reports: Option<ReporterStatus>,
}

impl StatusLine for TerminalStatus {
    fn show(&mut self, severity: Severity, message: &str) {
        let banner = (severity, message.to_string());
        if self.last_banner.as_ref() == Some(&banner) {
            return;
        }
        println!("[{}] {message}", severity.log_level());
        self.last_banner = Some(banner);
    }

    fn critical_species(&mut self, count: usize) {
        if self.last_critical != Some(count) {
            println!("critical species: {count}");
            self.last_critical = Some(count);
        }
    }

    fn error_reports(&mut self, status: ReporterStatus) {
        if self.last_reports == Some(status) {
            return;
        }
        if status.critical > 0 {
            let last = status
                .last_report_at
                .map(|at| at.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "error reports: {} queued, {} critical, last {last}",
                status.reports, status.critical
            );
        }
        self.last_reports = Some(status);
    }

    fn progress(&mut self, percent: u8) {
        if percent % 25 == 0 {
            println!("analysis {percent}%");
        }
    }
}

struct TerminalMap;

impl MapSurface for TerminalMap {
    fn set_view(&mut self, center: GeoPoint, zoom: u8) {
        println!("map: view {center} zoom {zoom}");
    }

    fn fit_bounds(&mut self, polygon: &[GeoPoint]) {
        println!("map: fit {} point(s)", polygon.len());
    }

    fn outline(&mut self, polygon: &[GeoPoint]) {
        let points = polygon
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        println!("map: outline {points}");
    }

    fn place_marker(&mut self, position: GeoPoint, label: &str) {
        println!("map: marker {label} @ {position}");
    }

    fn clear_overlays(&mut self) {}

    fn show_summary(&mut self, summary: &DistributionSummary) {
        println!(
            "{} {} | {} | {} | elevation {} | {} | {} sample(s)",
            summary.id,
            summary.name,
            summary.habitat,
            summary.coordinates,
            summary.elevation,
            summary.iucn_status.label(),
            summary.sample_count
        );
    }
}
