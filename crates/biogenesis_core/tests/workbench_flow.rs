use biogenesis_core::{
    sentinel_record, CoreConfig, GeoPoint, InMemoryPlantRepository, InputDecision, IucnStatus,
    LogLevel, MapSurface, PlantRecord, PlantRepository, RenderSurface, RenderedList, RepoError,
    RepoResult, ReporterStatus, ScriptedRandom, SearchSession, Severity, SimulatedQueryService,
    SortKey, SortOrder, SortSpec, StatusLine, StatusReporter, UiEvent, Workbench,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

fn record(id: &str, name: &str, status: IucnStatus) -> PlantRecord {
    let mut record = PlantRecord {
        id: id.to_string(),
        name: name.to_string(),
        scientific_name: format!("{name} montana"),
        iucn_status: status,
        ..sentinel_record()
    };
    record.distribution_polygon = vec![
        GeoPoint::new(1.0, 1.0),
        GeoPoint::new(1.5, 1.0),
        GeoPoint::new(1.5, 1.5),
    ];
    record
}

fn fixture() -> Vec<PlantRecord> {
    vec![
        record("T-001", "Alpha Fern", IucnStatus::Lc),
        record("T-002", "Beta Moss", IucnStatus::Cr),
        record("T-003", "Genetica Rose", IucnStatus::Vu),
        record("T-004", "Delta Lily", IucnStatus::Cr),
        record("T-005", "Epsilon Reed", IucnStatus::En),
    ]
}

fn config() -> CoreConfig {
    CoreConfig {
        debounce_ms: 350,
        latency_min_ms: 500,
        latency_max_ms: 500,
        failure_rate: 0.0,
        ..CoreConfig::default()
    }
}

/// Records everything the workbench pushes to its surfaces.
#[derive(Clone, Default)]
struct Screen {
    renders: Arc<Mutex<Vec<Vec<String>>>>,
    banners: Arc<Mutex<Vec<(Severity, String)>>>,
    map_calls: Arc<Mutex<Vec<String>>>,
    reports: Arc<Mutex<Vec<ReporterStatus>>>,
}

impl Screen {
    fn last_render(&self) -> Vec<String> {
        self.renders.lock().last().cloned().unwrap_or_default()
    }

    fn last_banner(&self) -> (Severity, String) {
        self.banners.lock().last().cloned().unwrap()
    }
}

impl RenderSurface for Screen {
    fn render(&mut self, list: &RenderedList) {
        let ids = list.cards.iter().map(|card| card.id.clone()).collect();
        self.renders.lock().push(ids);
    }
}

impl StatusLine for Screen {
    fn show(&mut self, severity: Severity, message: &str) {
        self.banners.lock().push((severity, message.to_string()));
    }

    fn error_reports(&mut self, status: ReporterStatus) {
        self.reports.lock().push(status);
    }
}

impl MapSurface for Screen {
    fn set_view(&mut self, center: GeoPoint, zoom: u8) {
        self.map_calls.lock().push(format!("view {center} z{zoom}"));
    }
    fn fit_bounds(&mut self, polygon: &[GeoPoint]) {
        self.map_calls.lock().push(format!("fit {}", polygon.len()));
    }
    fn outline(&mut self, polygon: &[GeoPoint]) {
        self.map_calls.lock().push(format!("outline {}", polygon.len()));
    }
    fn place_marker(&mut self, _position: GeoPoint, label: &str) {
        self.map_calls.lock().push(format!("marker {label}"));
    }
    fn clear_overlays(&mut self) {
        self.map_calls.lock().push("clear".to_string());
    }
}

type TestBench = Workbench<InMemoryPlantRepository, Screen, Screen, Screen>;

fn workbench(screen: &Screen, config: &CoreConfig) -> (TestBench, StatusReporter) {
    let repo = Arc::new(InMemoryPlantRepository::with_records(fixture()).unwrap());
    let reporter = StatusReporter::new(500, 20, LogLevel::Debug);
    let service = SimulatedQueryService::new(
        repo,
        reporter.clone(),
        Box::new(ScriptedRandom::constant(0.5)),
        config,
    );
    let bench = Workbench::new(
        service,
        config,
        screen.clone(),
        screen.clone(),
        screen.clone(),
        Box::new(ScriptedRandom::constant(0.0)),
    )
    .unwrap();
    (bench, reporter)
}

#[tokio::test(start_paused = true)]
async fn typing_burst_issues_one_query_with_last_value() {
    let screen = Screen::default();
    let (bench, _reporter) = workbench(&screen, &config());
    let (tx, rx) = mpsc::unbounded_channel();

    let script = async move {
        for text in ["g", "ge", "gen", "gene", "genet"] {
            tx.send(UiEvent::Input(text.to_string())).unwrap();
            sleep(Duration::from_millis(50)).await;
        }
        sleep(Duration::from_secs(2)).await;
        tx.send(UiEvent::Shutdown).unwrap();
    };
    let (summary, ()) = tokio::join!(bench.run(rx), script);

    assert_eq!(summary.queries_issued, 1);
    assert_eq!(summary.stale_dropped, 0);
    assert_eq!(screen.last_render(), ["T-003"]);
    let (severity, message) = screen.last_banner();
    assert_eq!(severity, Severity::Success);
    assert!(message.starts_with("1 result(s)"));
}

#[tokio::test(start_paused = true)]
async fn one_character_input_never_reaches_the_service() {
    let screen = Screen::default();
    let (bench, _reporter) = workbench(&screen, &config());
    let (tx, rx) = mpsc::unbounded_channel();

    let script = async move {
        tx.send(UiEvent::Input("a".to_string())).unwrap();
        sleep(Duration::from_secs(2)).await;
        tx.send(UiEvent::Shutdown).unwrap();
    };
    let (summary, ()) = tokio::join!(bench.run(rx), script);

    assert_eq!(summary.queries_issued, 0);
    assert!(screen.last_render().is_empty());
    let (severity, message) = screen.last_banner();
    assert_eq!(severity, Severity::Info);
    assert!(message.contains("Minimum 2"));
}

#[tokio::test(start_paused = true)]
async fn slower_older_result_is_fenced_off() {
    let screen = Screen::default();
    let (bench, _reporter) = workbench(&screen, &config());
    let (tx, rx) = mpsc::unbounded_channel();

    let script = async move {
        tx.send(UiEvent::Input("alpha".to_string())).unwrap();
        // First query is dispatched at 350ms and lands at 850ms.
        sleep(Duration::from_millis(400)).await;
        tx.send(UiEvent::Input("delta".to_string())).unwrap();
        sleep(Duration::from_secs(3)).await;
        tx.send(UiEvent::Shutdown).unwrap();
    };
    let (summary, ()) = tokio::join!(bench.run(rx), script);

    assert_eq!(summary.queries_issued, 2);
    assert_eq!(summary.stale_dropped, 1);
    assert_eq!(screen.last_render(), ["T-004"]);
    assert!(!screen.renders.lock().iter().any(|ids| ids == &["T-001"]));
}

#[tokio::test(start_paused = true)]
async fn trigger_query_shows_critical_banner_and_empty_list() {
    let screen = Screen::default();
    let (bench, reporter) = workbench(&screen, &config());
    let (tx, rx) = mpsc::unbounded_channel();

    let script = async move {
        tx.send(UiEvent::Input("404s".to_string())).unwrap();
        sleep(Duration::from_secs(2)).await;
        tx.send(UiEvent::Shutdown).unwrap();
    };
    let (summary, ()) = tokio::join!(bench.run(rx), script);

    assert_eq!(summary.critical_count, 1);
    assert_eq!(reporter.critical_count(), 1);
    let widget = screen.reports.lock().last().copied().unwrap();
    assert_eq!(widget.critical, 1);
    assert_eq!(widget.reports, 1);
    assert!(widget.last_report_at.is_some());
    assert_eq!(screen.reports.lock()[0].critical, 0);
    assert!(screen.last_render().is_empty());
    let (severity, message) = screen.last_banner();
    assert_eq!(severity, Severity::Critical);
    assert!(message.starts_with("CRITICAL ERROR (40499)"));
}

#[tokio::test(start_paused = true)]
async fn sort_change_rederives_full_working_set() {
    let screen = Screen::default();
    let (bench, _reporter) = workbench(&screen, &config());
    assert_eq!(bench.session().display().critical_count, 2);
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(UiEvent::SortChanged(SortSpec::new(SortKey::Id, SortOrder::Desc)))
        .unwrap();
    tx.send(UiEvent::Shutdown).unwrap();
    let summary = bench.run(rx).await;

    assert_eq!(summary.queries_issued, 0);
    assert_eq!(
        screen.last_render(),
        ["T-005", "T-004", "T-003", "T-002", "T-001"]
    );
}

#[tokio::test(start_paused = true)]
async fn map_lookup_outlines_known_ids_and_flags_unknown_ones() {
    let screen = Screen::default();
    let (bench, reporter) = workbench(&screen, &config());
    let (tx, rx) = mpsc::unbounded_channel();

    let polygon = fixture()[1].distribution_polygon.clone();
    tx.send(UiEvent::ShowOnMap {
        id: "T-002".to_string(),
        coordinates: GeoPoint::new(1.2, 1.2),
        polygon,
    })
    .unwrap();
    tx.send(UiEvent::ShowOnMap {
        id: "T-999".to_string(),
        coordinates: GeoPoint::new(0.0, 0.0),
        polygon: Vec::new(),
    })
    .unwrap();
    tx.send(UiEvent::Shutdown).unwrap();
    bench.run(rx).await;

    let calls = screen.map_calls.lock().clone();
    assert_eq!(calls[..3], ["clear", "outline 3", "fit 3"]);
    assert!(calls[3].starts_with("marker Beta Moss"));

    let (severity, message) = screen.last_banner();
    assert_eq!(severity, Severity::Critical);
    assert!(message.contains("T-999"));
    assert!(reporter
        .entries()
        .iter()
        .any(|entry| entry.level == LogLevel::Critical && entry.message.contains("T-999")));
}

#[tokio::test(start_paused = true)]
async fn open_map_shows_default_viewport() {
    let screen = Screen::default();
    let (bench, _reporter) = workbench(&screen, &config());
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(UiEvent::OpenMap).unwrap();
    tx.send(UiEvent::Shutdown).unwrap();
    bench.run(rx).await;

    assert_eq!(
        screen.map_calls.lock().clone(),
        vec!["clear", "view 38.9637, 35.2433 z6"]
    );
}

#[tokio::test(start_paused = true)]
async fn details_request_logs_unavailable_warning() {
    let screen = Screen::default();
    let (bench, reporter) = workbench(&screen, &config());
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(UiEvent::ShowDetails {
        id: "T-001".to_string(),
    })
    .unwrap();
    tx.send(UiEvent::Shutdown).unwrap();
    bench.run(rx).await;

    assert_eq!(screen.last_banner().0, Severity::Warn);
    assert!(reporter
        .entries()
        .iter()
        .any(|entry| entry.level == LogLevel::Warn && entry.message.contains("T-001")));
}

#[tokio::test(start_paused = true)]
async fn analysis_runs_to_completion() {
    let screen = Screen::default();
    let config = CoreConfig {
        analysis_duration_ms: 1000,
        analysis_tick_ms: 50,
        ..config()
    };
    let (bench, reporter) = workbench(&screen, &config);
    let (tx, rx) = mpsc::unbounded_channel();

    let script = async move {
        tx.send(UiEvent::RunAnalysis).unwrap();
        sleep(Duration::from_secs(3)).await;
        tx.send(UiEvent::Shutdown).unwrap();
    };
    tokio::join!(bench.run(rx), script);

    assert_eq!(
        screen.last_banner(),
        (Severity::Success, "Genetic analysis complete.".to_string())
    );
    assert!(reporter
        .entries()
        .iter()
        .any(|entry| entry.message == "genetic analysis complete"));
}

/// Repository whose reads fail, for the unexpected-error path.
struct BrokenRepository;

impl PlantRepository for BrokenRepository {
    fn snapshot(&self) -> RepoResult<Arc<Vec<PlantRecord>>> {
        Err(RepoError::Unavailable("disk detached".to_string()))
    }

    fn get_plant(&self, _id: &str) -> RepoResult<Option<PlantRecord>> {
        Err(RepoError::Unavailable("disk detached".to_string()))
    }

    fn replace_all(&self, _records: Vec<PlantRecord>) -> RepoResult<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn unexpected_query_error_is_reported_and_clears_list() {
    let reporter = StatusReporter::new(200, 20, LogLevel::Debug);
    let service = SimulatedQueryService::new(
        Arc::new(BrokenRepository),
        reporter.clone(),
        Box::new(ScriptedRandom::constant(0.5)),
        &config(),
    );
    let mut session = SearchSession::new(Arc::new(fixture()), reporter.clone(), 20);
    assert_eq!(session.display().list.count, 5);

    let InputDecision::Dispatch(ticket) = session.on_input("alpha") else {
        panic!("two or more characters must dispatch");
    };
    let outcome = service.query(&ticket.query).await;
    assert!(outcome.is_err());
    session.on_query_result(&ticket, outcome);

    assert!(session.display().list.is_empty());
    let banner = session.display().banner.clone().unwrap();
    assert_eq!(banner.severity, Severity::Error);
    assert!(banner.message.starts_with("Network error"));
    assert_eq!(reporter.critical_count(), 1);
    assert_eq!(
        reporter.latest_error().unwrap().context,
        "search execution failed"
    );
}
