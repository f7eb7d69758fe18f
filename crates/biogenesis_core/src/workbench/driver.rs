//! Workbench event loop.
//!
//! # Responsibility
//! - Turn [`UiEvent`]s into session, map and analysis actions.
//! - Push every display change to the render surface and status line.
//!
//! # Invariants
//! - One task owns all state; queries run as futures polled by the loop.
//! - In-flight queries are dropped on shutdown, never awaited.

use crate::config::CoreConfig;
use crate::map::{MapController, MapSurface};
use crate::model::plant::{GeoPoint, PlantRecord};
use crate::progress::{ProgressSchedule, ProgressTimer, PROGRESS_DONE};
use crate::render::RenderSurface;
use crate::repo::plant_repo::{PlantRepository, RepoError};
use crate::rng::{RandomSource, StdRandom};
use crate::search::pipeline::SortSpec;
use crate::service::query_service::{QueryError, QueryResult, SimulatedQueryService};
use crate::status::level::{LogLevel, Severity};
use crate::status::reporter::ReporterStatus;
use crate::workbench::debounce::Debouncer;
use crate::workbench::session::{
    InputDecision, ResultDisposition, SearchSession, SearchTicket, StatusBanner,
};
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

type Settled = (SearchTicket, Result<QueryResult, QueryError>);

/// Status line and header counters.
pub trait StatusLine {
    fn show(&mut self, severity: Severity, message: &str);

    /// Header counter of critically endangered records.
    fn critical_species(&mut self, _count: usize) {}

    /// Analysis progress, 0..=100.
    fn progress(&mut self, _percent: u8) {}

    /// Error reporter widget: queued reports, critical counter, last report.
    fn error_reports(&mut self, _status: ReporterStatus) {}
}

impl<T: StatusLine + ?Sized> StatusLine for Box<T> {
    fn show(&mut self, severity: Severity, message: &str) {
        (**self).show(severity, message);
    }

    fn critical_species(&mut self, count: usize) {
        (**self).critical_species(count);
    }

    fn progress(&mut self, percent: u8) {
        (**self).progress(percent);
    }

    fn error_reports(&mut self, status: ReporterStatus) {
        (**self).error_reports(status);
    }
}

/// Input from the UI adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// One keystroke worth of search box content.
    Input(String),
    SortChanged(SortSpec),
    ShowOnMap {
        id: String,
        coordinates: GeoPoint,
        polygon: Vec<GeoPoint>,
    },
    ShowDetails {
        id: String,
    },
    /// Opens the map on its default viewport.
    OpenMap,
    CloseMap,
    RunAnalysis,
    Shutdown,
}

/// Counters returned when the loop ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkbenchSummary {
    pub queries_issued: u64,
    pub stale_dropped: u64,
    pub critical_count: u64,
}

pub struct Workbench<R, V, L, M>
where
    R: PlantRepository + 'static,
{
    service: SimulatedQueryService<R>,
    session: SearchSession,
    debouncer: Debouncer<String>,
    map: MapController<M>,
    view: V,
    status: L,
    rng: Box<dyn RandomSource>,
    analysis: ProgressTimer,
    analysis_duration: Duration,
    analysis_tick: Duration,
    stale_dropped: u64,
}

impl<R, V, L, M> Workbench<R, V, L, M>
where
    R: PlantRepository + 'static,
    V: RenderSurface,
    L: StatusLine,
    M: MapSurface,
{
    /// Builds the workbench over the service's repository snapshot.
    ///
    /// `rng` feeds map sample counts and analysis timers; the service keeps
    /// its own source.
    pub fn new(
        service: SimulatedQueryService<R>,
        config: &CoreConfig,
        view: V,
        status: L,
        map_surface: M,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, RepoError> {
        let dataset = service.repository().snapshot()?;
        let session = SearchSession::new(dataset, service.reporter().clone(), config.max_results);
        Ok(Self {
            session,
            debouncer: Debouncer::new(config.debounce()),
            map: MapController::new(map_surface, config.map),
            view,
            status,
            rng,
            analysis: ProgressTimer::new(),
            analysis_duration: config.analysis_duration(),
            analysis_tick: config.analysis_tick(),
            stale_dropped: 0,
            service,
        })
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Runs until `Shutdown` arrives or every sender is dropped.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<UiEvent>) -> WorkbenchSummary {
        let mut in_flight: FuturesUnordered<BoxFuture<'static, Settled>> = FuturesUnordered::new();
        let mut analysis: Option<watch::Receiver<u8>> = None;
        self.publish();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(UiEvent::Shutdown) | None => break,
                    Some(event) => {
                        if let Some(progress) = self.handle_event(event) {
                            analysis = Some(progress);
                        }
                    }
                },
                text = self.debouncer.fire(), if self.debouncer.is_pending() => {
                    if let InputDecision::Dispatch(ticket) = self.session.on_input(&text) {
                        let service = self.service.clone();
                        in_flight.push(
                            async move {
                                let outcome = service.query(&ticket.query).await;
                                (ticket, outcome)
                            }
                            .boxed(),
                        );
                    }
                    self.publish();
                },
                Some((ticket, outcome)) = in_flight.next(), if !in_flight.is_empty() => {
                    match self.session.on_query_result(&ticket, outcome) {
                        ResultDisposition::Applied => self.publish(),
                        ResultDisposition::Stale => self.stale_dropped += 1,
                    }
                },
                percent = next_progress(&mut analysis), if analysis.is_some() => {
                    self.on_progress(percent);
                    if percent.map_or(true, |value| value >= PROGRESS_DONE) {
                        analysis = None;
                    }
                },
            }
        }

        self.analysis.stop();
        let summary = WorkbenchSummary {
            queries_issued: self.service.issued_queries(),
            stale_dropped: self.stale_dropped,
            critical_count: self.service.reporter().critical_count(),
        };
        self.service.reporter().log_with(
            LogLevel::Info,
            "workbench stopped",
            json!({
                "queriesIssued": summary.queries_issued,
                "staleDropped": summary.stale_dropped,
                "pendingQueries": in_flight.len(),
            }),
        );
        summary
    }

    fn handle_event(&mut self, event: UiEvent) -> Option<watch::Receiver<u8>> {
        match event {
            UiEvent::Input(text) => self.debouncer.push(text),
            UiEvent::SortChanged(spec) => {
                self.session.on_sort_change(spec);
                self.publish();
            }
            UiEvent::ShowOnMap {
                id,
                coordinates,
                polygon,
            } => self.show_on_map(&id, coordinates, polygon),
            UiEvent::ShowDetails { id } => {
                self.service
                    .reporter()
                    .log(LogLevel::Warn, format!("detailed analysis unavailable for {id}"));
                self.banner(
                    Severity::Warn,
                    format!("Detailed analysis for {id} is not available yet."),
                );
            }
            UiEvent::OpenMap => {
                self.map.open();
                self.service
                    .reporter()
                    .log(LogLevel::Info, "map opened on default view");
            }
            UiEvent::CloseMap => self.map.close(),
            UiEvent::RunAnalysis => return Some(self.start_analysis()),
            UiEvent::Shutdown => {}
        }
        None
    }

    fn show_on_map(&mut self, id: &str, coordinates: GeoPoint, polygon: Vec<GeoPoint>) {
        let record = match self.service.repository().get_plant(id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.service
                    .reporter()
                    .log(LogLevel::Critical, format!("plant details not found: {id}"));
                self.banner(Severity::Critical, format!("Plant {id} not found in the database."));
                return;
            }
            Err(err) => {
                self.service.reporter().report_error(&err, "map lookup failed", 0);
                self.banner(Severity::Error, format!("Map data for {id} could not be loaded."));
                return;
            }
        };

        // The card's copy of the geometry is what the user clicked on.
        let focused = PlantRecord {
            coordinates,
            distribution_polygon: polygon,
            ..record
        };
        let summary = self.map.show_distribution(&focused, self.rng.as_mut());
        self.service.reporter().log(
            LogLevel::Info,
            format!(
                "map opened for {} ({} samples, outlined: {})",
                summary.id, summary.sample_count, summary.outlined
            ),
        );
    }

    fn start_analysis(&mut self) -> watch::Receiver<u8> {
        self.service
            .reporter()
            .log(LogLevel::Info, "genetic analysis started");
        self.banner(Severity::Info, "Genetic analysis running...");
        let rng = Box::new(StdRandom::seeded(self.rng.next_below(u64::MAX)));
        self.analysis.start(
            ProgressSchedule::Analysis {
                duration: self.analysis_duration,
            },
            self.analysis_tick,
            rng,
        )
    }

    fn on_progress(&mut self, percent: Option<u8>) {
        match percent {
            Some(value) => {
                self.status.progress(value);
                if value >= PROGRESS_DONE {
                    self.service
                        .reporter()
                        .log(LogLevel::Success, "genetic analysis complete");
                    self.banner(Severity::Success, "Genetic analysis complete.");
                }
            }
            None => self
                .service
                .reporter()
                .log(LogLevel::Debug, "analysis timer closed"),
        }
    }

    fn banner(&mut self, severity: Severity, message: impl Into<String>) {
        self.session.set_banner(StatusBanner::new(severity, message));
        self.publish();
    }

    fn publish(&mut self) {
        let display = self.session.display();
        self.view.render(&display.list);
        self.status.critical_species(display.critical_count);
        self.status
            .error_reports(self.service.reporter().reporter_status());
        if let Some(banner) = &display.banner {
            self.status.show(banner.severity, &banner.message);
        }
    }
}

async fn next_progress(progress: &mut Option<watch::Receiver<u8>>) -> Option<u8> {
    match progress {
        Some(rx) => match rx.changed().await {
            Ok(()) => Some(*rx.borrow_and_update()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}
