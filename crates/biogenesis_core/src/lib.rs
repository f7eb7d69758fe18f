//! Core domain logic for the BioGenesis plant workbench.
//! This crate is the single source of truth for dataset, query, pipeline and
//! status invariants. UI adapters only translate input events into calls here.

pub mod config;
pub mod dataset;
pub mod logging;
pub mod map;
pub mod model;
pub mod progress;
pub mod render;
pub mod repo;
pub mod rng;
pub mod search;
pub mod service;
pub mod status;
pub mod workbench;

pub use config::{ConfigError, CoreConfig, GeoDefaults};
pub use dataset::generator::{
    generate, sentinel_record, SENTINEL_ID, SENTINEL_NAME, TRIGGER_TOKEN,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use map::{DistributionSummary, MapController, MapSurface};
pub use model::plant::{
    plant_id_number, GeoPoint, IucnStatus, ParseIucnError, PlantRecord, PlantValidationError,
    SoilComposition,
};
pub use progress::{ProgressSchedule, ProgressTimer, PROGRESS_DONE};
pub use render::{
    critical_species_count, render_cards, FoldingStatus, PlantCardView, RenderSurface,
    RenderedList,
};
pub use repo::plant_repo::{InMemoryPlantRepository, PlantRepository, RepoError, RepoResult};
pub use rng::{RandomSource, ScriptedRandom, StdRandom};
pub use search::pipeline::{
    apply, matches_service_query, ParseSortError, PipelineOutcome, SortKey,
    SortOrder, SortSpec,
};
pub use service::query_service::{
    QueryError, QueryResult, SimulatedQueryService, STATUS_CRITICAL, STATUS_OK,
    STATUS_SERVER_ERROR,
};
pub use status::level::{LogLevel, ParseLevelError, Severity};
pub use status::reporter::{ErrorRecord, LogEntry, ReporterStatus, StatusReporter};
pub use workbench::debounce::Debouncer;
pub use workbench::driver::{StatusLine, UiEvent, Workbench, WorkbenchSummary};
pub use workbench::session::{
    DisplayState, InputDecision, ResultDisposition, SearchSession, SearchTicket, StatusBanner,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Origin label stamped on error reports.
pub fn origin_label() -> String {
    format!("biogenesis-core/{}", core_version())
}
