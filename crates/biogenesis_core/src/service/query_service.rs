//! Simulated query endpoint with injected latency and failures.
//!
//! # Responsibility
//! - Suspend the caller for a random latency, then answer a text query.
//! - Inject the deterministic critical failure and the random server error.
//!
//! # Invariants
//! - The trigger check runs before the random failure roll; a trigger query
//!   never consumes a failure draw and never succeeds.
//! - Successful results hold at most `max_results` records.
//! - Every simulated failure is reported exactly once.

use crate::config::CoreConfig;
use crate::dataset::generator::{SENTINEL_NAME, TRIGGER_TOKEN};
use crate::model::plant::PlantRecord;
use crate::repo::plant_repo::{PlantRepository, RepoError};
use crate::rng::RandomSource;
use crate::search::pipeline::matches_service_query;
use crate::status::level::LogLevel;
use crate::status::reporter::StatusReporter;
use parking_lot::Mutex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const STATUS_OK: u32 = 200;
pub const STATUS_SERVER_ERROR: u32 = 500;
/// Outside the HTTP range so it can never collide with a real status.
pub const STATUS_CRITICAL: u32 = 40499;

const CRITICAL_MESSAGE: &str =
    "404S: QUANTUM SERVER FAILURE - requested sequence is critically lost or access is blocked";
const SERVER_ERROR_MESSAGE: &str =
    "500: INTERNAL SERVER ERROR - unexpected core failure while processing data";
const SUCCESS_MESSAGE: &str = "Data sequence retrieved.";

/// Response envelope of one simulated query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub success: bool,
    pub status: u32,
    pub message: String,
    pub data: Vec<PlantRecord>,
}

impl QueryResult {
    pub fn ok(data: Vec<PlantRecord>) -> Self {
        Self {
            success: true,
            status: STATUS_OK,
            message: SUCCESS_MESSAGE.to_string(),
            data,
        }
    }

    pub fn failure(status: u32, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            message: message.into(),
            data: Vec::new(),
        }
    }

    pub fn is_critical(&self) -> bool {
        self.status == STATUS_CRITICAL
    }
}

/// Unexpected failure on the query path (not a simulated outcome).
#[derive(Debug)]
pub enum QueryError {
    Repo(RepoError),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "query could not read dataset: {err}"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for QueryError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

#[derive(Debug, Clone, Copy)]
struct QuerySettings {
    latency_min_ms: u64,
    latency_max_ms: u64,
    failure_rate: f64,
    max_results: usize,
}

/// Simulated remote endpoint. Clones share repository, reporter and RNG.
pub struct SimulatedQueryService<R: PlantRepository> {
    repo: Arc<R>,
    reporter: StatusReporter,
    rng: Arc<Mutex<Box<dyn RandomSource>>>,
    settings: QuerySettings,
    issued: Arc<AtomicU64>,
}

impl<R: PlantRepository> Clone for SimulatedQueryService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            reporter: self.reporter.clone(),
            rng: Arc::clone(&self.rng),
            settings: self.settings,
            issued: Arc::clone(&self.issued),
        }
    }
}

impl<R: PlantRepository> SimulatedQueryService<R> {
    pub fn new(
        repo: Arc<R>,
        reporter: StatusReporter,
        rng: Box<dyn RandomSource>,
        config: &CoreConfig,
    ) -> Self {
        Self {
            repo,
            reporter,
            rng: Arc::new(Mutex::new(rng)),
            settings: QuerySettings {
                latency_min_ms: config.latency_min_ms,
                latency_max_ms: config.latency_max_ms,
                failure_rate: config.failure_rate,
                max_results: config.max_results,
            },
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Runs one simulated query.
    ///
    /// Simulated failures come back as `Ok` with `success == false`; `Err`
    /// is reserved for unexpected failures such as an unreadable dataset.
    pub async fn query(&self, text: &str) -> Result<QueryResult, QueryError> {
        self.issued.fetch_add(1, Ordering::Relaxed);
        self.reporter
            .log(LogLevel::Debug, format!("simulated query started: {text}"));

        let latency = self.draw_latency();
        tokio::time::sleep(latency).await;

        if is_trigger_query(text) {
            self.reporter
                .report_error(&CRITICAL_MESSAGE, "critical trigger simulation", STATUS_CRITICAL);
            return Ok(QueryResult::failure(STATUS_CRITICAL, CRITICAL_MESSAGE));
        }

        if self.roll_failure() {
            self.reporter.report_error(
                &SERVER_ERROR_MESSAGE,
                "random server error simulation",
                STATUS_SERVER_ERROR,
            );
            return Ok(QueryResult::failure(
                STATUS_SERVER_ERROR,
                SERVER_ERROR_MESSAGE,
            ));
        }

        let snapshot = self.repo.snapshot()?;
        let data = snapshot
            .iter()
            .filter(|record| matches_service_query(record, text))
            .take(self.settings.max_results)
            .cloned()
            .collect::<Vec<_>>();

        self.reporter.log(
            LogLevel::Success,
            format!("simulated query succeeded with {} result(s)", data.len()),
        );
        Ok(QueryResult::ok(data))
    }

    /// Number of `query` calls started so far, across clones.
    pub fn issued_queries(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    pub fn reporter(&self) -> &StatusReporter {
        &self.reporter
    }

    fn draw_latency(&self) -> Duration {
        let span = self
            .settings
            .latency_max_ms
            .saturating_sub(self.settings.latency_min_ms);
        let offset = self.rng.lock().next_below(span);
        Duration::from_millis(self.settings.latency_min_ms + offset)
    }

    fn roll_failure(&self) -> bool {
        self.rng.lock().next_f64() < self.settings.failure_rate
    }
}

/// Exact trigger token, or any query containing the sentinel name.
pub fn is_trigger_query(text: &str) -> bool {
    let upper = text.trim().to_uppercase();
    upper == TRIGGER_TOKEN || upper.contains(SENTINEL_NAME)
}
