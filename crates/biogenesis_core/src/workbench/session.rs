//! Search session: pure input-to-display state machine.
//!
//! # Responsibility
//! - Decide whether input dispatches a query or shows the length advisory.
//! - Fold query outcomes and sort changes into one [`DisplayState`].
//!
//! # Invariants
//! - Every failure outcome leaves the displayed list empty.
//! - Only the result of the latest issued ticket is applied; older ones are
//!   reported as [`ResultDisposition::Stale`].
//! - The session never awaits; callers own suspension and timing.

use crate::model::plant::PlantRecord;
use crate::render::{critical_species_count, render_cards, RenderedList};
use crate::search::pipeline::{apply, PipelineOutcome, SortSpec, MIN_QUERY_CHARS};
use crate::service::query_service::{QueryError, QueryResult};
use crate::status::level::{LogLevel, Severity};
use crate::status::reporter::StatusReporter;
use serde_json::json;
use std::sync::Arc;

/// Status-line message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub severity: Severity,
    pub message: String,
}

impl StatusBanner {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Everything the surfaces show.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayState {
    pub list: RenderedList,
    /// CR records in the working set (header counter).
    pub critical_count: usize,
    pub banner: Option<StatusBanner>,
}

/// Identifies one dispatched query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub query: String,
}

/// What the caller should do with a settled input value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputDecision {
    /// One-character query; nothing dispatched.
    Advisory,
    Dispatch(SearchTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDisposition {
    Applied,
    /// A newer ticket was issued after this one.
    Stale,
}

/// Session state for one search box.
#[derive(Debug)]
pub struct SearchSession {
    reporter: StatusReporter,
    working_set: Arc<Vec<PlantRecord>>,
    query: String,
    sort: SortSpec,
    max_results: usize,
    latest_seq: u64,
    display: DisplayState,
}

impl SearchSession {
    /// Starts with the full dataset as working set and an empty query.
    pub fn new(
        dataset: Arc<Vec<PlantRecord>>,
        reporter: StatusReporter,
        max_results: usize,
    ) -> Self {
        let mut session = Self {
            reporter,
            working_set: dataset,
            query: String::new(),
            sort: SortSpec::default(),
            max_results,
            latest_seq: 0,
            display: DisplayState::default(),
        };
        session.reporter.log(
            LogLevel::Info,
            format!("{} plant records loaded", session.working_set.len()),
        );
        session.rederive();
        session
    }

    /// Handles a settled (debounced) input value.
    pub fn on_input(&mut self, text: &str) -> InputDecision {
        self.query = text.trim().to_string();
        // Invalidate whatever is in flight; its result must not land now.
        self.latest_seq += 1;

        if self.query.chars().count() == 1 {
            self.clear_list();
            self.display.banner = Some(StatusBanner::new(
                Severity::Info,
                format!("Minimum {MIN_QUERY_CHARS} characters required."),
            ));
            return InputDecision::Advisory;
        }

        self.clear_list();
        self.display.banner = Some(StatusBanner::new(
            Severity::Info,
            format!("Scanning genetic sequence '{}'...", self.query),
        ));
        InputDecision::Dispatch(SearchTicket {
            seq: self.latest_seq,
            query: self.query.clone(),
        })
    }

    /// Applies a query outcome unless a newer ticket was issued.
    pub fn on_query_result(
        &mut self,
        ticket: &SearchTicket,
        outcome: Result<QueryResult, QueryError>,
    ) -> ResultDisposition {
        if ticket.seq != self.latest_seq {
            self.reporter.log(
                LogLevel::Debug,
                format!(
                    "dropping stale result for '{}' (seq {} < {})",
                    ticket.query, ticket.seq, self.latest_seq
                ),
            );
            return ResultDisposition::Stale;
        }

        match outcome {
            Ok(result) if result.success => {
                let hits = result.data.len();
                self.working_set = Arc::new(result.data);
                self.rederive();
                self.display.banner = Some(StatusBanner::new(
                    Severity::Success,
                    format!("{hits} result(s) retrieved. Sequence complete."),
                ));
            }
            Ok(result) => {
                let severity = if result.is_critical() {
                    Severity::Critical
                } else {
                    Severity::Error
                };
                let message = if result.is_critical() {
                    format!("CRITICAL ERROR ({}) - {}", result.status, result.message)
                } else {
                    format!("API error ({}): {}", result.status, result.message)
                };
                self.show_failure(
                    severity,
                    message,
                    json!({ "status": result.status, "message": result.message }),
                );
            }
            Err(err) => {
                self.reporter.report_error(&err, "search execution failed", 0);
                self.show_failure(
                    Severity::Error,
                    "Network error: data could not be retrieved.".to_string(),
                    json!({ "error": err.to_string() }),
                );
            }
        }
        ResultDisposition::Applied
    }

    /// Re-derives the display from the working set with a new sort.
    pub fn on_sort_change(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.rederive();
    }

    /// Replaces the status line without touching the list.
    pub fn set_banner(&mut self, banner: StatusBanner) {
        self.display.banner = Some(banner);
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn working_set(&self) -> &Arc<Vec<PlantRecord>> {
        &self.working_set
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub fn reporter(&self) -> &StatusReporter {
        &self.reporter
    }

    fn rederive(&mut self) {
        self.display.critical_count = critical_species_count(&self.working_set);
        match apply(&self.working_set, &self.query, self.sort, self.max_results) {
            PipelineOutcome::InsufficientQuery => {
                self.clear_list();
                self.display.banner = Some(StatusBanner::new(
                    Severity::Info,
                    format!("Minimum {MIN_QUERY_CHARS} characters required."),
                ));
            }
            PipelineOutcome::Rows(rows) => self.set_list(render_cards(&rows)),
        }
    }

    fn show_failure(&mut self, severity: Severity, message: String, context: serde_json::Value) {
        self.clear_list();
        self.reporter
            .log_with(severity.log_level(), message.clone(), context);
        self.display.banner = Some(StatusBanner::new(severity, message));
    }

    fn clear_list(&mut self) {
        self.set_list(RenderedList::default());
    }

    fn set_list(&mut self, list: RenderedList) {
        if list.is_empty() {
            self.reporter.log(LogLevel::Warn, "zero results rendered");
        } else {
            self.reporter.log(
                LogLevel::Success,
                format!("render complete: {} card(s)", list.count),
            );
        }
        self.display.list = list;
    }
}

#[cfg(test)]
mod tests {
    use super::{InputDecision, ResultDisposition, SearchSession, SearchTicket};
    use crate::dataset::generator::sentinel_record;
    use crate::search::pipeline::SortSpec;
    use crate::service::query_service::{QueryResult, STATUS_SERVER_ERROR};
    use crate::status::level::{LogLevel, Severity};
    use crate::status::reporter::StatusReporter;
    use std::sync::Arc;

    fn session() -> SearchSession {
        SearchSession::new(
            Arc::new(vec![sentinel_record()]),
            StatusReporter::new(100, 10, LogLevel::Debug),
            20,
        )
    }

    #[test]
    fn one_character_is_advisory_and_empties_list() {
        let mut session = session();
        assert_eq!(session.display().list.count, 1);

        assert_eq!(session.on_input("x"), InputDecision::Advisory);
        assert!(session.display().list.is_empty());
        let banner = session.display().banner.clone().expect("advisory banner");
        assert_eq!(banner.severity, Severity::Info);
        assert!(banner.message.contains("Minimum 2"));
    }

    #[test]
    fn advisory_invalidates_in_flight_ticket() {
        let mut session = session();
        let InputDecision::Dispatch(ticket) = session.on_input("crit") else {
            panic!("expected dispatch");
        };
        session.on_input("c");
        let disposition = session.on_query_result(&ticket, Ok(QueryResult::ok(Vec::new())));
        assert_eq!(disposition, ResultDisposition::Stale);
    }

    #[test]
    fn stale_ticket_is_dropped_without_touching_display() {
        let mut session = session();
        let stale = SearchTicket {
            seq: 0,
            query: "old".to_string(),
        };
        session.on_input("new query");
        let before = session.display().clone();
        assert_eq!(
            session.on_query_result(&stale, Ok(QueryResult::ok(vec![sentinel_record()]))),
            ResultDisposition::Stale
        );
        assert_eq!(session.display(), &before);
    }

    #[test]
    fn server_error_shows_error_banner_and_empties_list() {
        let mut session = session();
        let InputDecision::Dispatch(ticket) = session.on_input("crit") else {
            panic!("expected dispatch");
        };
        // A sort change while the query is in flight puts rows back on screen.
        session.on_sort_change(SortSpec::default());
        assert_eq!(session.display().list.count, 1);
        assert_eq!(ticket.seq, session.latest_seq());

        let failed = QueryResult::failure(STATUS_SERVER_ERROR, "INTERNAL SERVER ERROR");
        assert_eq!(
            session.on_query_result(&ticket, Ok(failed)),
            ResultDisposition::Applied
        );

        assert!(session.display().list.is_empty());
        let banner = session.display().banner.clone().expect("error banner");
        assert_eq!(banner.severity, Severity::Error);
        assert!(banner.message.starts_with("API error (500)"));
    }
}
