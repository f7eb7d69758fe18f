//! Status reporter: bounded log, error queue and critical counter.
//!
//! # Responsibility
//! - Append leveled entries to the newest-first log.
//! - Turn caught failures into structured [`ErrorRecord`]s.
//! - Expose the critical counter and last report time for display.
//!
//! # Invariants
//! - Every `report_error` increments the counter exactly once.
//! - The reporter lock is never held across an `.await`.

use super::bounded::BoundedLog;
use super::level::LogLevel;
use crate::config::CoreConfig;
use crate::logging::sanitize_message;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt::Display;
use std::sync::Arc;
use uuid::Uuid;

const CONTEXT_EXCERPT_CHARS: usize = 150;
const DISPATCH_EXCERPT_CHARS: usize = 40;

/// One in-memory log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub context: Option<Value>,
}

impl LogEntry {
    /// `[LEVEL] HH:MM:SS: message`, plus a capped context excerpt when asked.
    pub fn display_line(&self, with_context: bool) -> String {
        let mut line = format!(
            "[{}] {}: {}",
            self.level,
            self.timestamp.format("%H:%M:%S"),
            self.message
        );
        if with_context {
            if let Some(context) = &self.context {
                let excerpt = sanitize_message(&context.to_string(), CONTEXT_EXCERPT_CHARS);
                line.push_str(&format!(" (data: {excerpt})"));
            }
        }
        line
    }
}

/// Structured record queued for every reported failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub report_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub context: String,
    pub status_code: u32,
    pub message: String,
    pub origin: String,
}

/// Counter snapshot for the status widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReporterStatus {
    pub reports: usize,
    pub critical: u64,
    pub last_report_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct ReporterState {
    log: BoundedLog<LogEntry>,
    errors: VecDeque<ErrorRecord>,
    error_capacity: usize,
    critical_count: u64,
    last_report_at: Option<DateTime<Utc>>,
    threshold: LogLevel,
}

impl ReporterState {
    fn record(&mut self, level: LogLevel, message: String, context: Option<Value>) {
        let entry = LogEntry {
            level,
            timestamp: Utc::now(),
            message,
            context,
        };
        if let Some(target) = mirror_level(level, self.threshold) {
            let with_context = self.threshold == LogLevel::Debug;
            log::log!(target, "{}", entry.display_line(with_context));
        }
        self.log.push(entry);
    }
}

/// `log` level an entry is mirrored at, or `None` below `threshold`.
fn mirror_level(level: LogLevel, threshold: LogLevel) -> Option<log::Level> {
    (level.severity() >= threshold.severity()).then(|| level.to_log_level())
}

/// Shared reporter handle; clones observe the same log and counters.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    state: Arc<Mutex<ReporterState>>,
}

impl StatusReporter {
    pub fn new(max_log_entries: usize, max_error_queue: usize, threshold: LogLevel) -> Self {
        let reporter = Self {
            state: Arc::new(Mutex::new(ReporterState {
                log: BoundedLog::new(max_log_entries),
                errors: VecDeque::new(),
                error_capacity: max_error_queue.max(1),
                critical_count: 0,
                last_report_at: None,
                threshold,
            })),
        };
        reporter.log(LogLevel::Info, "error reporter started");
        reporter
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            config.max_log_entries,
            config.max_error_queue,
            config.log_threshold,
        )
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.state.lock().record(level, message.into(), None);
    }

    /// Logs with attached structured data.
    pub fn log_with(&self, level: LogLevel, message: impl Into<String>, context: Value) {
        self.state.lock().record(level, message.into(), Some(context));
    }

    /// Counts, queues and logs one failure; returns the queued record.
    pub fn report_error(
        &self,
        error: &dyn Display,
        context: &str,
        status_code: u32,
    ) -> ErrorRecord {
        let now = Utc::now();
        let record = ErrorRecord {
            report_id: Uuid::new_v4(),
            timestamp: now,
            context: context.to_string(),
            status_code,
            message: error.to_string(),
            origin: crate::origin_label(),
        };

        let mut state = self.state.lock();
        state.critical_count += 1;
        state.errors.push_back(record.clone());
        while state.errors.len() > state.error_capacity {
            state.errors.pop_front();
        }
        state.last_report_at = Some(now);

        state.record(
            LogLevel::Critical,
            format!("new critical error reported ({context})"),
            serde_json::to_value(&record).ok(),
        );
        state.record(
            LogLevel::Debug,
            format!(
                "dispatching error report: {}",
                sanitize_message(&record.message, DISPATCH_EXCERPT_CHARS)
            ),
            None,
        );
        record
    }

    pub fn critical_count(&self) -> u64 {
        self.state.lock().critical_count
    }

    pub fn last_report_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_report_at
    }

    /// Most recently queued error.
    pub fn latest_error(&self) -> Option<ErrorRecord> {
        self.state.lock().errors.back().cloned()
    }

    pub fn reporter_status(&self) -> ReporterStatus {
        let state = self.state.lock();
        ReporterStatus {
            reports: state.errors.len(),
            critical: state.critical_count,
            last_report_at: state.last_report_at,
        }
    }

    /// Zeroes the critical counter; queued records are kept.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.critical_count = 0;
        state.record(LogLevel::Warn, "critical error counter reset".to_string(), None);
    }

    /// Log entries, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.state.lock().log.iter().cloned().collect()
    }

    /// Queued error records, oldest first.
    pub fn errors(&self) -> Vec<ErrorRecord> {
        self.state.lock().errors.iter().cloned().collect()
    }
}
