//! Log levels and status-line severities.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Level of an in-memory log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Success,
    Warn,
    Error,
    Critical,
}

impl LogLevel {
    /// Rank compared against the mirror threshold. SUCCESS ranks with INFO.
    pub fn severity(self) -> u8 {
        match self {
            Self::Debug => 0,
            Self::Info | Self::Success => 1,
            Self::Warn => 2,
            Self::Error => 3,
            Self::Critical => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Level used when mirroring to the `log` facade.
    pub fn to_log_level(self) -> log::Level {
        match self {
            Self::Debug => log::Level::Debug,
            Self::Info | Self::Success => log::Level::Info,
            Self::Warn => log::Level::Warn,
            Self::Error | Self::Critical => log::Level::Error,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseLevelError(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(pub String);

impl Display for ParseLevelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown log level `{}`; expected debug|info|success|warn|error|critical",
            self.0
        )
    }
}

impl Error for ParseLevelError {}

/// Severity of a status-line banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warn,
    Error,
    Critical,
}

impl Severity {
    /// Log level recorded when a banner is shown.
    pub fn log_level(self) -> LogLevel {
        match self {
            Self::Info => LogLevel::Info,
            Self::Success => LogLevel::Success,
            Self::Warn => LogLevel::Warn,
            Self::Error => LogLevel::Error,
            Self::Critical => LogLevel::Critical,
        }
    }
}
