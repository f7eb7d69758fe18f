//! Filter, sort and cap the working set.
//!
//! # Responsibility
//! - Reject one-character queries as an advisory outcome, not an error.
//! - Apply the selected comparator and sort direction.
//!
//! # Invariants
//! - A one-character query never filters; it yields `InsufficientQuery`.
//! - Records with no numeric id suffix sort after all numbered ids, in both
//!   directions.

use crate::model::plant::PlantRecord;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Shortest query that filters; shorter non-empty input is advisory.
pub const MIN_QUERY_CHARS: usize = 2;

/// Field a sort compares on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Name,
    /// Numeric suffix of `T-###`.
    Id,
    /// EX first through LC.
    IucnRisk,
    Habitat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = ParseSortError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ParseSortError(value.to_string())),
        }
    }
}

/// Sort key plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    pub fn with_order(self, order: SortOrder) -> Self {
        Self { order, ..self }
    }

    /// Selector value this spec parses from.
    pub fn as_selector(self) -> &'static str {
        match (self.key, self.order) {
            (SortKey::Name, SortOrder::Asc) => "name_asc",
            (SortKey::Name, SortOrder::Desc) => "name_desc",
            (SortKey::Id, SortOrder::Asc) => "id_asc",
            (SortKey::Id, SortOrder::Desc) => "id_desc",
            (SortKey::IucnRisk, SortOrder::Asc) => "iucn_risk",
            (SortKey::IucnRisk, SortOrder::Desc) => "iucn_risk_desc",
            (SortKey::Habitat, SortOrder::Asc) => "location_name",
            (SortKey::Habitat, SortOrder::Desc) => "location_name_desc",
        }
    }

    fn compare(self, left: &PlantRecord, right: &PlantRecord) -> Ordering {
        let ordering = match self.key {
            SortKey::Name => left.name.cmp(&right.name),
            SortKey::Id => match (left.id_number(), right.id_number()) {
                (Some(left), Some(right)) => left.cmp(&right),
                // Unnumbered ids stay last whatever the direction.
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortKey::IucnRisk => left
                .iucn_status
                .risk_rank()
                .cmp(&right.iucn_status.risk_rank()),
            SortKey::Habitat => left.habitat.cmp(&right.habitat),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortKey::Id, SortOrder::Asc)
    }
}

impl Display for SortSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_selector())
    }
}

impl FromStr for SortSpec {
    type Err = ParseSortError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let spec = match value.trim().to_ascii_lowercase().as_str() {
            "name_asc" | "name" => Self::new(SortKey::Name, SortOrder::Asc),
            "name_desc" => Self::new(SortKey::Name, SortOrder::Desc),
            "id_asc" | "id" => Self::new(SortKey::Id, SortOrder::Asc),
            "id_desc" => Self::new(SortKey::Id, SortOrder::Desc),
            "iucn_risk" => Self::new(SortKey::IucnRisk, SortOrder::Asc),
            "iucn_risk_desc" => Self::new(SortKey::IucnRisk, SortOrder::Desc),
            "location_name" | "habitat" => Self::new(SortKey::Habitat, SortOrder::Asc),
            "location_name_desc" => Self::new(SortKey::Habitat, SortOrder::Desc),
            _ => return Err(ParseSortError(value.to_string())),
        };
        Ok(spec)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSortError(pub String);

impl Display for ParseSortError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown sort option `{}`", self.0)
    }
}

impl Error for ParseSortError {}

/// Result of running the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Query had exactly one character; nothing is displayed.
    InsufficientQuery,
    Rows(Vec<PlantRecord>),
}

impl PipelineOutcome {
    pub fn rows(&self) -> &[PlantRecord] {
        match self {
            Self::InsufficientQuery => &[],
            Self::Rows(rows) => rows,
        }
    }

    pub fn into_rows(self) -> Vec<PlantRecord> {
        match self {
            Self::InsufficientQuery => Vec::new(),
            Self::Rows(rows) => rows,
        }
    }
}

/// Filters by `query`, sorts by `spec`, then keeps the first `limit` rows.
pub fn apply(
    dataset: &[PlantRecord],
    query: &str,
    spec: SortSpec,
    limit: usize,
) -> PipelineOutcome {
    let needle = query.trim().to_lowercase();
    let query_chars = needle.chars().count();
    if query_chars > 0 && query_chars < MIN_QUERY_CHARS {
        return PipelineOutcome::InsufficientQuery;
    }

    let mut rows = dataset
        .iter()
        .filter(|record| needle.is_empty() || matches_lowered(record, &needle))
        .cloned()
        .collect::<Vec<_>>();
    // `sort_by` is stable, which the tie rule depends on.
    rows.sort_by(|left, right| spec.compare(left, right));
    rows.truncate(limit);
    PipelineOutcome::Rows(rows)
}

/// Service filter: substring of name or scientific name, exact id.
pub fn matches_service_query(record: &PlantRecord, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    record.name.to_lowercase().contains(&needle)
        || record.scientific_name.to_lowercase().contains(&needle)
        || record.id.to_lowercase() == needle
}

fn matches_lowered(record: &PlantRecord, needle: &str) -> bool {
    record.name.to_lowercase().contains(needle)
        || record.scientific_name.to_lowercase().contains(needle)
        || record.id.to_lowercase().contains(needle)
}
