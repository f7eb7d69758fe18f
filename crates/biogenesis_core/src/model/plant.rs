//! Plant record model.
//!
//! # Responsibility
//! - Define `PlantRecord` and its value types.
//! - Provide the IUCN risk rank and the numeric id suffix used by sort keys.
//!
//! # Invariants
//! - Records are never mutated after generation.
//! - `iucn_status` is always one of the six known codes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static PLANT_ID_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^T-(\d+)").expect("valid plant id regex"));

/// Minimum number of points for a polygon to describe an area.
pub const MIN_POLYGON_POINTS: usize = 3;

/// IUCN conservation category, declared from highest to lowest risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IucnStatus {
    /// Extinct.
    Ex,
    /// Critically endangered.
    Cr,
    /// Endangered.
    En,
    /// Vulnerable.
    Vu,
    /// Near threatened.
    Nt,
    /// Least concern.
    Lc,
}

impl IucnStatus {
    pub const ALL: [IucnStatus; 6] = [
        IucnStatus::Ex,
        IucnStatus::Cr,
        IucnStatus::En,
        IucnStatus::Vu,
        IucnStatus::Nt,
        IucnStatus::Lc,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Ex => "EX",
            Self::Cr => "CR",
            Self::En => "EN",
            Self::Vu => "VU",
            Self::Nt => "NT",
            Self::Lc => "LC",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ex => "Extinct",
            Self::Cr => "Critically Endangered",
            Self::En => "Endangered",
            Self::Vu => "Vulnerable",
            Self::Nt => "Near Threatened",
            Self::Lc => "Least Concern",
        }
    }

    /// Risk ordinal used by the `iucn_risk` sort: EX 0 through LC 5.
    pub fn risk_rank(self) -> u8 {
        match self {
            Self::Ex => 0,
            Self::Cr => 1,
            Self::En => 2,
            Self::Vu => 3,
            Self::Nt => 4,
            Self::Lc => 5,
        }
    }
}

impl Display for IucnStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for IucnStatus {
    type Err = ParseIucnError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.code() == normalized)
            .ok_or_else(|| ParseIucnError(value.to_string()))
    }
}

/// Unknown IUCN code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIucnError(pub String);

impl Display for ParseIucnError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown IUCN status `{}`; expected EX|CR|EN|VU|NT|LC",
            self.0
        )
    }
}

impl Error for ParseIucnError {}

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Trace soil chemistry sampled at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SoilComposition {
    pub ph: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
}

/// One synthetic plant entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantRecord {
    /// `T-###`, or the sentinel `T-404S`.
    pub id: String,
    pub name: String,
    pub scientific_name: String,
    pub family: String,
    pub habitat: String,
    pub iucn_status: IucnStatus,
    pub coordinates: GeoPoint,
    /// Empty, or at least [`MIN_POLYGON_POINTS`] points.
    pub distribution_polygon: Vec<GeoPoint>,
    pub elevation_m: u32,
    pub gene_code: String,
    /// Gene code split as `XXX-XXX-XXXX`.
    pub dna_segments: String,
    pub rna_signature: String,
    pub traits: Vec<String>,
    /// In `[0, 1]`.
    pub protein_folding_score: f64,
    /// In `[0, 1]`.
    pub anomaly_index: f64,
    pub gene_mutations: u32,
    pub soil: SoilComposition,
}

impl PlantRecord {
    /// Checks the structural invariants of a single record.
    pub fn validate(&self) -> Result<(), PlantValidationError> {
        if self.id.trim().is_empty() {
            return Err(PlantValidationError::EmptyId);
        }
        let points = self.distribution_polygon.len();
        if points > 0 && points < MIN_POLYGON_POINTS {
            return Err(PlantValidationError::DegeneratePolygon {
                id: self.id.clone(),
                points,
            });
        }
        for (field, value) in [
            ("protein_folding_score", self.protein_folding_score),
            ("anomaly_index", self.anomaly_index),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PlantValidationError::ScoreOutOfRange {
                    id: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Whether the polygon can be drawn as an area.
    pub fn has_renderable_area(&self) -> bool {
        self.distribution_polygon.len() >= MIN_POLYGON_POINTS
    }

    /// Numeric id suffix, see [`plant_id_number`].
    pub fn id_number(&self) -> Option<u64> {
        plant_id_number(&self.id)
    }
}

/// Parses the digit run after `T-`; `T-404S` yields `404`.
pub fn plant_id_number(id: &str) -> Option<u64> {
    PLANT_ID_NUMBER_RE
        .captures(id.trim())
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Record-level invariant violation.
#[derive(Debug, Clone, PartialEq)]
pub enum PlantValidationError {
    EmptyId,
    DegeneratePolygon {
        id: String,
        points: usize,
    },
    ScoreOutOfRange {
        id: String,
        field: &'static str,
        value: f64,
    },
}

impl Display for PlantValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "plant id must not be empty"),
            Self::DegeneratePolygon { id, points } => write!(
                f,
                "plant {id} has a {points}-point distribution polygon; need 0 or at least {MIN_POLYGON_POINTS}"
            ),
            Self::ScoreOutOfRange { id, field, value } => {
                write!(f, "plant {id} has {field}={value}, expected [0, 1]")
            }
        }
    }
}

impl Error for PlantValidationError {}
