//! Display-card projection of plant records.
//!
//! # Responsibility
//! - Convert the pipeline output into card views plus a result count.
//! - Define the rendering surface the adapters implement.
//!
//! # Invariants
//! - `RenderedList::count == cards.len()`.
//! - Card order equals pipeline output order.

use crate::model::plant::{GeoPoint, IucnStatus, PlantRecord};
use serde::Serialize;

const FOLDING_STABLE_AT: f64 = 0.85;
const FOLDING_MODERATE_AT: f64 = 0.5;

/// Protein folding band shown on each card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FoldingStatus {
    Stable,
    Moderate,
    Critical,
}

impl FoldingStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= FOLDING_STABLE_AT {
            Self::Stable
        } else if score >= FOLDING_MODERATE_AT {
            Self::Moderate
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Moderate => "Moderate",
            Self::Critical => "Critical",
        }
    }
}

/// One result card. Carries what the map and details buttons emit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantCardView {
    pub id: String,
    pub name: String,
    pub scientific_name: String,
    pub iucn_code: &'static str,
    pub family: String,
    pub habitat: String,
    pub elevation: String,
    pub dna_segments: String,
    pub folding_status: FoldingStatus,
    pub folding_score: f64,
    pub anomaly_index: f64,
    pub coordinates: GeoPoint,
    pub polygon: Vec<GeoPoint>,
}

impl From<&PlantRecord> for PlantCardView {
    fn from(record: &PlantRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            scientific_name: record.scientific_name.clone(),
            iucn_code: record.iucn_status.code(),
            family: record.family.clone(),
            habitat: record.habitat.clone(),
            elevation: format!("{}m", record.elevation_m),
            dna_segments: record.dna_segments.clone(),
            folding_status: FoldingStatus::from_score(record.protein_folding_score),
            folding_score: record.protein_folding_score,
            anomaly_index: record.anomaly_index,
            coordinates: record.coordinates,
            polygon: record.distribution_polygon.clone(),
        }
    }
}

/// Cards plus the counter shown beside them.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RenderedList {
    pub cards: Vec<PlantCardView>,
    pub count: usize,
}

impl RenderedList {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

pub fn render_cards(records: &[PlantRecord]) -> RenderedList {
    let cards = records.iter().map(PlantCardView::from).collect::<Vec<_>>();
    RenderedList {
        count: cards.len(),
        cards,
    }
}

/// Number of critically endangered records, shown in the header.
pub fn critical_species_count(records: &[PlantRecord]) -> usize {
    records
        .iter()
        .filter(|record| record.iucn_status == IucnStatus::Cr)
        .count()
}

/// Consumer of rendered lists (cards widget, terminal printer).
pub trait RenderSurface {
    fn render(&mut self, list: &RenderedList);
}

impl<T: RenderSurface + ?Sized> RenderSurface for Box<T> {
    fn render(&mut self, list: &RenderedList) {
        (**self).render(list);
    }
}

#[cfg(test)]
mod tests {
    use super::{critical_species_count, render_cards, FoldingStatus};
    use crate::dataset::generator::sentinel_record;
    use crate::model::plant::IucnStatus;

    #[test]
    fn folding_thresholds_are_inclusive() {
        assert_eq!(FoldingStatus::from_score(0.85), FoldingStatus::Stable);
        assert_eq!(FoldingStatus::from_score(0.5), FoldingStatus::Moderate);
        assert_eq!(FoldingStatus::from_score(0.49), FoldingStatus::Critical);
    }

    #[test]
    fn cards_mirror_records() {
        let mut record = sentinel_record();
        record.elevation_m = 1234;
        let list = render_cards(&[record.clone()]);
        assert_eq!(list.count, 1);
        assert_eq!(list.cards[0].id, record.id);
        assert_eq!(list.cards[0].elevation, "1234m");
        assert_eq!(list.cards[0].iucn_code, "EX");
    }

    #[test]
    fn counts_only_critically_endangered() {
        let mut cr = sentinel_record();
        cr.iucn_status = IucnStatus::Cr;
        let ex = sentinel_record();
        assert_eq!(critical_species_count(&[cr, ex]), 1);
    }
}
