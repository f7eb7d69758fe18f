//! Distribution map modal.
//!
//! # Responsibility
//! - Drive an external map surface to show one record's distribution.
//! - Produce the detail summary shown beside the map.
//!
//! # Invariants
//! - Only polygons with at least three points are outlined.
//! - Every `show_distribution` clears previous overlays first.

use crate::config::GeoDefaults;
use crate::model::plant::{GeoPoint, IucnStatus, PlantRecord};
use crate::rng::RandomSource;

/// Zoom added to the default when focusing a record with no polygon.
const MARKER_ONLY_ZOOM_BOOST: u8 = 2;
const SAMPLE_COUNT_MIN: u64 = 5;
const SAMPLE_COUNT_SPAN: u64 = 50;

/// Tile-map widget driven by the core.
pub trait MapSurface {
    fn set_view(&mut self, center: GeoPoint, zoom: u8);
    fn fit_bounds(&mut self, polygon: &[GeoPoint]);
    fn outline(&mut self, polygon: &[GeoPoint]);
    fn place_marker(&mut self, position: GeoPoint, label: &str);
    /// Removes markers and outlines; base tiles stay.
    fn clear_overlays(&mut self);
    /// Detail panel beside the map.
    fn show_summary(&mut self, _summary: &DistributionSummary) {}
}

impl<T: MapSurface + ?Sized> MapSurface for Box<T> {
    fn set_view(&mut self, center: GeoPoint, zoom: u8) {
        (**self).set_view(center, zoom);
    }

    fn fit_bounds(&mut self, polygon: &[GeoPoint]) {
        (**self).fit_bounds(polygon);
    }

    fn outline(&mut self, polygon: &[GeoPoint]) {
        (**self).outline(polygon);
    }

    fn place_marker(&mut self, position: GeoPoint, label: &str) {
        (**self).place_marker(position, label);
    }

    fn clear_overlays(&mut self) {
        (**self).clear_overlays();
    }

    fn show_summary(&mut self, summary: &DistributionSummary) {
        (**self).show_summary(summary);
    }
}

/// Details shown in the map modal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSummary {
    pub id: String,
    pub name: String,
    pub habitat: String,
    pub coordinates: GeoPoint,
    pub elevation: String,
    pub iucn_status: IucnStatus,
    pub sample_count: u32,
    pub outlined: bool,
}

/// Map modal state around a [`MapSurface`].
#[derive(Debug)]
pub struct MapController<M> {
    surface: M,
    defaults: GeoDefaults,
    open: bool,
}

impl<M: MapSurface> MapController<M> {
    pub fn new(surface: M, defaults: GeoDefaults) -> Self {
        Self {
            surface,
            defaults,
            open: false,
        }
    }

    /// Opens the modal focused on `record`.
    pub fn show_distribution(
        &mut self,
        record: &PlantRecord,
        rng: &mut dyn RandomSource,
    ) -> DistributionSummary {
        self.surface.clear_overlays();

        let outlined = record.has_renderable_area();
        if outlined {
            self.surface.outline(&record.distribution_polygon);
            self.surface.fit_bounds(&record.distribution_polygon);
        }

        let label = format!("{} / {}", record.name, record.scientific_name);
        self.surface.place_marker(record.coordinates, &label);

        if !outlined {
            self.surface.set_view(
                record.coordinates,
                self.defaults.zoom.saturating_add(MARKER_ONLY_ZOOM_BOOST),
            );
        }
        self.open = true;

        let summary = DistributionSummary {
            id: record.id.clone(),
            name: record.name.clone(),
            habitat: record.habitat.clone(),
            coordinates: record.coordinates,
            elevation: format!("{}m", record.elevation_m),
            iucn_status: record.iucn_status,
            sample_count: (SAMPLE_COUNT_MIN + rng.next_below(SAMPLE_COUNT_SPAN)) as u32,
            outlined,
        };
        self.surface.show_summary(&summary);
        summary
    }

    /// Clears overlays and returns to the default viewport.
    pub fn reset_view(&mut self) {
        self.surface.clear_overlays();
        self.surface
            .set_view(self.defaults.center, self.defaults.zoom);
    }

    /// Opens the modal on the default viewport.
    pub fn open(&mut self) {
        self.reset_view();
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::{MapController, MapSurface};
    use crate::config::GeoDefaults;
    use crate::dataset::generator::sentinel_record;
    use crate::model::plant::GeoPoint;
    use crate::rng::ScriptedRandom;

    #[derive(Default)]
    struct CallLog(Vec<String>);

    impl MapSurface for CallLog {
        fn set_view(&mut self, center: GeoPoint, zoom: u8) {
            self.0.push(format!("view {center} z{zoom}"));
        }
        fn fit_bounds(&mut self, polygon: &[GeoPoint]) {
            self.0.push(format!("fit {}", polygon.len()));
        }
        fn outline(&mut self, polygon: &[GeoPoint]) {
            self.0.push(format!("outline {}", polygon.len()));
        }
        fn place_marker(&mut self, _position: GeoPoint, label: &str) {
            self.0.push(format!("marker {label}"));
        }
        fn clear_overlays(&mut self) {
            self.0.push("clear".to_string());
        }
    }

    #[test]
    fn polygon_record_is_outlined_and_fitted() {
        let mut record = sentinel_record();
        record.distribution_polygon = vec![
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(2.0, 1.0),
            GeoPoint::new(2.0, 2.0),
        ];
        let mut map = MapController::new(CallLog::default(), GeoDefaults::default());
        let summary = map.show_distribution(&record, &mut ScriptedRandom::constant(0.0));

        assert!(summary.outlined);
        assert_eq!(summary.sample_count, 5);
        assert_eq!(map.surface().0[..3], ["clear", "outline 3", "fit 3"]);
        assert!(map.is_open());
    }

    #[test]
    fn marker_only_record_zooms_past_default() {
        let mut map = MapController::new(CallLog::default(), GeoDefaults::default());
        let summary = map.show_distribution(&sentinel_record(), &mut ScriptedRandom::constant(0.0));

        assert!(!summary.outlined);
        let calls = &map.surface().0;
        assert!(calls[1].starts_with("marker CRITICAL_ERROR_TRIGGER"));
        assert_eq!(calls[2], "view 0.0000, 0.0000 z8");
    }

    #[test]
    fn reset_view_returns_to_defaults() {
        let mut map = MapController::new(CallLog::default(), GeoDefaults::default());
        map.reset_view();
        assert_eq!(map.surface().0, vec!["clear", "view 38.9637, 35.2433 z6"]);
    }
}
