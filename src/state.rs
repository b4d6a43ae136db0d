use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::aggregate::{DerivedViews, ViewSettings, derive_views};
use crate::data::boundary::BoundaryFetch;
use crate::data::filter::{ListingFilter, NeighborhoodChoice};
use crate::data::model::ListingDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<ListingDataset>,

    /// Current filter selection; `None` without a dataset.
    pub filter: Option<ListingFilter>,

    /// Views derived from `dataset` and `filter` (cached).
    pub views: DerivedViews,

    /// Colours for the room-type scatter.
    pub room_colors: Option<ColorMap>,

    /// Neighbourhood outlines for the map.
    pub boundaries: BoundaryFetch,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub settings: ViewSettings,
    pub default_price_range: (f64, f64),
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            filter: None,
            views: DerivedViews::default(),
            room_colors: None,
            boundaries: BoundaryFetch::disabled(),
            status_message: None,
            settings: ViewSettings::default(),
            default_price_range: (50.0, 300.0),
        }
    }
}

impl AppState {
    pub fn new(config: &DashboardConfig, boundaries: BoundaryFetch) -> Self {
        Self {
            boundaries,
            settings: config.view_settings(),
            default_price_range: config.default_price_range,
            ..Self::default()
        }
    }

    /// Ingest a newly loaded dataset and reset the filter selection.
    pub fn set_dataset(&mut self, dataset: ListingDataset) {
        self.filter = Some(ListingFilter::initial(&dataset, self.default_price_range));
        self.room_colors = Some(ColorMap::new(&dataset.room_types));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `views` after a filter change.
    pub fn refilter(&mut self) {
        self.views = match (&self.dataset, &self.filter) {
            (Some(ds), Some(filter)) => derive_views(ds, filter, self.settings),
            _ => DerivedViews::default(),
        };
    }

    pub fn set_neighborhood(&mut self, option: &str) {
        if let Some(filter) = &mut self.filter {
            filter.neighborhood = NeighborhoodChoice::from_option(option);
            self.refilter();
        }
    }

    pub fn set_room_type(&mut self, room_type: &str) {
        if let Some(filter) = &mut self.filter {
            filter.room_type = room_type.to_string();
            self.refilter();
        }
    }

    /// Update the price range, keeping `lower <= upper`. The bound that was
    /// not moved gives way.
    pub fn set_price_range(&mut self, lower: f64, upper: f64) {
        if let Some(filter) = &mut self.filter {
            let (old_lower, _) = filter.price_range;
            filter.price_range = if lower > upper {
                if lower != old_lower {
                    (lower, lower)
                } else {
                    (upper, upper)
                }
            } else {
                (lower, upper)
            };
            self.refilter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::listing;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(ListingDataset::from_listings(
            vec![
                listing("Mission", "Entire home/apt", 150.0),
                listing("Nob Hill", "Entire home/apt", 250.0),
                listing("Mission", "Private room", 90.0),
            ],
            0,
        ));
        state
    }

    #[test]
    fn loading_a_dataset_derives_views() {
        let state = loaded();
        assert_eq!(state.views.filtered, vec![0, 1]);
        assert!(state.room_colors.is_some());
    }

    #[test]
    fn selector_changes_refilter() {
        let mut state = loaded();
        state.set_neighborhood("Mission");
        assert_eq!(state.views.filtered, vec![0]);

        state.set_room_type("Private room");
        assert_eq!(state.views.filtered, vec![2]);

        state.set_neighborhood("All");
        state.set_price_range(100.0, 300.0);
        assert!(state.views.filtered.is_empty());
    }

    #[test]
    fn price_range_stays_ordered() {
        let mut state = loaded();
        state.set_price_range(100.0, 200.0);
        state.set_price_range(260.0, 200.0);
        assert_eq!(state.filter.as_ref().unwrap().price_range, (260.0, 260.0));
        state.set_price_range(260.0, 120.0);
        assert_eq!(state.filter.as_ref().unwrap().price_range, (120.0, 120.0));
    }

    #[test]
    fn no_dataset_means_no_views() {
        let mut state = AppState::default();
        state.set_room_type("Private room");
        assert!(state.filter.is_none());
        assert_eq!(state.views, DerivedViews::default());
    }
}
