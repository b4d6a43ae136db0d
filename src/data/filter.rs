use super::model::{ALL_NEIGHBORHOODS, ListingDataset};

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// Neighbourhood selector: either every neighbourhood or one exact name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NeighborhoodChoice {
    #[default]
    All,
    Named(String),
}

impl NeighborhoodChoice {
    /// Map a selector option back to a choice; `"All"` is the sentinel.
    pub fn from_option(option: &str) -> Self {
        if option == ALL_NEIGHBORHOODS {
            NeighborhoodChoice::All
        } else {
            NeighborhoodChoice::Named(option.to_string())
        }
    }

    /// Label shown in the selector.
    pub fn label(&self) -> &str {
        match self {
            NeighborhoodChoice::All => ALL_NEIGHBORHOODS,
            NeighborhoodChoice::Named(name) => name,
        }
    }

    fn matches(&self, neighbourhood: &str) -> bool {
        match self {
            NeighborhoodChoice::All => true,
            NeighborhoodChoice::Named(name) => name == neighbourhood,
        }
    }
}

/// The user's current filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFilter {
    pub neighborhood: NeighborhoodChoice,
    /// Exact room-type match; there is no "all" option.
    pub room_type: String,
    /// Inclusive `(lower, upper)` price bounds.
    pub price_range: (f64, f64),
}

impl ListingFilter {
    /// Initial selection for a freshly loaded dataset: all neighbourhoods,
    /// the first room type seen, and `default_range` clamped into the
    /// whole-dollar observed price bounds.
    pub fn initial(dataset: &ListingDataset, default_range: (f64, f64)) -> Self {
        let room_type = dataset.room_types.first().cloned().unwrap_or_default();
        let price_range = match slider_bounds(dataset) {
            Some((lo, hi)) => {
                let lower = default_range.0.clamp(lo, hi);
                let upper = default_range.1.clamp(lower, hi);
                (lower, upper)
            }
            None => default_range,
        };
        ListingFilter {
            neighborhood: NeighborhoodChoice::All,
            room_type,
            price_range,
        }
    }

    /// Whether a single listing passes every predicate.
    pub fn accepts(&self, room_type: &str, price: f64, neighbourhood: &str) -> bool {
        let (lower, upper) = self.price_range;
        room_type == self.room_type
            && price >= lower
            && price <= upper
            && self.neighborhood.matches(neighbourhood)
    }
}

/// Whole-dollar slider bounds: observed min and max truncated to integers.
pub fn slider_bounds(dataset: &ListingDataset) -> Option<(f64, f64)> {
    dataset
        .price_bounds()
        .map(|(lo, hi)| (lo.trunc(), hi.trunc()))
}

// ---------------------------------------------------------------------------
// Filter stage
// ---------------------------------------------------------------------------

/// Return indices of listings passing the filter, in input order.
pub fn filtered_indices(dataset: &ListingDataset, filter: &ListingFilter) -> Vec<usize> {
    dataset
        .listings
        .iter()
        .enumerate()
        .filter(|(_, l)| filter.accepts(&l.room_type, l.price, &l.neighbourhood))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::listing;

    fn dataset() -> ListingDataset {
        ListingDataset::from_listings(
            vec![
                listing("Mission", "Entire home/apt", 150.0),
                listing("Mission", "Entire home/apt", 1500.0),
                listing("Castro/Upper Market", "Entire home/apt", 50.0),
                listing("Castro/Upper Market", "Private room", 120.0),
                listing("Nob Hill", "Entire home/apt", 300.0),
            ],
            0,
        )
    }

    fn filter(neighborhood: &str, room: &str, range: (f64, f64)) -> ListingFilter {
        ListingFilter {
            neighborhood: NeighborhoodChoice::from_option(neighborhood),
            room_type: room.to_string(),
            price_range: range,
        }
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let ds = dataset();
        let idx = filtered_indices(&ds, &filter("All", "Entire home/apt", (50.0, 300.0)));
        assert_eq!(idx, vec![0, 2, 4]);
    }

    #[test]
    fn out_of_range_price_is_excluded_for_any_neighbourhood() {
        let ds = dataset();
        for n in ["All", "Mission"] {
            let idx = filtered_indices(&ds, &filter(n, "Entire home/apt", (50.0, 300.0)));
            assert!(!idx.contains(&1));
        }
    }

    #[test]
    fn named_neighbourhood_narrows() {
        let ds = dataset();
        let idx = filtered_indices(&ds, &filter("Mission", "Entire home/apt", (0.0, 2000.0)));
        assert_eq!(idx, vec![0, 1]);
    }

    #[test]
    fn unknown_room_type_yields_empty() {
        let ds = dataset();
        let idx = filtered_indices(&ds, &filter("All", "Hotel room", (0.0, 2000.0)));
        assert!(idx.is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = dataset();
        let f = filter("All", "Entire home/apt", (60.0, 2000.0));
        let once = filtered_indices(&ds, &f);

        let subset = ListingDataset::from_listings(
            once.iter().map(|&i| ds.listings[i].clone()).collect(),
            0,
        );
        let twice = filtered_indices(&subset, &f);
        assert_eq!(twice.len(), once.len());
        assert_eq!(filtered_indices(&ds, &f), once);
    }

    #[test]
    fn initial_filter_clamps_default_range() {
        let ds = dataset();
        let f = ListingFilter::initial(&ds, (50.0, 300.0));
        assert_eq!(f.neighborhood, NeighborhoodChoice::All);
        assert_eq!(f.room_type, "Entire home/apt");
        assert_eq!(f.price_range, (50.0, 300.0));

        let cheap = ListingDataset::from_listings(vec![listing("Mission", "Shared room", 20.5)], 0);
        let f = ListingFilter::initial(&cheap, (50.0, 300.0));
        assert_eq!(f.price_range, (20.0, 20.0));
    }

    #[test]
    fn choice_labels_round_trip() {
        assert_eq!(NeighborhoodChoice::from_option("All"), NeighborhoodChoice::All);
        assert_eq!(NeighborhoodChoice::from_option("Mission").label(), "Mission");
    }
}
