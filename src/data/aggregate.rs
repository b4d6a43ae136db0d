use std::collections::{BTreeMap, BTreeSet};

use super::filter::{ListingFilter, filtered_indices};
use super::model::ListingDataset;

// ---------------------------------------------------------------------------
// Top-N neighbourhoods
// ---------------------------------------------------------------------------

/// Count listings per neighbourhood among `indices` and keep the `n` most
/// frequent. Equal counts are ordered alphabetically.
pub fn top_neighborhoods(
    dataset: &ListingDataset,
    indices: &[usize],
    n: usize,
) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &i in indices {
        *counts.entry(dataset.listings[i].neighbourhood.as_str()).or_default() += 1;
    }

    // BTreeMap iteration is alphabetical and sort_by is stable.
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(n)
        .map(|(name, count)| (name.to_string(), count))
        .collect()
}

/// Keep only the indices whose neighbourhood is in `top`.
pub fn restrict_to_neighborhoods(
    dataset: &ListingDataset,
    indices: &[usize],
    top: &[(String, usize)],
) -> Vec<usize> {
    let keep: BTreeSet<&str> = top.iter().map(|(name, _)| name.as_str()).collect();
    indices
        .iter()
        .copied()
        .filter(|&i| keep.contains(dataset.listings[i].neighbourhood.as_str()))
        .collect()
}

// ---------------------------------------------------------------------------
// Mean price per neighbourhood (bar chart)
// ---------------------------------------------------------------------------

/// One bar of the "average price by neighbourhood" chart.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodSummary {
    pub name: String,
    pub mean_price: f64,
    pub count: usize,
}

/// Mean price per neighbourhood, highest mean first.
pub fn mean_price_by_neighborhood(
    dataset: &ListingDataset,
    indices: &[usize],
) -> Vec<NeighborhoodSummary> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for &i in indices {
        let l = &dataset.listings[i];
        let entry = sums.entry(l.neighbourhood.as_str()).or_default();
        entry.0 += l.price;
        entry.1 += 1;
    }

    let mut summaries: Vec<NeighborhoodSummary> = sums
        .into_iter()
        .map(|(name, (sum, count))| NeighborhoodSummary {
            name: name.to_string(),
            mean_price: sum / count as f64,
            count,
        })
        .collect();
    summaries.sort_by(|a, b| b.mean_price.total_cmp(&a.mean_price));
    summaries
}

// ---------------------------------------------------------------------------
// Geo subset
// ---------------------------------------------------------------------------

/// Listings with both coordinates and a price strictly below `ceiling`.
pub fn geo_subset(dataset: &ListingDataset, indices: &[usize], ceiling: f64) -> Vec<usize> {
    indices
        .iter()
        .copied()
        .filter(|&i| {
            let l = &dataset.listings[i];
            l.position().is_some() && l.price < ceiling
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Tunables for [`derive_views`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub top_n: usize,
    pub geo_price_ceiling: f64,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            top_n: 10,
            geo_price_ceiling: 1000.0,
        }
    }
}

/// Everything the charts need for one filter selection. All fields are
/// indices into the dataset's `listings`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedViews {
    /// Listings passing the filter.
    pub filtered: Vec<usize>,
    /// Top-N neighbourhoods with their counts.
    pub top_neighborhoods: Vec<(String, usize)>,
    /// Filtered listings restricted to the top-N neighbourhoods.
    pub top_listings: Vec<usize>,
    /// Bars for the average price chart.
    pub price_summary: Vec<NeighborhoodSummary>,
    /// Filtered listings drawable on the map.
    pub geo: Vec<usize>,
}

/// Compute every derived view for a filter selection.
pub fn derive_views(
    dataset: &ListingDataset,
    filter: &ListingFilter,
    settings: ViewSettings,
) -> DerivedViews {
    let filtered = filtered_indices(dataset, filter);
    let top = top_neighborhoods(dataset, &filtered, settings.top_n);
    let top_listings = restrict_to_neighborhoods(dataset, &filtered, &top);
    let price_summary = mean_price_by_neighborhood(dataset, &top_listings);
    let geo = geo_subset(dataset, &filtered, settings.geo_price_ceiling);

    log::debug!(
        "Derived views: {} filtered, {} in top {} neighbourhoods, {} on map",
        filtered.len(),
        top_listings.len(),
        top.len(),
        geo.len()
    );

    DerivedViews {
        filtered,
        top_neighborhoods: top,
        top_listings,
        price_summary,
        geo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::NeighborhoodChoice;
    use crate::data::model::{Listing, listing};

    fn many_neighbourhoods() -> ListingDataset {
        let mut listings = Vec::new();
        // Neighbourhood k gets k + 1 listings, twelve neighbourhoods total.
        for k in 0..12 {
            for _ in 0..=k {
                listings.push(listing(&format!("N{k:02}"), "Entire home/apt", 100.0 + k as f64));
            }
        }
        ListingDataset::from_listings(listings, 0)
    }

    fn all(ds: &ListingDataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn top_n_keeps_most_frequent() {
        let ds = many_neighbourhoods();
        let top = top_neighborhoods(&ds, &all(&ds), 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0], ("N11".to_string(), 12));
        assert!(top.iter().all(|(name, _)| name != "N00" && name != "N01"));

        let kept = restrict_to_neighborhoods(&ds, &all(&ds), &top);
        let distinct: BTreeSet<&str> = kept
            .iter()
            .map(|&i| ds.listings[i].neighbourhood.as_str())
            .collect();
        assert_eq!(distinct.len(), 10);
        assert_eq!(kept.len(), ds.len() - 1 - 2);
    }

    #[test]
    fn ties_are_alphabetical() {
        let ds = ListingDataset::from_listings(
            vec![
                listing("Presidio", "Private room", 90.0),
                listing("Bayview", "Private room", 90.0),
                listing("Marina", "Private room", 90.0),
                listing("Marina", "Private room", 90.0),
            ],
            0,
        );
        let top = top_neighborhoods(&ds, &all(&ds), 2);
        assert_eq!(
            top,
            vec![("Marina".to_string(), 2), ("Bayview".to_string(), 1)]
        );
    }

    #[test]
    fn mean_price_sorted_descending() {
        let ds = ListingDataset::from_listings(
            vec![
                listing("Mission", "Private room", 100.0),
                listing("Mission", "Private room", 200.0),
                listing("Nob Hill", "Private room", 400.0),
            ],
            0,
        );
        let summary = mean_price_by_neighborhood(&ds, &all(&ds));
        assert_eq!(summary[0].name, "Nob Hill");
        assert_eq!(summary[1].mean_price, 150.0);
        assert_eq!(summary[1].count, 2);
    }

    #[test]
    fn geo_subset_drops_outliers_and_missing_coordinates() {
        let no_coords = Listing {
            latitude: None,
            ..listing("Mission", "Private room", 100.0)
        };
        let ds = ListingDataset::from_listings(
            vec![
                listing("Mission", "Private room", 999.99),
                listing("Mission", "Private room", 1000.0),
                no_coords,
                listing("Mission", "Private room", 150.0),
            ],
            0,
        );
        let geo = geo_subset(&ds, &all(&ds), 1000.0);
        assert_eq!(geo, vec![0, 3]);
        assert!(geo.iter().all(|&i| {
            let l = &ds.listings[i];
            l.price < 1000.0 && l.position().is_some()
        }));
    }

    #[test]
    fn derive_views_on_example_row() {
        let ds = ListingDataset::from_listings(vec![listing("Mission", "Entire home/apt", 150.0)], 0);
        let filter = ListingFilter {
            neighborhood: NeighborhoodChoice::All,
            room_type: "Entire home/apt".to_string(),
            price_range: (50.0, 300.0),
        };
        let views = derive_views(&ds, &filter, ViewSettings::default());
        assert_eq!(views.filtered, vec![0]);
        assert_eq!(views.geo, vec![0]);
        assert_eq!(views.price_summary.len(), 1);
    }

    #[test]
    fn derive_views_on_empty_selection() {
        let ds = many_neighbourhoods();
        let filter = ListingFilter {
            neighborhood: NeighborhoodChoice::All,
            room_type: "Hotel room".to_string(),
            price_range: (0.0, 10_000.0),
        };
        let views = derive_views(&ds, &filter, ViewSettings::default());
        assert_eq!(views, DerivedViews::default());
    }
}
