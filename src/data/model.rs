use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Cell – a single loosely-typed value as read from the source file
// ---------------------------------------------------------------------------

/// A raw cell before type coercion. CSV always yields `Text`; JSON and
/// Parquet can carry real numbers.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    Text(String),
    Number(f64),
    #[default]
    Missing,
}

/// Tokens read as missing values, the default NA set of pandas' `read_csv`.
pub const MISSING_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

impl Cell {
    /// Interpret empty text and the usual NA tokens as missing, the way a
    /// CSV reader would.
    pub fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed) {
            Cell::Missing
        } else {
            Cell::Text(s.to_string())
        }
    }

    /// Non-empty text content, if any. Numbers are rendered with `Display`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Cell::Number(v) => Some(v.to_string()),
            Cell::Missing => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Missing => write!(f, "<missing>"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawListing – one row straight out of the loader
// ---------------------------------------------------------------------------

/// Column names the loader requires in every input file.
pub const COL_NAME: &str = "name";
pub const COL_ROOM_TYPE: &str = "room_type";
pub const COL_NEIGHBOURHOOD: &str = "neighbourhood_cleansed";
pub const COL_PRICE: &str = "price";
pub const COL_REVENUE: &str = "estimated_revenue_l365d";
pub const COL_AVAILABILITY: &str = "availability_365";
pub const COL_REVIEWS: &str = "number_of_reviews";
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";

pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_PRICE,
    COL_REVENUE,
    COL_ROOM_TYPE,
    COL_NEIGHBOURHOOD,
    COL_AVAILABILITY,
    COL_REVIEWS,
    COL_LATITUDE,
    COL_LONGITUDE,
    COL_NAME,
];

/// A listing row before cleaning. Every field is still a [`Cell`].
#[derive(Debug, Clone, Default)]
pub struct RawListing {
    pub name: Cell,
    pub room_type: Cell,
    pub neighbourhood: Cell,
    pub price: Cell,
    pub revenue: Cell,
    pub availability: Cell,
    pub reviews: Cell,
    pub latitude: Cell,
    pub longitude: Cell,
}

impl RawListing {
    /// Build a row by asking `lookup` for each known column.
    pub fn from_lookup(mut lookup: impl FnMut(&str) -> Cell) -> Self {
        RawListing {
            name: lookup(COL_NAME),
            room_type: lookup(COL_ROOM_TYPE),
            neighbourhood: lookup(COL_NEIGHBOURHOOD),
            price: lookup(COL_PRICE),
            revenue: lookup(COL_REVENUE),
            availability: lookup(COL_AVAILABILITY),
            reviews: lookup(COL_REVIEWS),
            latitude: lookup(COL_LATITUDE),
            longitude: lookup(COL_LONGITUDE),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing – one cleaned row
// ---------------------------------------------------------------------------

/// A listing that survived cleaning. `room_type`, `neighbourhood`, `price`
/// and `revenue` are always present; the rest may still be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub name: String,
    pub room_type: String,
    pub neighbourhood: String,
    /// Nightly price in dollars, never negative.
    pub price: f64,
    /// Estimated revenue over the last 365 days.
    pub revenue: f64,
    pub availability_365: Option<u32>,
    pub number_of_reviews: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Listing {
    /// `(longitude, latitude)` when both are known.
    pub fn position(&self) -> Option<[f64; 2]> {
        Some([self.longitude?, self.latitude?])
    }
}

// ---------------------------------------------------------------------------
// ListingDataset – the cleaned, immutable dataset
// ---------------------------------------------------------------------------

/// Sentinel shown first in the neighbourhood selector.
pub const ALL_NEIGHBORHOODS: &str = "All";

/// The cleaned dataset with pre-computed selector options.
#[derive(Debug, Clone, Default)]
pub struct ListingDataset {
    /// All cleaned listings, in input order.
    pub listings: Vec<Listing>,
    /// Sorted unique neighbourhoods.
    pub neighborhoods: BTreeSet<String>,
    /// Unique room types in order of first appearance.
    pub room_types: Vec<String>,
    /// Number of raw rows dropped by cleaning.
    pub dropped: usize,
}

impl ListingDataset {
    /// Build selector indices from cleaned listings.
    pub fn from_listings(listings: Vec<Listing>, dropped: usize) -> Self {
        let mut neighborhoods = BTreeSet::new();
        let mut room_types: Vec<String> = Vec::new();

        for l in &listings {
            neighborhoods.insert(l.neighbourhood.clone());
            if !room_types.contains(&l.room_type) {
                room_types.push(l.room_type.clone());
            }
        }

        ListingDataset {
            listings,
            neighborhoods,
            room_types,
            dropped,
        }
    }

    /// Options for the neighbourhood selector: "All" then sorted names.
    pub fn neighborhood_options(&self) -> Vec<String> {
        std::iter::once(ALL_NEIGHBORHOODS.to_string())
            .chain(self.neighborhoods.iter().cloned())
            .collect()
    }

    /// Observed `(min, max)` price, `None` for an empty dataset.
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        let mut prices = self.listings.iter().map(|l| l.price);
        let first = prices.next()?;
        Some(prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn listing(neighbourhood: &str, room_type: &str, price: f64) -> Listing {
    Listing {
        name: format!("{room_type} in {neighbourhood}"),
        room_type: room_type.to_string(),
        neighbourhood: neighbourhood.to_string(),
        price,
        revenue: price * 100.0,
        availability_365: Some(100),
        number_of_reviews: Some(5),
        latitude: Some(37.76),
        longitude: Some(-122.42),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_start_with_all_and_are_sorted() {
        let ds = ListingDataset::from_listings(
            vec![
                listing("Mission", "Private room", 80.0),
                listing("Castro/Upper Market", "Entire home/apt", 200.0),
                listing("Mission", "Entire home/apt", 150.0),
            ],
            0,
        );
        assert_eq!(
            ds.neighborhood_options(),
            vec!["All", "Castro/Upper Market", "Mission"]
        );
        assert_eq!(ds.room_types, vec!["Private room", "Entire home/apt"]);
        assert_eq!(ds.price_bounds(), Some((80.0, 200.0)));
    }

    #[test]
    fn empty_dataset_has_no_bounds() {
        let ds = ListingDataset::default();
        assert!(ds.is_empty());
        assert_eq!(ds.price_bounds(), None);
        assert_eq!(ds.neighborhood_options(), vec!["All"]);
    }

    #[test]
    fn blank_text_is_missing() {
        assert_eq!(Cell::from_text("  "), Cell::Missing);
        assert_eq!(Cell::from_text("N/A"), Cell::Missing);
        assert_eq!(Cell::from_text(" null "), Cell::Missing);
        assert_eq!(Cell::from_text("Nana's place"), Cell::Text("Nana's place".to_string()));
        assert_eq!(Cell::from_text("x").as_text().as_deref(), Some("x"));
        assert_eq!(Cell::Number(3.0).as_text().as_deref(), Some("3"));
    }
}
