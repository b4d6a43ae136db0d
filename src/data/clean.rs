use super::model::{Cell, Listing, ListingDataset, RawListing};

// ---------------------------------------------------------------------------
// Field coercion
// ---------------------------------------------------------------------------

/// Parse a currency cell such as `"$1,250.00"`.
///
/// Dollar signs and thousands separators are stripped before parsing.
/// Anything unparseable, negative or non-finite is treated as missing.
pub fn parse_price(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(v) => *v,
        Cell::Text(s) => {
            let stripped: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
            stripped.trim().parse::<f64>().ok()?
        }
        Cell::Missing => return None,
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Coerce a cell to a number, mapping anything non-numeric to missing.
pub fn coerce_numeric(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(v) => *v,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        Cell::Missing => return None,
    };
    value.is_finite().then_some(value)
}

/// Coerce a cell to a non-negative whole count.
pub fn coerce_count(cell: &Cell) -> Option<u32> {
    let value = coerce_numeric(cell)?;
    (value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64).then_some(value as u32)
}

// ---------------------------------------------------------------------------
// Record cleaning
// ---------------------------------------------------------------------------

/// Clean one raw row. Returns `None` when any of room type, neighbourhood,
/// price or revenue is missing after coercion.
pub fn clean_record(raw: RawListing) -> Option<Listing> {
    let room_type = raw.room_type.as_text()?;
    let neighbourhood = raw.neighbourhood.as_text()?;
    let price = parse_price(&raw.price)?;
    let revenue = coerce_numeric(&raw.revenue)?;

    Some(Listing {
        name: raw.name.as_text().unwrap_or_default(),
        room_type,
        neighbourhood,
        price,
        revenue,
        availability_365: coerce_count(&raw.availability),
        number_of_reviews: coerce_count(&raw.reviews),
        latitude: coerce_numeric(&raw.latitude),
        longitude: coerce_numeric(&raw.longitude),
    })
}

/// Clean all rows, keeping input order, and build the dataset.
pub fn clean(raw: Vec<RawListing>) -> ListingDataset {
    let total = raw.len();
    let listings: Vec<Listing> = raw.into_iter().filter_map(clean_record).collect();
    let dropped = total - listings.len();

    if dropped > 0 {
        log::info!("Cleaning dropped {dropped} of {total} rows with missing or invalid fields");
    }

    ListingDataset::from_listings(listings, dropped)
}
